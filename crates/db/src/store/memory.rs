//! In-memory save store.
//!
//! Backs unit tests of the lock protocol: all decisions route through the
//! pure functions in `toolbox_core::locking`, and the whole
//! read-check-write runs under one mutex so the atomicity contract matches
//! the PostgreSQL implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use toolbox_core::error::CoreError;
use toolbox_core::locking::{self, FieldEdit, LockChange};
use toolbox_core::types::DbId;

use crate::models::save::{CreateSave, Save};
use crate::store::{EditOutcome, LockOutcome, SaveStore};

#[derive(Default)]
struct Inner {
    next_id: DbId,
    saves: HashMap<DbId, Save>,
}

/// Save store holding rows in a mutex-guarded map.
#[derive(Default)]
pub struct MemorySaveStore {
    inner: Mutex<Inner>,
}

impl MemorySaveStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SaveStore for MemorySaveStore {
    async fn create(&self, owner_id: DbId, input: &CreateSave) -> Result<Save, sqlx::Error> {
        let mut inner = self.inner.lock().await;
        inner.next_id += 1;
        let now = Utc::now();
        let save = Save {
            id: inner.next_id,
            name: input.name.clone(),
            description: input.description.clone(),
            data: input.data.clone(),
            tool_id: input.tool_id,
            owner_id,
            locked_by_id: None,
            last_locked: None,
            last_opened: None,
            created_at: now,
            updated_at: now,
        };
        inner.saves.insert(save.id, save.clone());
        Ok(save)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Save>, sqlx::Error> {
        let inner = self.inner.lock().await;
        Ok(inner.saves.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Save>, sqlx::Error> {
        let inner = self.inner.lock().await;
        let mut saves: Vec<Save> = inner.saves.values().cloned().collect();
        saves.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(saves)
    }

    async fn touch_opened(&self, id: DbId) -> Result<Option<Save>, sqlx::Error> {
        let mut inner = self.inner.lock().await;
        Ok(inner.saves.get_mut(&id).map(|save| {
            save.last_opened = Some(Utc::now());
            save.clone()
        }))
    }

    async fn set_lock(
        &self,
        id: DbId,
        actor: DbId,
        want_lock: bool,
    ) -> Result<LockOutcome, sqlx::Error> {
        let mut inner = self.inner.lock().await;
        let Some(save) = inner.saves.get_mut(&id) else {
            return Ok(LockOutcome::NotFound);
        };

        match locking::evaluate_lock_change(save.owner_id, save.locked_by_id, actor, want_lock) {
            Ok(LockChange::Acquired) | Ok(LockChange::Reacquired) => {
                let now = Utc::now();
                save.locked_by_id = Some(actor);
                save.last_locked = Some(now);
                save.updated_at = now;
                Ok(LockOutcome::Applied(save.clone()))
            }
            Ok(LockChange::Released) => {
                save.locked_by_id = None;
                save.updated_at = Utc::now();
                Ok(LockOutcome::Applied(save.clone()))
            }
            Ok(LockChange::AlreadyUnlocked) => Ok(LockOutcome::Applied(save.clone())),
            Err(CoreError::LockConflict { holder }) => Ok(LockOutcome::Conflict { holder }),
            Err(_) => Ok(LockOutcome::NotHolder),
        }
    }

    async fn apply_edit(
        &self,
        id: DbId,
        actor: DbId,
        edit: &FieldEdit,
    ) -> Result<EditOutcome, sqlx::Error> {
        let mut inner = self.inner.lock().await;
        let Some(save) = inner.saves.get_mut(&id) else {
            return Ok(EditOutcome::NotFound);
        };

        if locking::check_edit_allowed(save.locked_by_id, actor).is_err() {
            return Ok(EditOutcome::NotHolder);
        }

        if let Some(name) = &edit.name {
            save.name = name.clone();
        }
        if let Some(description) = &edit.description {
            save.description = Some(description.clone());
        }
        if let Some(data) = &edit.data {
            save.data = Some(data.clone());
        }
        save.updated_at = Utc::now();
        Ok(EditOutcome::Applied(save.clone()))
    }

    async fn delete(&self, id: DbId) -> Result<bool, sqlx::Error> {
        let mut inner = self.inner.lock().await;
        Ok(inner.saves.remove(&id).is_some())
    }
}
