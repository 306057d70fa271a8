//! PostgreSQL-backed save store.
//!
//! Lock and edit operations are single guarded UPDATE statements: the
//! precondition is evaluated and the row rewritten in one atomic step, so
//! concurrent requests against the same save serialize at the row level
//! and the loser is re-evaluated against the post-update state.

use async_trait::async_trait;
use toolbox_core::locking::FieldEdit;
use toolbox_core::types::DbId;

use crate::models::save::{CreateSave, Save};
use crate::store::{EditOutcome, LockOutcome, SaveStore};
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, data, tool_id, owner_id, \
                       locked_by_id, last_locked, last_opened, created_at, updated_at";

/// Save store backed by the `saves` table.
#[derive(Clone)]
pub struct PgSaveStore {
    pool: DbPool,
}

impl PgSaveStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Read the current lock holder, or `None` if the row is gone.
    async fn read_lock_state(&self, id: DbId) -> Result<Option<Option<DbId>>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<DbId>>("SELECT locked_by_id FROM saves WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }
}

#[async_trait]
impl SaveStore for PgSaveStore {
    async fn create(&self, owner_id: DbId, input: &CreateSave) -> Result<Save, sqlx::Error> {
        let query = format!(
            "INSERT INTO saves (name, description, data, tool_id, owner_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Save>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.data)
            .bind(input.tool_id)
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Save>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM saves WHERE id = $1");
        sqlx::query_as::<_, Save>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list(&self) -> Result<Vec<Save>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM saves ORDER BY created_at DESC");
        sqlx::query_as::<_, Save>(&query).fetch_all(&self.pool).await
    }

    async fn touch_opened(&self, id: DbId) -> Result<Option<Save>, sqlx::Error> {
        let query = format!(
            "UPDATE saves SET last_opened = NOW() WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Save>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn set_lock(
        &self,
        id: DbId,
        actor: DbId,
        want_lock: bool,
    ) -> Result<LockOutcome, sqlx::Error> {
        // Guards must stay in lockstep with
        // `toolbox_core::locking::evaluate_lock_change`.
        let query = if want_lock {
            // Free, self-held, or owned by the actor (owner override).
            format!(
                "UPDATE saves SET locked_by_id = $2, last_locked = NOW(), updated_at = NOW() \
                 WHERE id = $1 \
                   AND (locked_by_id IS NULL OR locked_by_id = $2 OR owner_id = $2) \
                 RETURNING {COLUMNS}"
            )
        } else {
            // Only the current holder releases.
            format!(
                "UPDATE saves SET locked_by_id = NULL, updated_at = NOW() \
                 WHERE id = $1 AND locked_by_id = $2 \
                 RETURNING {COLUMNS}"
            )
        };

        loop {
            let updated = sqlx::query_as::<_, Save>(&query)
                .bind(id)
                .bind(actor)
                .fetch_optional(&self.pool)
                .await?;
            if let Some(save) = updated {
                return Ok(LockOutcome::Applied(save));
            }

            // The guard did not match: evaluate the outcome against the
            // row's current state.
            match self.read_lock_state(id).await? {
                None => return Ok(LockOutcome::NotFound),
                Some(Some(holder)) if holder != actor => {
                    return Ok(if want_lock {
                        LockOutcome::Conflict { holder }
                    } else {
                        LockOutcome::NotHolder
                    });
                }
                // Releasing an unlocked save is a no-op success.
                Some(None) if !want_lock => {
                    if let Some(save) = self.find_by_id(id).await? {
                        return Ok(LockOutcome::Applied(save));
                    }
                    return Ok(LockOutcome::NotFound);
                }
                // The lock state changed between the two statements into
                // one the guard would accept; try again against it.
                Some(_) => continue,
            }
        }
    }

    async fn apply_edit(
        &self,
        id: DbId,
        actor: DbId,
        edit: &FieldEdit,
    ) -> Result<EditOutcome, sqlx::Error> {
        let query = format!(
            "UPDATE saves SET \
                name = COALESCE($3, name), \
                description = COALESCE($4, description), \
                data = COALESCE($5, data), \
                updated_at = NOW() \
             WHERE id = $1 AND locked_by_id = $2 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Save>(&query)
            .bind(id)
            .bind(actor)
            .bind(&edit.name)
            .bind(&edit.description)
            .bind(&edit.data)
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(save) => Ok(EditOutcome::Applied(save)),
            None => match self.read_lock_state(id).await? {
                None => Ok(EditOutcome::NotFound),
                Some(_) => Ok(EditOutcome::NotHolder),
            },
        }
    }

    async fn delete(&self, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM saves WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
