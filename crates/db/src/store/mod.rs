//! The save document store.
//!
//! [`SaveStore`] is the persistence contract for saves. Lock changes and
//! field edits are single atomic read-check-write operations: two
//! concurrent acquisitions against the same save must never both observe
//! it unlocked and both succeed. The contract is implemented twice:
//!
//! - [`PgSaveStore`] backs the service with PostgreSQL, using guarded
//!   single-statement UPDATEs for atomicity.
//! - [`MemorySaveStore`] holds saves in memory behind one mutex, so unit
//!   tests can drive the lock protocol (including genuine concurrency)
//!   without a database.

mod memory;
mod postgres;

pub use memory::MemorySaveStore;
pub use postgres::PgSaveStore;

use async_trait::async_trait;
use toolbox_core::locking::FieldEdit;
use toolbox_core::types::DbId;

use crate::models::save::{CreateSave, Save};

/// Result of an atomic lock-change operation.
#[derive(Debug, Clone)]
pub enum LockOutcome {
    /// The transition was applied (or was a permitted no-op); the returned
    /// row is the post-operation state.
    Applied(Save),
    /// Acquisition denied: the save is locked by `holder` and the
    /// requester is neither the holder nor the owner.
    Conflict { holder: DbId },
    /// Release denied: the save is locked by someone else.
    NotHolder,
    /// No save with the given id exists.
    NotFound,
}

/// Result of an atomic field-edit operation.
#[derive(Debug, Clone)]
pub enum EditOutcome {
    /// The edit was applied; the returned row is the post-edit state.
    Applied(Save),
    /// The requester does not hold the lock (including the unlocked case).
    NotHolder,
    /// No save with the given id exists.
    NotFound,
}

/// Durable storage for saves with per-row atomic lock and edit operations.
#[async_trait]
pub trait SaveStore: Send + Sync {
    /// Insert a new, unlocked save owned by `owner_id`.
    async fn create(&self, owner_id: DbId, input: &CreateSave) -> Result<Save, sqlx::Error>;

    async fn find_by_id(&self, id: DbId) -> Result<Option<Save>, sqlx::Error>;

    /// All saves, most recently created first.
    async fn list(&self) -> Result<Vec<Save>, sqlx::Error>;

    /// Record that the save was fetched by id (`last_opened = now`).
    /// Advisory read tracking; returns the updated row.
    async fn touch_opened(&self, id: DbId) -> Result<Option<Save>, sqlx::Error>;

    /// Atomically apply a lock-change request from `actor`.
    ///
    /// Transition rules are those of
    /// `toolbox_core::locking::evaluate_lock_change`: free saves lock for
    /// anyone, holders re-lock and release idempotently, the owner seizes
    /// held locks, everyone else conflicts. Contention is resolved
    /// immediately with a rejection, never queued.
    async fn set_lock(
        &self,
        id: DbId,
        actor: DbId,
        want_lock: bool,
    ) -> Result<LockOutcome, sqlx::Error>;

    /// Atomically apply content-field changes from `actor`, who must hold
    /// the lock at the moment the write lands. Omitted fields are left
    /// unchanged.
    async fn apply_edit(
        &self,
        id: DbId,
        actor: DbId,
        edit: &FieldEdit,
    ) -> Result<EditOutcome, sqlx::Error>;

    /// Hard-delete a save. Returns `true` if a row was removed.
    async fn delete(&self, id: DbId) -> Result<bool, sqlx::Error>;
}
