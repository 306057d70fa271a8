use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A lock acquisition was denied because another user holds the lock
    /// and the requester is not the save's owner.
    #[error("Save is locked by user {holder}")]
    LockConflict { holder: DbId },

    /// An edit or lock release was attempted by a user who does not hold
    /// the lock. Covers the unlocked case: editing requires an explicit
    /// lock first.
    #[error("Save is not locked by the requesting user")]
    NotLockHolder,

    #[error("Internal error: {0}")]
    Internal(String),
}
