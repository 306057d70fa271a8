//! Exclusive edit-lock state machine for saves.
//!
//! A save is either unlocked (`locked_by = None`) or locked by exactly one
//! user. Every mutation of a save's content fields (`name`, `description`,
//! `data`) must be performed while holding the lock; the lock itself is
//! changed through an explicit lock/unlock request. The functions here are
//! pure: they evaluate a requested transition against a snapshot of the
//! current lock state and report the resulting change. Persisting the
//! change atomically is the store's job (see `toolbox-db`).

use serde::Deserialize;

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Lock transitions
// ---------------------------------------------------------------------------

/// Result of a successfully evaluated lock-change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockChange {
    /// The lock was free (or held by another user and seized by the owner)
    /// and is now held by the requester.
    Acquired,
    /// The requester already held the lock; `last_locked` is refreshed.
    Reacquired,
    /// The requester held the lock and gave it up.
    Released,
    /// The save was already unlocked; releasing again is a no-op.
    AlreadyUnlocked,
}

/// Evaluate a lock-change request against the current lock state.
///
/// Acquisition rules:
/// - an unlocked save can be locked by anyone with update rights
/// - re-acquiring a self-held lock succeeds (idempotent refresh)
/// - the owner may always seize the lock, even from another holder
/// - any other acquisition while locked fails with [`CoreError::LockConflict`]
///
/// Release rules:
/// - the current holder may always release
/// - releasing an already-unlocked save is a no-op success
/// - releasing a lock held by someone else fails with
///   [`CoreError::NotLockHolder`]
pub fn evaluate_lock_change(
    owner_id: DbId,
    locked_by: Option<DbId>,
    actor: DbId,
    want_lock: bool,
) -> Result<LockChange, CoreError> {
    if want_lock {
        match locked_by {
            None => Ok(LockChange::Acquired),
            Some(holder) if holder == actor => Ok(LockChange::Reacquired),
            // Owner override: the owner seizes the lock from any holder.
            Some(_) if actor == owner_id => Ok(LockChange::Acquired),
            Some(holder) => Err(CoreError::LockConflict { holder }),
        }
    } else {
        match locked_by {
            None => Ok(LockChange::AlreadyUnlocked),
            Some(holder) if holder == actor => Ok(LockChange::Released),
            Some(_) => Err(CoreError::NotLockHolder),
        }
    }
}

/// Check that `actor` may edit the content fields of a save.
///
/// Editing requires the lock to be held by the actor. An unlocked save is
/// not editable: a lock must be taken explicitly first.
pub fn check_edit_allowed(locked_by: Option<DbId>, actor: DbId) -> Result<(), CoreError> {
    match locked_by {
        Some(holder) if holder == actor => Ok(()),
        _ => Err(CoreError::NotLockHolder),
    }
}

// ---------------------------------------------------------------------------
// Request classification
// ---------------------------------------------------------------------------

/// Content-field changes carried by an edit request. Each field is
/// independently optional; omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldEdit {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Opaque structured payload. Stored verbatim, never inspected.
    pub data: Option<serde_json::Value>,
}

impl FieldEdit {
    /// Returns `true` if no field change is carried.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.data.is_none()
    }
}

/// A classified save mutation: either a lock-state change or a field edit,
/// never both.
#[derive(Debug, Clone)]
pub enum SaveMutation {
    Lock(bool),
    Edit(FieldEdit),
}

/// Classify an incoming update request before any state is touched.
///
/// A request carrying `lock` together with any content field is invalid: a
/// lock change must not smuggle edits past the holder check, and vice
/// versa. A request with neither is an empty field edit, which still goes
/// through the lock-holder check.
pub fn classify_mutation(
    lock: Option<bool>,
    edit: FieldEdit,
) -> Result<SaveMutation, CoreError> {
    match lock {
        Some(_) if !edit.is_empty() => Err(CoreError::Validation(
            "A request may change the lock state or edit fields, not both".into(),
        )),
        Some(want_lock) => Ok(SaveMutation::Lock(want_lock)),
        None => Ok(SaveMutation::Edit(edit)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
