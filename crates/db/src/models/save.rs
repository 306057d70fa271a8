//! Save entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use toolbox_core::types::{DbId, Timestamp};

/// A save row from the `saves` table.
///
/// `data` is an opaque structured payload: it is stored and returned
/// verbatim, never parsed or validated beyond JSON well-formedness.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Save {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub data: Option<serde_json::Value>,
    /// The tool this save was created against. Immutable.
    pub tool_id: DbId,
    /// The user who created the save. Immutable.
    pub owner_id: DbId,
    /// The user currently holding the exclusive edit lock, if any.
    pub locked_by_id: Option<DbId>,
    /// When the lock was last acquired. Advisory only.
    pub last_locked: Option<Timestamp>,
    /// When the save was last fetched by id. Advisory only.
    pub last_opened: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new save.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSave {
    pub name: String,
    pub description: Option<String>,
    pub data: Option<serde_json::Value>,
    pub tool_id: DbId,
}

/// DTO for `PATCH /saves/{id}`.
///
/// Carries either a lock-state change (`lock` set, no content fields) or a
/// field edit (`lock` absent). `toolbox_core::locking::classify_mutation`
/// rejects requests mixing both before any state is touched.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSaveRequest {
    pub lock: Option<bool>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub data: Option<serde_json::Value>,
}
