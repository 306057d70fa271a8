//! Share grant model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use toolbox_core::authorize::SaveGrant;
use toolbox_core::types::{DbId, Timestamp};

/// A row from the `shared_saves` table: a user invited to collaborate on a
/// save at an integer-coded permission level.
///
/// A grant widens nothing until the invited user accepts it. `accepted`
/// moves `false -> true` exactly once and never back.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShareGrant {
    pub id: DbId,
    pub user_id: DbId,
    pub save_id: DbId,
    pub permission: i32,
    pub accepted: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ShareGrant {
    /// The grant as consulted by the capability gate.
    pub fn capability(&self) -> SaveGrant {
        SaveGrant {
            user_id: self.user_id,
            permission: self.permission,
            accepted: self.accepted,
        }
    }
}

/// DTO for inviting a user to a save.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateShareGrant {
    pub user_id: DbId,
    pub permission: i32,
}
