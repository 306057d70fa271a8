//! User entity model and DTOs.
//!
//! Account management and authentication live with the external identity
//! provider; rows exist here so foreign keys and grant lookups resolve.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use toolbox_core::types::{DbId, Timestamp};

/// A user row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    /// Role name, e.g. `"admin"` or `"user"`.
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub role: String,
}
