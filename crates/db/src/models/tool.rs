//! Tool entity model and DTOs.
//!
//! Tools are immutable templates saves are instantiated against (e.g. a
//! SWOT analysis board implemented in the frontend). The save service only
//! needs them for the existence check at save creation.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use toolbox_core::types::{DbId, Timestamp};

/// A tool row from the `tools` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Tool {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a new tool.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTool {
    pub name: String,
}
