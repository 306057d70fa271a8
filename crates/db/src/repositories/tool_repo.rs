//! Repository for the `tools` table.

use sqlx::PgPool;
use toolbox_core::types::DbId;

use crate::models::tool::{CreateTool, Tool};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, created_at, updated_at";

/// Provides CRUD operations for tools.
pub struct ToolRepo;

impl ToolRepo {
    pub async fn create(pool: &PgPool, input: &CreateTool) -> Result<Tool, sqlx::Error> {
        let query = format!("INSERT INTO tools (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Tool>(&query)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Tool>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tools WHERE id = $1");
        sqlx::query_as::<_, Tool>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Tool>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tools ORDER BY name");
        sqlx::query_as::<_, Tool>(&query).fetch_all(pool).await
    }

    /// Existence check used when validating `tool_id` on save creation.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let found: Option<DbId> = sqlx::query_scalar("SELECT id FROM tools WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(found.is_some())
    }
}
