//! Repository for the `shared_saves` table.

use sqlx::PgPool;
use toolbox_core::types::DbId;

use crate::models::share::{CreateShareGrant, ShareGrant};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, save_id, permission, accepted, created_at, updated_at";

/// Provides CRUD operations for share grants.
pub struct ShareRepo;

impl ShareRepo {
    /// Invite a user to a save. Grants start unaccepted.
    pub async fn create(
        pool: &PgPool,
        save_id: DbId,
        input: &CreateShareGrant,
    ) -> Result<ShareGrant, sqlx::Error> {
        let query = format!(
            "INSERT INTO shared_saves (user_id, save_id, permission) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ShareGrant>(&query)
            .bind(input.user_id)
            .bind(save_id)
            .bind(input.permission)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ShareGrant>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM shared_saves WHERE id = $1");
        sqlx::query_as::<_, ShareGrant>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Accept an invitation.
    ///
    /// Guarded on the invited user and the `false -> true` edge: only the
    /// invitee flips the flag, and only once. Returns `None` when the
    /// guard does not match; the caller distinguishes missing grants,
    /// foreign grants, and repeat accepts via [`Self::find_by_id`].
    pub async fn accept(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<ShareGrant>, sqlx::Error> {
        let query = format!(
            "UPDATE shared_saves SET accepted = true, updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 AND accepted = false \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ShareGrant>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// All grants recorded for a save, oldest first.
    pub async fn list_for_save(pool: &PgPool, save_id: DbId) -> Result<Vec<ShareGrant>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM shared_saves WHERE save_id = $1 ORDER BY created_at");
        sqlx::query_as::<_, ShareGrant>(&query)
            .bind(save_id)
            .fetch_all(pool)
            .await
    }

    /// The grants a single user holds on a save. Consulted by the
    /// capability gate; there may be several rows per pair.
    pub async fn list_for_user_on_save(
        pool: &PgPool,
        save_id: DbId,
        user_id: DbId,
    ) -> Result<Vec<ShareGrant>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM shared_saves WHERE save_id = $1 AND user_id = $2"
        );
        sqlx::query_as::<_, ShareGrant>(&query)
            .bind(save_id)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Remove a grant. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM shared_saves WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
