//! Handlers for share grants.
//!
//! The owner invites users to a save; a grant widens the invitee's
//! capabilities only after the invitee accepts it.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use toolbox_core::authorize::{require, SaveAction, PERMISSION_READ};
use toolbox_core::error::CoreError;
use toolbox_core::types::DbId;
use toolbox_db::models::share::{CreateShareGrant, ShareGrant};
use toolbox_db::repositories::{ShareRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

fn save_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Save", id })
}

fn grant_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "ShareGrant",
        id,
    })
}

/// GET /api/v1/saves/{id}/shares
///
/// All grants recorded for a save. Owner only.
pub async fn list_for_save(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(save_id): Path<DbId>,
) -> AppResult<Json<Vec<ShareGrant>>> {
    let save = state
        .saves
        .find_by_id(save_id)
        .await?
        .ok_or_else(|| save_not_found(save_id))?;

    require(&auth.actor(), SaveAction::Share, Some(save.owner_id), &[])?;

    let grants = ShareRepo::list_for_save(&state.pool, save_id).await?;
    Ok(Json(grants))
}

/// POST /api/v1/saves/{id}/shares
///
/// Invite a user to a save. Owner only; the grant starts unaccepted.
pub async fn grant(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(save_id): Path<DbId>,
    Json(input): Json<CreateShareGrant>,
) -> AppResult<(StatusCode, Json<ShareGrant>)> {
    let save = state
        .saves
        .find_by_id(save_id)
        .await?
        .ok_or_else(|| save_not_found(save_id))?;

    require(&auth.actor(), SaveAction::Share, Some(save.owner_id), &[])?;

    if input.permission < PERMISSION_READ {
        return Err(AppError::Core(CoreError::Validation(format!(
            "permission level {} is not valid",
            input.permission
        ))));
    }
    if !UserRepo::exists(&state.pool, input.user_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: input.user_id,
        }));
    }

    let grant = ShareRepo::create(&state.pool, save_id, &input).await?;
    tracing::info!(
        save_id,
        invited_user_id = input.user_id,
        permission = input.permission,
        "Share grant created"
    );
    Ok((StatusCode::CREATED, Json(grant)))
}

/// POST /api/v1/shares/{id}/accept
///
/// The invited user confirms the grant. Accepting an already-accepted
/// grant is a no-op success; anyone else is rejected.
pub async fn accept(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(grant_id): Path<DbId>,
) -> AppResult<Json<ShareGrant>> {
    if let Some(grant) = ShareRepo::accept(&state.pool, grant_id, auth.user_id).await? {
        tracing::info!(grant_id, user_id = auth.user_id, "Share grant accepted");
        return Ok(Json(grant));
    }

    // The guarded update did not match: missing grant, foreign grant, or
    // a repeat accept.
    let grant = ShareRepo::find_by_id(&state.pool, grant_id)
        .await?
        .ok_or_else(|| grant_not_found(grant_id))?;

    if grant.user_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the invited user may accept a share grant".into(),
        )));
    }
    Ok(Json(grant))
}

/// DELETE /api/v1/shares/{id}
///
/// Remove a grant. Allowed for the save's owner and for the invited user.
pub async fn remove(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(grant_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let grant = ShareRepo::find_by_id(&state.pool, grant_id)
        .await?
        .ok_or_else(|| grant_not_found(grant_id))?;

    if grant.user_id != auth.user_id {
        let save = state
            .saves
            .find_by_id(grant.save_id)
            .await?
            .ok_or_else(|| save_not_found(grant.save_id))?;
        require(&auth.actor(), SaveAction::Share, Some(save.owner_id), &[])?;
    }

    if ShareRepo::delete(&state.pool, grant_id).await? {
        tracing::info!(grant_id, user_id = auth.user_id, "Share grant removed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(grant_not_found(grant_id))
    }
}
