//! Handlers for the `/saves` resource.
//!
//! A save's content fields change only behind the exclusive edit lock.
//! `PATCH /saves/{id}` carries either a lock-state change or a field edit;
//! the request is classified and authorized before the store performs the
//! transition as one atomic step.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use toolbox_core::authorize::{require, SaveAction, SaveGrant};
use toolbox_core::error::CoreError;
use toolbox_core::locking::{check_edit_allowed, classify_mutation, FieldEdit, SaveMutation};
use toolbox_core::types::DbId;
use toolbox_db::models::save::{CreateSave, Save, UpdateSaveRequest};
use toolbox_db::repositories::{ShareRepo, ToolRepo};
use toolbox_db::store::{EditOutcome, LockOutcome};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

fn save_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Save", id })
}

/// The acting user's grants on a save, as seen by the capability gate.
async fn grants_for(
    state: &AppState,
    save_id: DbId,
    user_id: DbId,
) -> Result<Vec<SaveGrant>, AppError> {
    let grants = ShareRepo::list_for_user_on_save(&state.pool, save_id, user_id).await?;
    Ok(grants.iter().map(|g| g.capability()).collect())
}

/// GET /api/v1/saves
///
/// Every save on the platform; requires the view-all privilege.
pub async fn list(auth: AuthUser, State(state): State<AppState>) -> AppResult<Json<Vec<Save>>> {
    require(&auth.actor(), SaveAction::ViewAny, None, &[])?;
    let saves = state.saves.list().await?;
    Ok(Json(saves))
}

/// POST /api/v1/saves
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateSave>,
) -> AppResult<(StatusCode, Json<Save>)> {
    require(&auth.actor(), SaveAction::Create, None, &[])?;

    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "name must not be empty".into(),
        )));
    }
    if !ToolRepo::exists(&state.pool, input.tool_id).await? {
        return Err(AppError::Core(CoreError::Validation(format!(
            "tool {} does not exist",
            input.tool_id
        ))));
    }

    let save = state.saves.create(auth.user_id, &input).await?;
    tracing::info!(save_id = save.id, owner_id = auth.user_id, "Save created");
    Ok((StatusCode::CREATED, Json(save)))
}

/// GET /api/v1/saves/{id}
///
/// Side effect: records the fetch in `last_opened` (advisory).
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Save>> {
    let save = state
        .saves
        .find_by_id(id)
        .await?
        .ok_or_else(|| save_not_found(id))?;

    let grants = grants_for(&state, id, auth.user_id).await?;
    require(&auth.actor(), SaveAction::View, Some(save.owner_id), &grants)?;

    let save = state
        .saves
        .touch_opened(id)
        .await?
        .ok_or_else(|| save_not_found(id))?;
    Ok(Json(save))
}

/// PATCH /api/v1/saves/{id}
///
/// Either a lock-state change (`{"lock": bool}`) or a field edit
/// (`{"name"?, "description"?, "data"?}`). Mixing both is rejected before
/// any state is touched.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSaveRequest>,
) -> AppResult<Json<Save>> {
    let edit = FieldEdit {
        name: input.name,
        description: input.description,
        data: input.data,
    };
    let mutation = classify_mutation(input.lock, edit)?;

    let save = state
        .saves
        .find_by_id(id)
        .await?
        .ok_or_else(|| save_not_found(id))?;

    match mutation {
        SaveMutation::Lock(want_lock) => {
            // Lock changes need no save-level capability: any
            // authenticated user may take a free lock, and the state
            // machine itself arbitrates held ones (owner override
            // included).
            match state.saves.set_lock(id, auth.user_id, want_lock).await? {
                LockOutcome::Applied(save) => {
                    tracing::info!(
                        save_id = id,
                        user_id = auth.user_id,
                        locked = want_lock,
                        "Lock state changed"
                    );
                    Ok(Json(save))
                }
                LockOutcome::Conflict { holder } => {
                    Err(AppError::Core(CoreError::LockConflict { holder }))
                }
                LockOutcome::NotHolder => Err(AppError::Core(CoreError::NotLockHolder)),
                LockOutcome::NotFound => Err(save_not_found(id)),
            }
        }
        SaveMutation::Edit(edit) => {
            // The holder check comes first: a non-holder is told the save
            // is locked, whatever their capabilities.
            check_edit_allowed(save.locked_by_id, auth.user_id)?;

            let grants = grants_for(&state, id, auth.user_id).await?;
            require(&auth.actor(), SaveAction::Update, Some(save.owner_id), &grants)?;

            match state.saves.apply_edit(id, auth.user_id, &edit).await? {
                EditOutcome::Applied(save) => {
                    tracing::debug!(save_id = id, user_id = auth.user_id, "Save edited");
                    Ok(Json(save))
                }
                EditOutcome::NotHolder => Err(AppError::Core(CoreError::NotLockHolder)),
                EditOutcome::NotFound => Err(save_not_found(id)),
            }
        }
    }
}

/// DELETE /api/v1/saves/{id}
pub async fn remove(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let save = state
        .saves
        .find_by_id(id)
        .await?
        .ok_or_else(|| save_not_found(id))?;

    require(&auth.actor(), SaveAction::Delete, Some(save.owner_id), &[])?;

    if state.saves.delete(id).await? {
        tracing::info!(save_id = id, user_id = auth.user_id, "Save deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(save_not_found(id))
    }
}
