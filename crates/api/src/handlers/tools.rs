//! Handlers for the `/tools` resource.
//!
//! Tools are the immutable templates saves are created against. The save
//! service only lists them and registers new ones; their behavior lives
//! entirely in the frontend.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use toolbox_core::error::CoreError;
use toolbox_db::models::tool::{CreateTool, Tool};
use toolbox_db::repositories::ToolRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// GET /api/v1/tools
pub async fn list(_auth: AuthUser, State(state): State<AppState>) -> AppResult<Json<Vec<Tool>>> {
    let tools = ToolRepo::list(&state.pool).await?;
    Ok(Json(tools))
}

/// POST /api/v1/tools
pub async fn create(
    RequireAdmin(auth): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateTool>,
) -> AppResult<(StatusCode, Json<Tool>)> {
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "name must not be empty".into(),
        )));
    }

    let tool = ToolRepo::create(&state.pool, &input).await?;
    tracing::info!(tool_id = tool.id, admin_id = auth.user_id, "Tool registered");
    Ok((StatusCode::CREATED, Json(tool)))
}
