//! Route definitions for tools.

use axum::routing::get;
use axum::Router;

use crate::handlers::tools;
use crate::state::AppState;

/// Tool routes mounted at `/tools`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(tools::list).post(tools::create))
}
