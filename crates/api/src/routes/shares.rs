//! Route definitions for share grants addressed by grant id.

use axum::routing::{delete, post};
use axum::Router;

use crate::handlers::shares;
use crate::state::AppState;

/// Share grant routes mounted at `/shares`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/accept", post(shares::accept))
        .route("/{id}", delete(shares::remove))
}
