//! Route definitions for saves and their share grants.

use axum::routing::get;
use axum::Router;

use crate::handlers::{saves, shares};
use crate::state::AppState;

/// Save routes mounted at `/saves`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(saves::list).post(saves::create))
        .route(
            "/{id}",
            get(saves::get_by_id)
                .patch(saves::update)
                .delete(saves::remove),
        )
        .route(
            "/{id}/shares",
            get(shares::list_for_save).post(shares::grant),
        )
}
