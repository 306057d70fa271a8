//! Route definitions.

pub mod health;
pub mod saves;
pub mod shares;
pub mod tools;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /saves                    list, create
/// /saves/{id}               get, patch (lock change or field edit), delete
/// /saves/{id}/shares        list grants, invite user
/// /shares/{id}/accept       invited user confirms a grant
/// /shares/{id}              remove a grant
/// /tools                    list, register (admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/saves", saves::router())
        .nest("/shares", shares::router())
        .nest("/tools", tools::router())
}
