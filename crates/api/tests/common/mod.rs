//! Shared harness for HTTP-level integration tests.
//!
//! Requests are driven through `tower::ServiceExt::oneshot` directly
//! against the router, with the same middleware stack production uses.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use toolbox_api::auth::jwt::{generate_access_token, JwtConfig};
use toolbox_api::config::ServerConfig;
use toolbox_api::router::build_app_router;
use toolbox_api::state::AppState;
use toolbox_db::models::tool::{CreateTool, Tool};
use toolbox_db::models::user::{CreateUser, User};
use toolbox_db::repositories::{ToolRepo, UserRepo};
use toolbox_db::store::PgSaveStore;

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool. Mirrors the router construction in `main.rs`.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        saves: Arc::new(PgSaveStore::new(pool)),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user directly and return the row.
pub async fn seed_user(pool: &PgPool, username: &str, role: &str) -> User {
    let input = CreateUser {
        username: username.to_string(),
        role: role.to_string(),
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

/// Insert a tool directly and return the row.
pub async fn seed_tool(pool: &PgPool, name: &str) -> Tool {
    let input = CreateTool {
        name: name.to_string(),
    };
    ToolRepo::create(pool, &input)
        .await
        .expect("tool creation should succeed")
}

/// Mint a `Bearer ...` header value for the given user.
pub fn bearer(user: &User) -> String {
    let token = generate_access_token(user.id, &user.role, &test_config().jwt)
        .expect("token generation should succeed");
    format!("Bearer {token}")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: &str,
    path: &str,
    auth: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    app.oneshot(request).await.expect("request should not fail")
}

/// GET without credentials.
pub async fn get(app: Router, path: &str) -> Response {
    send(app, "GET", path, None, None).await
}

pub async fn get_auth(app: Router, path: &str, auth: &str) -> Response {
    send(app, "GET", path, Some(auth), None).await
}

pub async fn post_json_auth(
    app: Router,
    path: &str,
    auth: &str,
    body: serde_json::Value,
) -> Response {
    send(app, "POST", path, Some(auth), Some(body)).await
}

pub async fn patch_json_auth(
    app: Router,
    path: &str,
    auth: &str,
    body: serde_json::Value,
) -> Response {
    send(app, "PATCH", path, Some(auth), Some(body)).await
}

pub async fn delete_auth(app: Router, path: &str, auth: &str) -> Response {
    send(app, "DELETE", path, Some(auth), None).await
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}
