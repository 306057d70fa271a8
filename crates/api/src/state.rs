use std::sync::Arc;

use toolbox_db::store::SaveStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already
/// `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool for the repository layer.
    pub pool: toolbox_db::DbPool,
    /// Server configuration (accessed by the auth extractor).
    pub config: Arc<ServerConfig>,
    /// The save document store. Behind a trait so tests can swap in the
    /// in-memory implementation.
    pub saves: Arc<dyn SaveStore>,
}
