use std::sync::Arc;

use crate::config::ServerConfig;
use crate::render::TemplateEngine;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: shelfmark_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Template cache, loaded once at startup and immutable afterwards.
    pub templates: Arc<TemplateEngine>,
}
