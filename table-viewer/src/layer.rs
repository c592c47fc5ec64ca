//! GatewayLayer - Axum integration for the table gateway
//!
//! This module provides the entry point for mounting the gateway endpoints
//! into an Axum application.

use crate::api::create_api_router;
use crate::database::traits::DatabaseProvider;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

#[cfg(feature = "sqlite")]
use crate::database::sqlite::SqliteProvider;

/// Base path used by [`GatewayLayer::sqlite`] callers that follow the defaults
pub const DEFAULT_BASE_PATH: &str = "/api";

/// Layer that serves the table gateway from a database provider
///
/// # Example
///
/// ```rust,no_run
/// use axum::Router;
/// use table_viewer::GatewayLayer;
/// use sqlx::SqlitePool;
///
/// # async fn example() {
/// let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
/// let gateway = GatewayLayer::sqlite("/api", pool);
/// let app = Router::new().merge(gateway.into_router());
/// # }
/// ```
pub struct GatewayLayer<DB: DatabaseProvider> {
    base_path: String,
    database: Arc<DB>,
}

impl<DB: DatabaseProvider> GatewayLayer<DB> {
    /// Create a new gateway at the given base path
    ///
    /// # Arguments
    ///
    /// * `base_path` - The URL path the endpoints are mounted under (e.g., "/api")
    /// * `database` - The database provider implementation
    pub fn new(base_path: impl Into<String>, database: DB) -> Self {
        Self {
            base_path: normalize_base_path(base_path.into()),
            database: Arc::new(database),
        }
    }

    /// Path the endpoints are mounted under
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Convert into an Axum Router that can be merged
    ///
    /// The returned router serves every endpoint at `{base_path}/...` and
    /// carries permissive CORS so browser frontends on other origins can call it.
    pub fn into_router(self) -> Router {
        let api_router = create_api_router(self.database);

        if self.base_path.is_empty() {
            api_router.layer(CorsLayer::permissive())
        } else {
            Router::new()
                .nest(&self.base_path, api_router)
                .layer(CorsLayer::permissive())
        }
    }
}

#[cfg(feature = "sqlite")]
impl GatewayLayer<SqliteProvider> {
    /// Create a new gateway for SQLite
    ///
    /// # Arguments
    ///
    /// * `base_path` - The URL path the endpoints are mounted under
    /// * `pool` - The SQLite connection pool
    pub fn sqlite(base_path: impl Into<String>, pool: sqlx::SqlitePool) -> Self {
        Self::new(base_path, SqliteProvider::new(pool))
    }
}

/// Strip trailing slashes and make sure the path starts with one
fn normalize_base_path(base_path: String) -> String {
    let trimmed = base_path.trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
