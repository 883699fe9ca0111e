use std::sync::Arc;

use gallery_core::config::CatalogConfig;
use gallery_core::storage::BlobStorage;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything non-trivial is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: gallery_db::DbPool,
    /// Server configuration (token secret, timeouts, storage layout).
    pub config: Arc<ServerConfig>,
    /// Catalog settings handed to the domain functions.
    pub catalog: Arc<CatalogConfig>,
    /// Blob storage holding asset media.
    pub storage: Arc<dyn BlobStorage>,
}
