//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::services::{LocalFileStorage, LookupCache, TokenService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    tokens: TokenService,
    storage: LocalFileStorage,
    lookups: LookupCache,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Admin configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        let tokens = TokenService::new(&config.jwt);
        let storage = LocalFileStorage::new(&config.media);
        let lookups = LookupCache::new(config.cache_ttl);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                tokens,
                storage,
                lookups,
            }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the access token service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    /// Get a reference to the uploaded file storage.
    #[must_use]
    pub fn storage(&self) -> &LocalFileStorage {
        &self.inner.storage
    }

    /// Get a reference to the lookup list cache.
    #[must_use]
    pub fn lookups(&self) -> &LookupCache {
        &self.inner.lookups
    }
}
