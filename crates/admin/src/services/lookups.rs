//! Cached lookup lists: roles, regions and districts.
//!
//! These tables change rarely, so their lists are kept in a process-local
//! `moka` cache for the configured TTL.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::debug;

use bozor_core::{Language, RegionId};

use crate::db::{GeoRepository, RepositoryError, RoleRepository};
use crate::models::lookup::{District, Region, Role};

/// Cached lookup list.
#[derive(Debug, Clone)]
enum CacheValue {
    Roles(Arc<Vec<Role>>),
    Regions(Arc<Vec<Region>>),
    Districts(Arc<Vec<District>>),
}

/// Process-local cache of lookup lists.
#[derive(Clone)]
pub struct LookupCache {
    cache: Cache<String, CacheValue>,
}

impl std::fmt::Debug for LookupCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupCache")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

impl LookupCache {
    /// Create an empty cache whose entries live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder().max_capacity(256).time_to_live(ttl).build(),
        }
    }

    /// Drop every cached list.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}

/// Read access to the lookup tables through the cache.
pub struct LookupService<'a> {
    roles: RoleRepository<'a>,
    geo: GeoRepository<'a>,
    cache: &'a LookupCache,
}

impl<'a> LookupService<'a> {
    /// Create a new lookup service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, cache: &'a LookupCache) -> Self {
        Self {
            roles: RoleRepository::new(pool),
            geo: GeoRepository::new(pool),
            cache,
        }
    }

    /// All live roles.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on a cache miss whose query fails.
    pub async fn roles(&self) -> Result<Arc<Vec<Role>>, RepositoryError> {
        let key = roles_key();
        if let Some(CacheValue::Roles(roles)) = self.cache.cache.get(&key).await {
            debug!(key = %key, "Lookup cache hit");
            return Ok(roles);
        }

        let roles = Arc::new(self.roles.list().await?);
        self.cache
            .cache
            .insert(key, CacheValue::Roles(Arc::clone(&roles)))
            .await;
        Ok(roles)
    }

    /// All live regions, named in `language`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on a cache miss whose query fails.
    pub async fn regions(&self, language: Language) -> Result<Arc<Vec<Region>>, RepositoryError> {
        let key = regions_key(language);
        if let Some(CacheValue::Regions(regions)) = self.cache.cache.get(&key).await {
            debug!(key = %key, "Lookup cache hit");
            return Ok(regions);
        }

        let regions = Arc::new(self.geo.regions(language).await?);
        self.cache
            .cache
            .insert(key, CacheValue::Regions(Arc::clone(&regions)))
            .await;
        Ok(regions)
    }

    /// Live districts named in `language`, optionally of one region.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on a cache miss whose query fails.
    pub async fn districts(
        &self,
        language: Language,
        region: Option<RegionId>,
    ) -> Result<Arc<Vec<District>>, RepositoryError> {
        let key = districts_key(language, region);
        if let Some(CacheValue::Districts(districts)) = self.cache.cache.get(&key).await {
            debug!(key = %key, "Lookup cache hit");
            return Ok(districts);
        }

        let districts = Arc::new(self.geo.districts(language, region).await?);
        self.cache
            .cache
            .insert(key, CacheValue::Districts(Arc::clone(&districts)))
            .await;
        Ok(districts)
    }
}

fn roles_key() -> String {
    "roles".to_owned()
}

fn regions_key(language: Language) -> String {
    format!("regions:{language}")
}

fn districts_key(language: Language, region: Option<RegionId>) -> String {
    match region {
        Some(region) => format!("districts:{language}:{region}"),
        None => format!("districts:{language}:all"),
    }
}
