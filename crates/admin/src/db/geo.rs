//! Region and district repository.

use sqlx::PgPool;

use bozor_core::{DistrictId, Language, RegionId};

use super::RepositoryError;
use crate::models::lookup::{District, Region};

#[derive(Debug, sqlx::FromRow)]
struct RegionRow {
    id: RegionId,
    name: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct DistrictRow {
    id: DistrictId,
    name: Option<String>,
    region_id: RegionId,
}

/// Repository for the `regions` and `districts` lookup tables.
pub struct GeoRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> GeoRepository<'a> {
    /// Create a new geography repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List live regions.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn regions(&self, language: Language) -> Result<Vec<Region>, RepositoryError> {
        let rows = sqlx::query_as::<_, RegionRow>(
            r"
            SELECT id, name ->> $1::text AS name
            FROM regions
            WHERE deleted_at IS NULL
            ORDER BY id
            ",
        )
        .bind(language.as_str())
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Region {
                id: row.id,
                name: row.name,
            })
            .collect())
    }

    /// List live districts, optionally of one region.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn districts(
        &self,
        language: Language,
        region: Option<RegionId>,
    ) -> Result<Vec<District>, RepositoryError> {
        let rows = sqlx::query_as::<_, DistrictRow>(
            r"
            SELECT id, name ->> $1::text AS name, region_id
            FROM districts
            WHERE deleted_at IS NULL AND ($2::bigint IS NULL OR region_id = $2)
            ORDER BY id
            ",
        )
        .bind(language.as_str())
        .bind(region)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| District {
                id: row.id,
                name: row.name,
                region_id: row.region_id,
            })
            .collect())
    }
}
