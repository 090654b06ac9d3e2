//! Read-only lookup lists: roles, regions and districts.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bozor_core::{DistrictId, RegionId, RoleId};

/// An account role.
#[derive(Debug, Clone, Serialize)]
pub struct Role {
    /// Role ID.
    pub id: RoleId,
    /// Role name.
    pub name: String,
    /// Whether the role is active.
    pub status: bool,
    /// When the role was created.
    pub created_at: DateTime<Utc>,
}

/// A region with its name in the request language.
#[derive(Debug, Clone, Serialize)]
pub struct Region {
    /// Region ID.
    pub id: RegionId,
    /// Name in the request language.
    pub name: Option<String>,
}

/// A district with its name in the request language.
#[derive(Debug, Clone, Serialize)]
pub struct District {
    /// District ID.
    pub id: DistrictId,
    /// Name in the request language.
    pub name: Option<String>,
    /// Owning region.
    pub region_id: RegionId,
}
