//! Param (product attribute) domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bozor_core::{CategoryId, LocalizedText, ParamId};

/// A param as shown in listings.
#[derive(Debug, Clone, Serialize)]
pub struct ParamSummary {
    /// Param ID.
    pub id: ParamId,
    /// Name in the request language.
    pub param_name: Option<String>,
    /// Param type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Whether the param is active.
    pub status: bool,
    /// When the param was created.
    pub created_at: DateTime<Utc>,
}

/// A single param with its category assignment.
#[derive(Debug, Clone, Serialize)]
pub struct Param {
    /// Param ID.
    pub id: ParamId,
    /// Name in every language.
    pub name: LocalizedText,
    /// Param type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Whether the param is active.
    pub status: bool,
    /// Categories the param applies to.
    pub category_id: Vec<CategoryId>,
    /// When the param was created.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a param.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateParamInput {
    /// Name; at least one variant is required.
    pub name: LocalizedText,
    /// Param type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Categories the param applies to.
    #[serde(default)]
    pub category_id: Vec<CategoryId>,
    /// Initial status, active when omitted.
    pub status: Option<bool>,
}

/// Input for updating a param.
///
/// A present `category_id` replaces the whole category list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateParamInput {
    /// Name variants to overwrite.
    pub name: Option<LocalizedText>,
    /// New type.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// New category list.
    pub category_id: Option<Vec<CategoryId>>,
    /// New status.
    pub status: Option<bool>,
}
