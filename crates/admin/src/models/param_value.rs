//! Param value domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bozor_core::{LocalizedText, ParamId, ParamValueId};

/// A param value as shown in listings.
#[derive(Debug, Clone, Serialize)]
pub struct ParamValueSummary {
    /// Value ID.
    pub id: ParamValueId,
    /// Name in the request language.
    pub name: Option<String>,
    /// Owning param.
    pub param_id: ParamId,
    /// Owning param's name in the request language.
    pub param_name: Option<String>,
    /// Whether the value is active.
    pub status: bool,
    /// When the value was created.
    pub created_at: DateTime<Utc>,
}

/// A single param value.
#[derive(Debug, Clone, Serialize)]
pub struct ParamValue {
    /// Value ID.
    pub id: ParamValueId,
    /// Name in every language.
    pub name: LocalizedText,
    /// Owning param.
    pub param_id: ParamId,
    /// Whether the value is active.
    pub status: bool,
    /// When the value was created.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a param value.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateParamValueInput {
    /// Name; at least one variant is required.
    pub name: LocalizedText,
    /// Owning param.
    pub param_id: ParamId,
    /// Initial status, active when omitted.
    pub status: Option<bool>,
}

/// Input for updating a param value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateParamValueInput {
    /// Name variants to overwrite.
    pub name: Option<LocalizedText>,
    /// Move the value to another param.
    pub param_id: Option<ParamId>,
    /// New status.
    pub status: Option<bool>,
}
