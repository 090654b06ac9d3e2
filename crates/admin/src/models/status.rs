//! Order and payment status lookup types.
//!
//! Both tables share one shape, so the ID is a plain `i64`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bozor_core::LocalizedText;

/// A status as shown in listings.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSummary {
    /// Status ID.
    pub id: i64,
    /// Name in the request language.
    pub name: Option<String>,
    /// Stable machine key (e.g. `paid`).
    pub key: Option<String>,
    /// Whether the status is active.
    pub status: bool,
    /// When the status was created.
    pub created_at: DateTime<Utc>,
}

/// A single status with all name variants.
#[derive(Debug, Clone, Serialize)]
pub struct StatusEntry {
    /// Status ID.
    pub id: i64,
    /// Name in every language.
    pub name: LocalizedText,
    /// Stable machine key.
    pub key: Option<String>,
    /// Whether the status is active.
    pub status: bool,
    /// When the status was created.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a status.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStatusInput {
    /// Name; at least one variant is required.
    pub name: LocalizedText,
    /// Stable machine key.
    pub key: Option<String>,
    /// Initial status, active when omitted.
    pub status: Option<bool>,
}

/// Input for updating a status.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStatusInput {
    /// Name variants to overwrite.
    pub name: Option<LocalizedText>,
    /// New key.
    pub key: Option<String>,
    /// New status.
    pub status: Option<bool>,
}
