//! Category domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bozor_core::{CategoryId, LocalizedText, ParamId, Patch};

/// A category as shown in listings, with names in the request language.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    /// Category ID.
    pub id: CategoryId,
    /// Name in the request language.
    pub name: Option<String>,
    /// Parent category, if nested.
    pub parent_id: Option<CategoryId>,
    /// Parent name in the request language.
    pub parent_name: Option<String>,
    /// Whether the category is active.
    pub status: bool,
    /// When the category was created.
    pub created_at: DateTime<Utc>,
}

/// A single category with all name variants and its attached params.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    /// Category ID.
    pub id: CategoryId,
    /// Name in every language.
    pub name: LocalizedText,
    /// Name in the request language.
    pub name_localized: Option<String>,
    /// Parent category, if nested.
    pub parent_id: Option<CategoryId>,
    /// Whether the category is active.
    pub status: bool,
    /// When the category was created.
    pub created_at: DateTime<Utc>,
    /// Live, active params whose category list contains this category.
    pub params: Vec<CategoryParam>,
}

/// A param attached to a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryParam {
    /// Param ID.
    pub id: ParamId,
    /// Param type (free-form, e.g. `select`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Name in the request language.
    pub name: Option<String>,
}

/// Input for creating a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryInput {
    /// Name; at least one variant is required.
    pub name: LocalizedText,
    /// Parent category.
    pub parent_id: Option<CategoryId>,
    /// Initial status, active when omitted.
    pub status: Option<bool>,
}

/// Input for updating a category.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategoryInput {
    /// Name variants to overwrite.
    pub name: Option<LocalizedText>,
    /// New status.
    pub status: Option<bool>,
    /// New parent; `null` detaches the category.
    #[serde(default)]
    pub parent_id: Patch<CategoryId>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_update_input_distinguishes_null_parent() {
        let input: UpdateCategoryInput = serde_json::from_str(r#"{"status":false}"#).unwrap();
        assert!(input.parent_id.is_absent());
        assert_eq!(input.status, Some(false));

        let input: UpdateCategoryInput = serde_json::from_str(r#"{"parent_id":null}"#).unwrap();
        assert_eq!(input.parent_id, Patch::Null);

        let input: UpdateCategoryInput = serde_json::from_str(r#"{"parent_id":4}"#).unwrap();
        assert_eq!(input.parent_id, Patch::Value(CategoryId::new(4)));
    }

    #[test]
    fn test_category_param_serializes_type_key() {
        let param = CategoryParam {
            id: ParamId::new(3),
            kind: "select".to_owned(),
            name: Some("Rang".to_owned()),
        };
        let json = serde_json::to_value(&param).unwrap();
        assert_eq!(json["type"], "select");
        assert_eq!(json["id"], 3);
    }
}
