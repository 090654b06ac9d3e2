//! Tri-state field for partial updates.
//!
//! `Option<T>` cannot tell "field omitted" apart from "field explicitly set to
//! null". Fields that may be cleared (a category's `parent_id`, for example)
//! use [`Patch`] together with `#[serde(default)]` instead:
//!
//! ```rust
//! # use bozor_core::Patch;
//! #[derive(serde::Deserialize)]
//! struct UpdateCategory {
//!     #[serde(default)]
//!     parent_id: Patch<i64>,
//! }
//!
//! let omitted: UpdateCategory = serde_json::from_str("{}").unwrap();
//! assert!(omitted.parent_id.is_absent());
//!
//! let cleared: UpdateCategory = serde_json::from_str(r#"{"parent_id":null}"#).unwrap();
//! assert_eq!(cleared.parent_id, Patch::Null);
//! ```

use serde::{Deserialize, Deserializer};

/// A partial-update field: absent, explicitly null, or a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Patch<T> {
    /// The field was not present; keep the stored value.
    #[default]
    Absent,
    /// The field was `null`; clear the stored value.
    Null,
    /// The field carries a new value.
    Value(T),
}

impl<T> Patch<T> {
    /// Whether the field was omitted.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// The new value, if one was given.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Absent | Self::Null => None,
        }
    }

    /// Resolve against the currently stored value.
    #[must_use]
    pub fn apply(self, current: Option<T>) -> Option<T> {
        match self {
            Self::Absent => current,
            Self::Null => None,
            Self::Value(value) => Some(value),
        }
    }

    /// Map the carried value, preserving absent/null.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Self::Absent => Patch::Absent,
            Self::Null => Patch::Null,
            Self::Value(value) => Patch::Value(f(value)),
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Only reached when the key is present; omission goes through Default.
        Ok(Option::<T>::deserialize(deserializer)?.map_or(Self::Null, Self::Value))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Update {
        #[serde(default)]
        parent_id: Patch<i64>,
    }

    #[test]
    fn test_deserialize_three_states() {
        let absent: Update = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.parent_id, Patch::Absent);

        let null: Update = serde_json::from_str(r#"{"parent_id":null}"#).unwrap();
        assert_eq!(null.parent_id, Patch::Null);

        let value: Update = serde_json::from_str(r#"{"parent_id":3}"#).unwrap();
        assert_eq!(value.parent_id, Patch::Value(3));
    }

    #[test]
    fn test_apply() {
        assert_eq!(Patch::Absent.apply(Some(5)), Some(5));
        assert_eq!(Patch::<i64>::Null.apply(Some(5)), None);
        assert_eq!(Patch::Value(7).apply(Some(5)), Some(7));
        assert_eq!(Patch::Value(7).apply(None), Some(7));
    }

    #[test]
    fn test_map_preserves_state() {
        assert_eq!(Patch::Value(2).map(|v| v * 10), Patch::Value(20));
        assert_eq!(Patch::<i64>::Null.map(|v| v * 10), Patch::Null);
        assert!(Patch::<i64>::Absent.map(|v| v * 10).is_absent());
    }
}
