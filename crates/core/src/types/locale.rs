//! Supported languages and localized text values.
//!
//! Names and descriptions are stored as JSON objects keyed by language code
//! (`{"uz": "...", "ru": "...", "en": "..."}`). Listings project a single
//! variant chosen by the `Accept-Language` header.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A language the catalog is localized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Uzbek, the fallback locale.
    #[default]
    Uz,
    /// Russian.
    Ru,
    /// English.
    En,
}

impl Language {
    /// All supported languages, fallback first.
    pub const ALL: [Self; 3] = [Self::Uz, Self::Ru, Self::En];

    /// The JSON key used for this language inside localized columns.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Uz => "uz",
            Self::Ru => "ru",
            Self::En => "en",
        }
    }

    /// Resolve the language from an `Accept-Language` header value.
    ///
    /// Absent, empty and unsupported values fall back to [`Language::Uz`].
    /// Only the first listed tag is considered and region subtags are
    /// ignored, so `ru-RU,ru;q=0.9` resolves to Russian.
    #[must_use]
    pub fn from_header(value: Option<&str>) -> Self {
        value
            .and_then(|raw| raw.split([',', ';']).next())
            .map(str::trim)
            .and_then(|tag| tag.split(['-', '_']).next())
            .and_then(|primary| primary.parse().ok())
            .unwrap_or_default()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = LocalizedTextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uz" => Ok(Self::Uz),
            "ru" => Ok(Self::Ru),
            "en" => Ok(Self::En),
            _ => Err(LocalizedTextError::UnsupportedLanguage(s.to_owned())),
        }
    }
}

/// Errors produced by localized text validation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LocalizedTextError {
    /// None of the language variants were provided.
    #[error("{field} must have at least one of uz, ru or en")]
    Empty {
        /// Name of the field being validated.
        field: &'static str,
    },
    /// The language code is not one of `uz`, `ru`, `en`.
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
}

/// A text value with one optional variant per supported language.
///
/// Doubles as its own partial-update type: when used as a patch, a `None`
/// variant leaves the stored variant untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    /// Uzbek variant.
    pub uz: Option<String>,
    /// Russian variant.
    pub ru: Option<String>,
    /// English variant.
    pub en: Option<String>,
}

impl LocalizedText {
    /// Build a value with only the Uzbek variant set.
    #[must_use]
    pub fn uz(text: impl Into<String>) -> Self {
        Self {
            uz: Some(text.into()),
            ..Self::default()
        }
    }

    /// Get the variant for a language, if present.
    #[must_use]
    pub fn get(&self, language: Language) -> Option<&str> {
        match language {
            Language::Uz => self.uz.as_deref(),
            Language::Ru => self.ru.as_deref(),
            Language::En => self.en.as_deref(),
        }
    }

    /// Whether every variant is missing or blank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        Language::ALL
            .iter()
            .all(|lang| self.get(*lang).is_none_or(|text| text.trim().is_empty()))
    }

    /// Require at least one non-blank variant.
    ///
    /// # Errors
    ///
    /// Returns `LocalizedTextError::Empty` naming `field` when all variants
    /// are missing or blank.
    pub fn ensure_present(&self, field: &'static str) -> Result<(), LocalizedTextError> {
        if self.is_empty() {
            return Err(LocalizedTextError::Empty { field });
        }
        Ok(())
    }

    /// Apply a partial update locale by locale.
    ///
    /// Variants present in `patch` overwrite the stored ones; absent variants
    /// keep their current value.
    pub fn merge(&mut self, patch: Self) {
        if patch.uz.is_some() {
            self.uz = patch.uz;
        }
        if patch.ru.is_some() {
            self.ru = patch.ru;
        }
        if patch.en.is_some() {
            self.en = patch.en;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_header_defaults_to_uz() {
        assert_eq!(Language::from_header(None), Language::Uz);
        assert_eq!(Language::from_header(Some("")), Language::Uz);
        assert_eq!(Language::from_header(Some("   ")), Language::Uz);
        assert_eq!(Language::from_header(Some("fr")), Language::Uz);
    }

    #[test]
    fn test_language_from_header_picks_first_tag() {
        assert_eq!(Language::from_header(Some("ru")), Language::Ru);
        assert_eq!(Language::from_header(Some("EN")), Language::En);
        assert_eq!(Language::from_header(Some("ru-RU,ru;q=0.9")), Language::Ru);
        assert_eq!(Language::from_header(Some("en_US")), Language::En);
    }

    #[test]
    fn test_language_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Language::Ru).unwrap(), "\"ru\"");
        assert_eq!(Language::En.to_string(), "en");
    }

    #[test]
    fn test_merge_updates_only_present_locales() {
        let mut name = LocalizedText {
            uz: Some("Kiyim".to_owned()),
            ru: Some("Одежда".to_owned()),
            en: Some("Clothes".to_owned()),
        };

        name.merge(LocalizedText {
            ru: Some("Одежда и обувь".to_owned()),
            ..LocalizedText::default()
        });

        assert_eq!(name.get(Language::Uz), Some("Kiyim"));
        assert_eq!(name.get(Language::Ru), Some("Одежда и обувь"));
        assert_eq!(name.get(Language::En), Some("Clothes"));
    }

    #[test]
    fn test_merge_with_empty_patch_is_noop() {
        let original = LocalizedText::uz("Kiyim");
        let mut name = original.clone();
        name.merge(LocalizedText::default());
        assert_eq!(name, original);
    }

    #[test]
    fn test_ensure_present() {
        assert!(LocalizedText::uz("Kiyim").ensure_present("name").is_ok());

        let blank = LocalizedText {
            uz: Some("  ".to_owned()),
            ..LocalizedText::default()
        };
        assert_eq!(
            blank.ensure_present("name"),
            Err(LocalizedTextError::Empty { field: "name" })
        );
        assert!(LocalizedText::default().ensure_present("name").is_err());
    }

    #[test]
    fn test_missing_variants_deserialize_as_none() {
        let name: LocalizedText = serde_json::from_str(r#"{"uz":"Kiyim"}"#).unwrap();
        assert_eq!(name.uz.as_deref(), Some("Kiyim"));
        assert!(name.ru.is_none());
        assert!(name.en.is_none());
    }
}
