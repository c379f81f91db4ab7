//! Locale identifier used to key localization lookups.
//!
//! A `Locale` is a validated language tag such as `"en"`, `"en-GB"` or `"es"`.
//! Lookups against the localization store are exact-match only: `"en-GB"` never
//! falls back to `"en"`. Callers that want fallback must request each locale
//! explicitly.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Error raised when a locale string fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid locale: '{input}'")]
pub struct InvalidLocale {
    pub input: String,
}

/// A validated locale tag.
///
/// Accepted shape: one or more non-empty ASCII alphanumeric segments joined by
/// `-`. Case is preserved as given; no normalization is applied, so `"en-GB"`
/// and `"en-gb"` are distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locale(String);

impl Locale {
    /// Create a locale from a tag string.
    ///
    /// # Returns
    /// * `Ok(Locale)` if the tag is well-formed
    /// * `Err(InvalidLocale)` if it is empty or contains invalid segments
    pub fn new(tag: &str) -> Result<Self, InvalidLocale> {
        let well_formed = !tag.is_empty()
            && tag
                .split('-')
                .all(|seg| !seg.is_empty() && seg.bytes().all(|b| b.is_ascii_alphanumeric()));

        if well_formed {
            Ok(Locale(tag.to_string()))
        } else {
            Err(InvalidLocale {
                input: tag.to_string(),
            })
        }
    }

    /// The locale tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Locale {
    type Err = InvalidLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::new(s)
    }
}

impl Serialize for Locale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Locale {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Locale::new(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Validation Tests ====================

    #[test]
    fn test_simple_tag() {
        let locale = Locale::new("en").expect("should validate");
        assert_eq!(locale.as_str(), "en");
    }

    #[test]
    fn test_region_tag() {
        let locale = Locale::new("en-GB").expect("should validate");
        assert_eq!(locale.as_str(), "en-GB");
    }

    #[test]
    fn test_rejects_empty() {
        assert!(Locale::new("").is_err());
    }

    #[test]
    fn test_rejects_empty_segment() {
        assert!(Locale::new("en-").is_err());
        assert!(Locale::new("-en").is_err());
        assert!(Locale::new("en--GB").is_err());
    }

    #[test]
    fn test_rejects_invalid_characters() {
        assert!(Locale::new("en_GB").is_err());
        assert!(Locale::new("en GB").is_err());
        assert!(Locale::new("ñ").is_err());
    }

    #[test]
    fn test_error_names_input() {
        let err = Locale::new("en_GB").unwrap_err();
        assert!(err.to_string().contains("en_GB"));
    }

    // ==================== Exact-Match Semantics Tests ====================

    #[test]
    fn test_case_is_significant() {
        let lower = Locale::new("en-gb").unwrap();
        let upper = Locale::new("en-GB").unwrap();
        assert_ne!(lower, upper);
    }

    #[test]
    fn test_region_is_distinct_from_base() {
        let base = Locale::new("en").unwrap();
        let region = Locale::new("en-GB").unwrap();
        assert_ne!(base, region);
    }

    // ==================== Trait Tests ====================

    #[test]
    fn test_from_str() {
        let locale: Locale = "es".parse().expect("should parse");
        assert_eq!(locale.as_str(), "es");
    }

    #[test]
    fn test_display() {
        let locale = Locale::new("en-GB").unwrap();
        assert_eq!(locale.to_string(), "en-GB");
    }

    #[test]
    fn test_serde_roundtrip() {
        let locale = Locale::new("en-GB").unwrap();
        let json = serde_json::to_string(&locale).expect("serialize");
        assert_eq!(json, "\"en-GB\"");
        let restored: Locale = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(locale, restored);
    }

    #[test]
    fn test_deserialize_rejects_invalid() {
        let result: Result<Locale, _> = serde_json::from_str("\"en_GB\"");
        assert!(result.is_err());
    }
}
