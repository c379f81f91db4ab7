//! Versioned wire fields.
//!
//! A view-model's wire shape evolves across releases. Each evolving field
//! carries the version range across which it exists on the wire; when a
//! payload tagged with an older version is decoded, only the fields whose
//! range covers that version are required to be present.

use crate::version::{Version, VersionError};
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::ops::Deref;

/// Errors raised while decoding a version-tagged payload.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The payload was not a JSON object.
    #[error("versioned payload must be a JSON object")]
    NotAnObject,

    /// A field expected at the payload's version was absent.
    #[error("field '{field}' is required at version {version} but absent")]
    MissingField { field: String, version: Version },

    /// A present field failed to deserialize.
    #[error("failed to decode field '{field}': {source}")]
    Field {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    /// The payload itself failed to parse.
    #[error("failed to parse versioned payload: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The version range across which a field exists on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionRange {
    introduced: Version,
    removed: Option<Version>,
}

impl VersionRange {
    /// A field present since `introduced`, never removed.
    pub fn since(introduced: Version) -> Self {
        Self {
            introduced,
            removed: None,
        }
    }

    /// A field present since the initial version.
    pub fn always() -> Self {
        Self::since(Version::INITIAL)
    }

    /// A bounded range.
    ///
    /// # Returns
    /// * `Ok(VersionRange)` if `introduced <= removed`
    /// * `Err(VersionError::InvalidRange)` otherwise
    pub fn between(introduced: Version, removed: Version) -> Result<Self, VersionError> {
        if introduced > removed {
            return Err(VersionError::InvalidRange {
                lower: introduced,
                upper: removed,
            });
        }
        Ok(Self {
            introduced,
            removed: Some(removed),
        })
    }

    /// The version that introduced the field.
    pub fn introduced(&self) -> Version {
        self.introduced
    }

    /// The version after which the field was removed, if any.
    pub fn removed(&self) -> Option<Version> {
        self.removed
    }

    /// Whether a payload tagged `version` is expected to carry the field.
    pub fn contains(&self, version: &Version) -> bool {
        self.introduced <= *version && self.removed.map_or(true, |removed| *version <= removed)
    }
}

/// A field value tagged with the version range in which it is valid.
///
/// Serializes transparently as the inner value; the range is metadata for
/// decoding older payloads, never part of the wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedField<T> {
    value: T,
    range: VersionRange,
}

impl<T> VersionedField<T> {
    pub fn new(value: T, range: VersionRange) -> Self {
        Self { value, range }
    }

    /// A field present since the initial version.
    pub fn original(value: T) -> Self {
        Self::new(value, VersionRange::always())
    }

    pub fn range(&self) -> VersionRange {
        self.range
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> Deref for VersionedField<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: Serialize> Serialize for VersionedField<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

/// Decodes a version-tagged JSON payload field by field.
///
/// Each field is requested with its version range: a field whose range
/// excludes the payload's version is simply `None` (absence is not an error),
/// while a field whose range covers it must be present and decodable.
#[derive(Debug)]
pub struct VersionedDecoder {
    fields: serde_json::Map<String, Value>,
    version: Version,
}

impl VersionedDecoder {
    /// Wrap a parsed payload claiming to be `version`.
    pub fn new(payload: Value, version: Version) -> Result<Self, DecodeError> {
        match payload {
            Value::Object(fields) => Ok(Self { fields, version }),
            _ => Err(DecodeError::NotAnObject),
        }
    }

    /// Parse a raw body and wrap it.
    pub fn from_str(body: &str, version: Version) -> Result<Self, DecodeError> {
        Self::new(serde_json::from_str(body)?, version)
    }

    /// The payload's claimed version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Decode a field under its version range.
    ///
    /// # Returns
    /// * `Ok(None)` when the range excludes the payload version (a field that
    ///   is not expected may be absent; if present anyway it is ignored)
    /// * `Ok(Some(value))` when the range covers the version and the field
    ///   decodes
    /// * `Err(DecodeError::MissingField)` when the range covers the version
    ///   but the field is absent
    pub fn field<T: DeserializeOwned>(
        &self,
        name: &str,
        range: VersionRange,
    ) -> Result<Option<T>, DecodeError> {
        if !range.contains(&self.version) {
            return Ok(None);
        }
        let value = self
            .fields
            .get(name)
            .ok_or_else(|| DecodeError::MissingField {
                field: name.to_string(),
                version: self.version,
            })?;
        let decoded = serde_json::from_value(value.clone()).map_err(|source| DecodeError::Field {
            field: name.to_string(),
            source,
        })?;
        Ok(Some(decoded))
    }

    /// Decode a field present since the initial version (always required).
    pub fn required<T: DeserializeOwned>(&self, name: &str) -> Result<T, DecodeError> {
        self.field(name, VersionRange::always())?
            .ok_or_else(|| DecodeError::MissingField {
                field: name.to_string(),
                version: self.version,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(major: u32, minor: u32, patch: u32) -> Version {
        Version::new(major, minor, patch)
    }

    // ==================== VersionRange Tests ====================

    #[test]
    fn test_range_since() {
        let range = VersionRange::since(v(2, 0, 0));
        assert!(!range.contains(&v(1, 9, 9)));
        assert!(range.contains(&v(2, 0, 0)));
        assert!(range.contains(&v(99, 0, 0)));
    }

    #[test]
    fn test_range_always() {
        let range = VersionRange::always();
        assert!(range.contains(&v(1, 0, 0)));
        assert!(range.contains(&v(42, 1, 3)));
    }

    #[test]
    fn test_range_between() {
        let range = VersionRange::between(v(1, 2, 0), v(2, 0, 0)).expect("valid range");
        assert!(!range.contains(&v(1, 1, 9)));
        assert!(range.contains(&v(1, 2, 0)));
        assert!(range.contains(&v(2, 0, 0)));
        assert!(!range.contains(&v(2, 0, 1)));
    }

    #[test]
    fn test_range_rejects_reversed_bounds() {
        let result = VersionRange::between(v(2, 0, 0), v(1, 0, 0));
        assert!(matches!(result, Err(VersionError::InvalidRange { .. })));
    }

    #[test]
    fn test_range_single_version() {
        let range = VersionRange::between(v(1, 5, 0), v(1, 5, 0)).expect("valid range");
        assert!(range.contains(&v(1, 5, 0)));
        assert!(!range.contains(&v(1, 5, 1)));
    }

    // ==================== VersionedField Tests ====================

    #[test]
    fn test_versioned_field_serializes_transparently() {
        let field = VersionedField::new("hello".to_string(), VersionRange::since(v(2, 0, 0)));
        let json = serde_json::to_string(&field).expect("serialize");
        assert_eq!(json, "\"hello\"");
    }

    #[test]
    fn test_versioned_field_invariant_bounds() {
        let range = VersionRange::between(v(1, 0, 0), v(3, 0, 0)).expect("valid");
        let field = VersionedField::new(7u32, range);
        assert_eq!(field.range().introduced(), v(1, 0, 0));
        assert_eq!(field.range().removed(), Some(v(3, 0, 0)));
        assert_eq!(*field, 7);
        assert_eq!(field.into_inner(), 7);
    }

    #[test]
    fn test_versioned_field_deref() {
        let field = VersionedField::original("text".to_string());
        assert_eq!(field.len(), 4);
    }

    // ==================== VersionedDecoder Tests ====================

    const PAYLOAD_V1: &str = r#"{"name": "unit"}"#;
    const PAYLOAD_V2: &str = r#"{"name": "unit", "badge_count": 3}"#;

    fn badge_range() -> VersionRange {
        VersionRange::since(v(2, 0, 0))
    }

    #[test]
    fn test_old_payload_does_not_require_newer_field() {
        // Field introduced at 2.0.0; payload tagged 1.0.0 may omit it.
        let decoder = VersionedDecoder::from_str(PAYLOAD_V1, v(1, 0, 0)).expect("payload");
        let badge: Option<u32> = decoder.field("badge_count", badge_range()).expect("decode");
        assert!(badge.is_none());
    }

    #[test]
    fn test_new_payload_requires_field() {
        // Same type, payload tagged 2.0.0: the field must be present.
        let decoder = VersionedDecoder::from_str(PAYLOAD_V1, v(2, 0, 0)).expect("payload");
        let err = decoder.field::<u32>("badge_count", badge_range()).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField { .. }));
        assert!(err.to_string().contains("badge_count"));
        assert!(err.to_string().contains("2.0.0"));
    }

    #[test]
    fn test_new_payload_decodes_field() {
        let decoder = VersionedDecoder::from_str(PAYLOAD_V2, v(2, 0, 0)).expect("payload");
        let badge: Option<u32> = decoder.field("badge_count", badge_range()).expect("decode");
        assert_eq!(badge, Some(3));
    }

    #[test]
    fn test_removed_field_not_required_after_removal() {
        let range = VersionRange::between(v(1, 0, 0), v(1, 9, 0)).expect("valid");
        let decoder = VersionedDecoder::from_str(PAYLOAD_V1, v(2, 0, 0)).expect("payload");
        // "legacy" was removed after 1.9.0; a 2.0.0 payload need not carry it.
        let legacy: Option<String> = decoder.field("legacy", range).expect("decode");
        assert!(legacy.is_none());
    }

    #[test]
    fn test_unexpected_present_field_is_ignored() {
        // badge_count present in a 1.0.0 payload although its range starts at
        // 2.0.0: ignored, not an error.
        let decoder = VersionedDecoder::from_str(PAYLOAD_V2, v(1, 0, 0)).expect("payload");
        let badge: Option<u32> = decoder.field("badge_count", badge_range()).expect("decode");
        assert!(badge.is_none());
    }

    #[test]
    fn test_required_field() {
        let decoder = VersionedDecoder::from_str(PAYLOAD_V1, v(1, 0, 0)).expect("payload");
        let name: String = decoder.required("name").expect("decode");
        assert_eq!(name, "unit");
        assert!(decoder.required::<String>("missing").is_err());
    }

    #[test]
    fn test_type_mismatch_is_field_error() {
        let decoder = VersionedDecoder::from_str(PAYLOAD_V2, v(2, 0, 0)).expect("payload");
        let err = decoder
            .field::<String>("badge_count", badge_range())
            .unwrap_err();
        assert!(matches!(err, DecodeError::Field { .. }));
    }

    #[test]
    fn test_non_object_payload_rejected() {
        let result = VersionedDecoder::from_str("[1,2,3]", v(1, 0, 0));
        assert!(matches!(result, Err(DecodeError::NotAnObject)));
    }

    #[test]
    fn test_invalid_json_rejected() {
        let result = VersionedDecoder::from_str("{broken", v(1, 0, 0));
        assert!(matches!(result, Err(DecodeError::Parse(_))));
    }

    #[test]
    fn test_decoder_reports_version() {
        let decoder = VersionedDecoder::from_str(PAYLOAD_V1, v(1, 2, 3)).expect("payload");
        assert_eq!(decoder.version(), v(1, 2, 3));
    }
}
