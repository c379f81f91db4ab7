//! Localizable value types and their pending/resolved lifecycle.
//!
//! Every variant starts *pending*, carrying enough data to perform a store
//! lookup later: a lookup key derived from a property name (possibly combined
//! with a parent key or a collection index), formatting options for integers,
//! or piece references for compounds. The encoder transitions each value to
//! *resolved* exactly once; after that the value is immutable and serializes as
//! a plain scalar or array of strings. The wire format carries no trace of the
//! pending/resolved distinction.
//!
//! Serializing a value that is still pending is a hard error: a pending value
//! must never silently become empty text on the wire.

use crate::i18n::registry::{InstancePath, ResolveContext};
use crate::i18n::LocalizationError;
use regex::Regex;
use serde::de::{SeqAccess, Visitor};
use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

// Placeholder syntax in looked-up templates: %{key}
static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX.get_or_init(|| Regex::new(r"%\{([A-Za-z0-9_]+)\}").unwrap())
}

/// How a pending field derives its store lookup path.
///
/// The derivation rule is plain data consumed by one generic resolution
/// routine, rather than one code path per field shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    /// Look up under the field's own property name (`"title"`).
    Property(String),
    /// Look up under an explicit parent key segment (`"errors.title"`).
    ParentKeyed { parent: String, name: String },
    /// Look up under a collection position (`"items.2"`).
    Indexed { property: String, index: usize },
}

impl LookupKey {
    /// The dot-joined property path used against the localization store.
    pub fn path(&self) -> String {
        match self {
            LookupKey::Property(name) => name.clone(),
            LookupKey::ParentKeyed { parent, name } => format!("{}.{}", parent, name),
            LookupKey::Indexed { property, index } => format!("{}.{}", property, index),
        }
    }
}

/// Digit-grouping options for localizable integers.
///
/// When `grouped` is set, a separator is inserted every `grouping_size` digits
/// from the right. The size is honored literally (a size of 4 groups by four,
/// it is not forced to 3). A `grouping_size` of 0 is treated as grouping
/// disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerFormat {
    pub grouped: bool,
    pub grouping_size: u32,
    pub separator: char,
}

impl Default for IntegerFormat {
    fn default() -> Self {
        Self {
            grouped: true,
            grouping_size: 3,
            separator: ',',
        }
    }
}

impl IntegerFormat {
    /// An ungrouped format (digits only).
    pub fn plain() -> Self {
        Self {
            grouped: false,
            ..Self::default()
        }
    }

    /// Format a raw value according to these options.
    pub fn format(&self, value: i64) -> String {
        if !self.grouped || self.grouping_size == 0 {
            return value.to_string();
        }

        let digits = value.unsigned_abs().to_string();
        let size = self.grouping_size as usize;
        let mut grouped = String::with_capacity(digits.len() + digits.len() / size + 1);

        for (i, ch) in digits.chars().enumerate() {
            let remaining = digits.len() - i;
            if i > 0 && remaining % size == 0 {
                grouped.push(self.separator);
            }
            grouped.push(ch);
        }

        if value < 0 {
            format!("-{}", grouped)
        } else {
            grouped
        }
    }
}

/// A reference to one piece of localized content, used both as a compound
/// constituent and as a substitution value. Resolved to a string without
/// mutating anything, so per-instance substitution snapshots stay shareable.
#[derive(Debug, Clone, PartialEq)]
pub enum LocalizedPart {
    /// Text supplied directly by business logic.
    Literal(String),
    /// A number formatted at resolve time.
    Number { value: i64, format: IntegerFormat },
    /// Text looked up from the store under the owning type.
    Lookup(LookupKey),
}

impl LocalizedPart {
    pub fn literal(text: impl Into<String>) -> Self {
        LocalizedPart::Literal(text.into())
    }

    pub fn number(value: i64) -> Self {
        LocalizedPart::Number {
            value,
            format: IntegerFormat::plain(),
        }
    }

    pub fn lookup(property: &str) -> Self {
        LocalizedPart::Lookup(LookupKey::Property(property.to_string()))
    }

    fn resolve_text(
        &self,
        cx: &ResolveContext<'_>,
        owner_type: &str,
    ) -> Result<String, LocalizationError> {
        match self {
            LocalizedPart::Literal(text) => Ok(text.clone()),
            LocalizedPart::Number { value, format } => Ok(format.format(*value)),
            LocalizedPart::Lookup(key) => cx
                .store
                .lookup(owner_type, &key.path(), cx.locale)
                .map(str::to_string),
        }
    }
}

/// Per-instance mapping from `%{key}` placeholder names to their values.
pub type SubstitutionMap = BTreeMap<String, LocalizedPart>;

/// Interpolate `%{key}` placeholders in a looked-up template against the
/// nearest enclosing registered instance's substitution map.
fn interpolate(
    template: &str,
    cx: &ResolveContext<'_>,
    owner_type: &str,
    path: &InstancePath,
) -> Result<String, LocalizationError> {
    let regex = placeholder_regex();
    if !regex.is_match(template) {
        return Ok(template.to_string());
    }

    let instance = cx.registry.nearest_enclosing(path, owner_type).ok_or_else(|| {
        LocalizationError::UnregisteredPath {
            path: path.to_string(),
        }
    })?;

    let mut resolved = String::with_capacity(template.len());
    let mut last_end = 0;
    for caps in regex.captures_iter(template) {
        let Some(whole) = caps.get(0) else { continue };
        let key = &caps[1];
        let part = instance.substitutions.get(key).ok_or_else(|| {
            LocalizationError::MissingSubstitution {
                key: key.to_string(),
                path: path.to_string(),
            }
        })?;
        resolved.push_str(&template[last_end..whole.start()]);
        resolved.push_str(&part.resolve_text(cx, owner_type)?);
        last_end = whole.end();
    }
    resolved.push_str(&template[last_end..]);
    Ok(resolved)
}

// ==================== LocalizableText ====================

/// A string field resolved from a locale-specific template at encode time.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalizableText {
    status: TextStatus,
}

#[derive(Debug, Clone, PartialEq)]
enum TextStatus {
    Pending(LookupKey),
    Resolved(String),
}

impl LocalizableText {
    /// Pending text looked up under the field's own property name.
    pub fn pending(property: &str) -> Self {
        Self::pending_key(LookupKey::Property(property.to_string()))
    }

    /// Pending text with an explicit lookup-key derivation.
    pub fn pending_key(key: LookupKey) -> Self {
        Self {
            status: TextStatus::Pending(key),
        }
    }

    /// Text that needs no lookup (resolved from birth).
    pub fn constant(text: impl Into<String>) -> Self {
        Self {
            status: TextStatus::Resolved(text.into()),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.status, TextStatus::Resolved(_))
    }

    /// True only when resolved to empty text. A pending value is
    /// not-yet-determined, never "empty".
    pub fn is_empty(&self) -> bool {
        matches!(&self.status, TextStatus::Resolved(text) if text.is_empty())
    }

    /// The resolved text.
    ///
    /// # Returns
    /// * `Ok(&str)` once resolved
    /// * `Err(LocalizationError::PendingValue)` while pending
    pub fn text(&self) -> Result<&str, LocalizationError> {
        match &self.status {
            TextStatus::Resolved(text) => Ok(text),
            TextStatus::Pending(key) => Err(LocalizationError::PendingValue { key: key.path() }),
        }
    }

    /// Resolve against the store, interpolating `%{key}` placeholders from the
    /// enclosing instance's substitutions. Resolving an already-resolved value
    /// is a no-op and does not consult the store.
    pub fn resolve(
        &mut self,
        cx: &ResolveContext<'_>,
        owner_type: &str,
        path: &InstancePath,
    ) -> Result<(), LocalizationError> {
        let key = match &self.status {
            TextStatus::Resolved(_) => return Ok(()),
            TextStatus::Pending(key) => key.clone(),
        };
        let template = cx.store.lookup(owner_type, &key.path(), cx.locale)?;
        let text = interpolate(template, cx, owner_type, path)?;
        self.status = TextStatus::Resolved(text);
        Ok(())
    }
}

impl Serialize for LocalizableText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.status {
            TextStatus::Resolved(text) => serializer.serialize_str(text),
            TextStatus::Pending(key) => Err(ser::Error::custom(
                LocalizationError::PendingValue { key: key.path() }.to_string(),
            )),
        }
    }
}

impl<'de> Deserialize<'de> for LocalizableText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(LocalizableText::constant(text))
    }
}

// ==================== LocalizableInt ====================

/// An integer field formatted (digit grouping) at encode time.
///
/// Resolution formats the raw value; no store lookup is involved. The resolved
/// wire form is the formatted string.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalizableInt {
    status: IntStatus,
}

#[derive(Debug, Clone, PartialEq)]
enum IntStatus {
    Pending { value: i64, format: IntegerFormat },
    Resolved { value: i64, text: String },
}

impl LocalizableInt {
    /// Pending integer with the default format (grouped by 3, `,`).
    pub fn pending(value: i64) -> Self {
        Self::pending_with(value, IntegerFormat::default())
    }

    /// Pending integer with explicit formatting options.
    pub fn pending_with(value: i64, format: IntegerFormat) -> Self {
        Self {
            status: IntStatus::Pending { value, format },
        }
    }

    /// The raw value, readable in either state.
    pub fn value(&self) -> i64 {
        match &self.status {
            IntStatus::Pending { value, .. } | IntStatus::Resolved { value, .. } => *value,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.status, IntStatus::Resolved { .. })
    }

    /// True only when resolved to empty text (never, in practice). Pending is
    /// not "empty".
    pub fn is_empty(&self) -> bool {
        matches!(&self.status, IntStatus::Resolved { text, .. } if text.is_empty())
    }

    /// The formatted text.
    ///
    /// # Returns
    /// * `Ok(&str)` once resolved
    /// * `Err(LocalizationError::PendingValue)` while pending
    pub fn text(&self) -> Result<&str, LocalizationError> {
        match &self.status {
            IntStatus::Resolved { text, .. } => Ok(text),
            IntStatus::Pending { value, .. } => Err(LocalizationError::PendingValue {
                key: value.to_string(),
            }),
        }
    }

    /// Format the raw value. Idempotent: resolving a resolved value is a no-op.
    pub fn resolve(&mut self) -> Result<(), LocalizationError> {
        if let IntStatus::Pending { value, format } = &self.status {
            self.status = IntStatus::Resolved {
                value: *value,
                text: format.format(*value),
            };
        }
        Ok(())
    }
}

impl Serialize for LocalizableInt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.status {
            IntStatus::Resolved { text, .. } => serializer.serialize_str(text),
            IntStatus::Pending { value, .. } => Err(ser::Error::custom(
                LocalizationError::PendingValue {
                    key: value.to_string(),
                }
                .to_string(),
            )),
        }
    }
}

impl<'de> Deserialize<'de> for LocalizableInt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        // Recover the raw value by stripping grouping separators.
        let digits: String = text
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '-')
            .collect();
        let value: i64 = digits
            .parse()
            .map_err(|_| de::Error::custom(format!("'{}' is not a formatted integer", text)))?;
        Ok(Self {
            status: IntStatus::Resolved { value, text },
        })
    }
}

// ==================== LocalizableArray ====================

/// An array-of-strings field whose elements resolve from indexed lookup keys
/// (`"property.0"`, `"property.1"`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct LocalizableArray {
    status: ArrayStatus,
}

#[derive(Debug, Clone, PartialEq)]
enum ArrayStatus {
    Pending { property: String, count: usize },
    Resolved(Vec<String>),
}

impl LocalizableArray {
    /// Pending array of `count` elements under `property`.
    pub fn pending(property: &str, count: usize) -> Self {
        Self {
            status: ArrayStatus::Pending {
                property: property.to_string(),
                count,
            },
        }
    }

    /// An array that needs no lookup.
    pub fn constant(texts: Vec<String>) -> Self {
        Self {
            status: ArrayStatus::Resolved(texts),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.status, ArrayStatus::Resolved(_))
    }

    /// True only when resolved with zero elements. Pending is not "empty".
    pub fn is_empty(&self) -> bool {
        matches!(&self.status, ArrayStatus::Resolved(texts) if texts.is_empty())
    }

    /// The resolved element texts.
    ///
    /// # Returns
    /// * `Ok(&[String])` once resolved
    /// * `Err(LocalizationError::PendingValue)` while pending
    pub fn texts(&self) -> Result<&[String], LocalizationError> {
        match &self.status {
            ArrayStatus::Resolved(texts) => Ok(texts),
            ArrayStatus::Pending { property, .. } => Err(LocalizationError::PendingValue {
                key: property.clone(),
            }),
        }
    }

    /// Resolve every element from its indexed key. A missing translation for
    /// any index fails the whole operation. Idempotent once resolved.
    pub fn resolve(
        &mut self,
        cx: &ResolveContext<'_>,
        owner_type: &str,
    ) -> Result<(), LocalizationError> {
        let (property, count) = match &self.status {
            ArrayStatus::Resolved(_) => return Ok(()),
            ArrayStatus::Pending { property, count } => (property.clone(), *count),
        };

        let mut texts = Vec::with_capacity(count);
        for index in 0..count {
            let key = LookupKey::Indexed {
                property: property.clone(),
                index,
            };
            texts.push(cx.store.lookup(owner_type, &key.path(), cx.locale)?.to_string());
        }
        self.status = ArrayStatus::Resolved(texts);
        Ok(())
    }
}

impl Serialize for LocalizableArray {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.status {
            ArrayStatus::Resolved(texts) => texts.serialize(serializer),
            ArrayStatus::Pending { property, .. } => Err(ser::Error::custom(
                LocalizationError::PendingValue {
                    key: property.clone(),
                }
                .to_string(),
            )),
        }
    }
}

impl<'de> Deserialize<'de> for LocalizableArray {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ArrayVisitor;

        impl<'de> Visitor<'de> for ArrayVisitor {
            type Value = Vec<String>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an array of strings")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut texts = Vec::new();
                while let Some(text) = seq.next_element::<String>()? {
                    texts.push(text);
                }
                Ok(texts)
            }
        }

        let texts = deserializer.deserialize_seq(ArrayVisitor)?;
        Ok(LocalizableArray::constant(texts))
    }
}

// ==================== LocalizableCompound ====================

/// A string composed from several resolved pieces, optionally joined by a
/// resolved separator.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalizableCompound {
    status: CompoundStatus,
}

#[derive(Debug, Clone, PartialEq)]
enum CompoundStatus {
    Pending {
        pieces: Vec<LocalizedPart>,
        separator: Option<LocalizedPart>,
    },
    Resolved(String),
}

impl LocalizableCompound {
    /// Pending compound joined with no separator.
    pub fn pending(pieces: Vec<LocalizedPart>) -> Self {
        Self {
            status: CompoundStatus::Pending {
                pieces,
                separator: None,
            },
        }
    }

    /// Pending compound joined by the resolved separator's text.
    pub fn pending_with_separator(pieces: Vec<LocalizedPart>, separator: LocalizedPart) -> Self {
        Self {
            status: CompoundStatus::Pending {
                pieces,
                separator: Some(separator),
            },
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.status, CompoundStatus::Resolved(_))
    }

    /// True only when resolved to empty text. Pending is not "empty".
    pub fn is_empty(&self) -> bool {
        matches!(&self.status, CompoundStatus::Resolved(text) if text.is_empty())
    }

    /// The resolved text.
    ///
    /// # Returns
    /// * `Ok(&str)` once resolved
    /// * `Err(LocalizationError::PendingValue)` while pending
    pub fn text(&self) -> Result<&str, LocalizationError> {
        match &self.status {
            CompoundStatus::Resolved(text) => Ok(text),
            CompoundStatus::Pending { .. } => Err(LocalizationError::PendingValue {
                key: "<compound>".to_string(),
            }),
        }
    }

    /// Resolve every piece (and the separator, if any) and join them.
    /// Idempotent once resolved.
    pub fn resolve(
        &mut self,
        cx: &ResolveContext<'_>,
        owner_type: &str,
    ) -> Result<(), LocalizationError> {
        let (pieces, separator) = match &self.status {
            CompoundStatus::Resolved(_) => return Ok(()),
            CompoundStatus::Pending { pieces, separator } => (pieces.clone(), separator.clone()),
        };

        let joiner = match &separator {
            Some(part) => part.resolve_text(cx, owner_type)?,
            None => String::new(),
        };

        let resolved_pieces: Vec<String> = pieces
            .iter()
            .map(|piece| piece.resolve_text(cx, owner_type))
            .collect::<Result<_, _>>()?;

        self.status = CompoundStatus::Resolved(resolved_pieces.join(&joiner));
        Ok(())
    }
}

impl Serialize for LocalizableCompound {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.status {
            CompoundStatus::Resolved(text) => serializer.serialize_str(text),
            CompoundStatus::Pending { .. } => Err(ser::Error::custom(
                LocalizationError::PendingValue {
                    key: "<compound>".to_string(),
                }
                .to_string(),
            )),
        }
    }
}

impl<'de> Deserialize<'de> for LocalizableCompound {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Self {
            status: CompoundStatus::Resolved(text),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::registry::InstanceRegistry;
    use crate::i18n::store::LocalizationStore;
    use crate::locale::Locale;

    fn store(document: &str) -> LocalizationStore {
        LocalizationStore::from_document(document).expect("valid document")
    }

    fn locale(tag: &str) -> Locale {
        Locale::new(tag).unwrap()
    }

    // ==================== LookupKey Tests ====================

    #[test]
    fn test_lookup_key_paths() {
        assert_eq!(LookupKey::Property("title".to_string()).path(), "title");
        assert_eq!(
            LookupKey::ParentKeyed {
                parent: "errors".to_string(),
                name: "title".to_string()
            }
            .path(),
            "errors.title"
        );
        assert_eq!(
            LookupKey::Indexed {
                property: "items".to_string(),
                index: 2
            }
            .path(),
            "items.2"
        );
    }

    // ==================== IntegerFormat Tests ====================

    #[test]
    fn test_grouping_size_four() {
        // Non-standard group sizes are honored literally, not forced to 3.
        let format = IntegerFormat {
            grouped: true,
            grouping_size: 4,
            separator: ',',
        };
        assert_eq!(format.format(123456789), "1,2345,6789");
    }

    #[test]
    fn test_grouping_default_size_three() {
        assert_eq!(IntegerFormat::default().format(1234567), "1,234,567");
    }

    #[test]
    fn test_grouping_exact_multiple() {
        assert_eq!(IntegerFormat::default().format(123456), "123,456");
    }

    #[test]
    fn test_grouping_short_number_untouched() {
        assert_eq!(IntegerFormat::default().format(999), "999");
        assert_eq!(IntegerFormat::default().format(0), "0");
    }

    #[test]
    fn test_grouping_negative() {
        assert_eq!(IntegerFormat::default().format(-1234567), "-1,234,567");
    }

    #[test]
    fn test_grouping_disabled() {
        assert_eq!(IntegerFormat::plain().format(1234567), "1234567");
    }

    #[test]
    fn test_grouping_size_zero_means_ungrouped() {
        let format = IntegerFormat {
            grouped: true,
            grouping_size: 0,
            separator: ',',
        };
        assert_eq!(format.format(1234567), "1234567");
    }

    #[test]
    fn test_grouping_custom_separator() {
        let format = IntegerFormat {
            grouped: true,
            grouping_size: 3,
            separator: '.',
        };
        assert_eq!(format.format(1234567), "1.234.567");
    }

    // ==================== Property Tests ====================

    mod grouping_props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_grouped_digits_match_plain(value in any::<i64>(), size in 1u32..8) {
                let format = IntegerFormat { grouped: true, grouping_size: size, separator: ',' };
                let grouped = format.format(value);
                let stripped: String = grouped.chars().filter(|c| *c != ',').collect();
                prop_assert_eq!(stripped, value.to_string());
            }

            #[test]
            fn prop_groups_from_right_have_exact_size(value in 0i64..i64::MAX, size in 1usize..6) {
                let format = IntegerFormat { grouped: true, grouping_size: size as u32, separator: ',' };
                let grouped = format.format(value);
                let segments: Vec<&str> = grouped.split(',').collect();
                // Every group but the first is exactly `size` digits.
                for segment in &segments[1..] {
                    prop_assert_eq!(segment.len(), size);
                }
                prop_assert!(!segments[0].is_empty() && segments[0].len() <= size);
            }
        }
    }

    // ==================== LocalizableText Tests ====================

    #[test]
    fn test_text_resolves_from_store() {
        let store = store(r#"{"en": {"Vm": {"title": "Hello"}}}"#);
        let registry = InstanceRegistry::default();
        let en = locale("en");
        let cx = ResolveContext {
            store: &store,
            locale: &en,
            registry: &registry,
        };

        let mut text = LocalizableText::pending("title");
        assert!(!text.is_resolved());
        text.resolve(&cx, "Vm", &InstancePath::root()).expect("resolve");
        assert_eq!(text.text().unwrap(), "Hello");
    }

    #[test]
    fn test_text_missing_translation_fails() {
        let store = store(r#"{"en": {"Vm": {"title": "Hello"}}}"#);
        let registry = InstanceRegistry::default();
        let es = locale("es");
        let cx = ResolveContext {
            store: &store,
            locale: &es,
            registry: &registry,
        };

        let mut text = LocalizableText::pending("title");
        let err = text.resolve(&cx, "Vm", &InstancePath::root()).unwrap_err();
        assert!(matches!(err, LocalizationError::MissingTranslation { .. }));
    }

    #[test]
    fn test_text_reading_pending_is_error() {
        let text = LocalizableText::pending("title");
        let err = text.text().unwrap_err();
        assert!(matches!(err, LocalizationError::PendingValue { .. }));
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn test_text_resolution_is_idempotent() {
        let full = store(r#"{"en": {"Vm": {"title": "Hello"}}}"#);
        let registry = InstanceRegistry::default();
        let en = locale("en");
        let cx = ResolveContext {
            store: &full,
            locale: &en,
            registry: &registry,
        };

        let mut text = LocalizableText::pending("title");
        text.resolve(&cx, "Vm", &InstancePath::root()).expect("resolve");

        // Second resolution must not consult the store: use an empty one.
        let empty = LocalizationStore::new();
        let cx2 = ResolveContext {
            store: &empty,
            locale: &en,
            registry: &registry,
        };
        text.resolve(&cx2, "Vm", &InstancePath::root())
            .expect("no-op resolve");
        assert_eq!(text.text().unwrap(), "Hello");
    }

    #[test]
    fn test_text_is_empty_semantics() {
        assert!(!LocalizableText::pending("title").is_empty());
        assert!(LocalizableText::constant("").is_empty());
        assert!(!LocalizableText::constant("x").is_empty());
    }

    #[test]
    fn test_text_parent_keyed_lookup() {
        let store = store(r#"{"en": {"Vm": {"errors": {"title": "Oops"}}}}"#);
        let registry = InstanceRegistry::default();
        let en = locale("en");
        let cx = ResolveContext {
            store: &store,
            locale: &en,
            registry: &registry,
        };

        let mut text = LocalizableText::pending_key(LookupKey::ParentKeyed {
            parent: "errors".to_string(),
            name: "title".to_string(),
        });
        text.resolve(&cx, "Vm", &InstancePath::root()).expect("resolve");
        assert_eq!(text.text().unwrap(), "Oops");
    }

    // ==================== Serde Tests ====================

    #[test]
    fn test_pending_text_refuses_to_serialize() {
        let text = LocalizableText::pending("title");
        let result = serde_json::to_string(&text);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("pending"));
    }

    #[test]
    fn test_resolved_text_serializes_as_plain_string() {
        let text = LocalizableText::constant("Hello");
        assert_eq!(serde_json::to_string(&text).unwrap(), "\"Hello\"");
    }

    #[test]
    fn test_text_roundtrip() {
        let text = LocalizableText::constant("Hello");
        let json = serde_json::to_string(&text).unwrap();
        let restored: LocalizableText = serde_json::from_str(&json).unwrap();
        assert_eq!(text, restored);
    }

    #[test]
    fn test_pending_int_refuses_to_serialize() {
        let int = LocalizableInt::pending(42);
        assert!(serde_json::to_string(&int).is_err());
    }

    #[test]
    fn test_int_roundtrip_preserves_value_and_text() {
        let mut int = LocalizableInt::pending_with(
            123456789,
            IntegerFormat {
                grouped: true,
                grouping_size: 4,
                separator: ',',
            },
        );
        int.resolve().expect("resolve");
        let json = serde_json::to_string(&int).unwrap();
        assert_eq!(json, "\"1,2345,6789\"");

        let restored: LocalizableInt = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.value(), 123456789);
        assert_eq!(restored.text().unwrap(), "1,2345,6789");
    }

    #[test]
    fn test_pending_array_refuses_to_serialize() {
        let array = LocalizableArray::pending("items", 3);
        assert!(serde_json::to_string(&array).is_err());
    }

    #[test]
    fn test_array_roundtrip() {
        let array = LocalizableArray::constant(vec!["a".to_string(), "b".to_string()]);
        let json = serde_json::to_string(&array).unwrap();
        assert_eq!(json, "[\"a\",\"b\"]");
        let restored: LocalizableArray = serde_json::from_str(&json).unwrap();
        assert_eq!(array, restored);
    }

    #[test]
    fn test_pending_compound_refuses_to_serialize() {
        let compound = LocalizableCompound::pending(vec![LocalizedPart::literal("x")]);
        assert!(serde_json::to_string(&compound).is_err());
    }

    #[test]
    fn test_resolved_compound_roundtrip() {
        let empty = LocalizationStore::new();
        let registry = InstanceRegistry::default();
        let en = locale("en");
        let cx = ResolveContext {
            store: &empty,
            locale: &en,
            registry: &registry,
        };

        let mut compound = LocalizableCompound::pending_with_separator(
            vec![LocalizedPart::literal("Left"), LocalizedPart::literal("Right")],
            LocalizedPart::literal(" - "),
        );
        compound.resolve(&cx, "Vm").expect("resolve");

        let json = serde_json::to_string(&compound).unwrap();
        assert_eq!(json, "\"Left - Right\"");
        let restored: LocalizableCompound = serde_json::from_str(&json).unwrap();
        assert_eq!(compound, restored);
        assert_eq!(restored.text().unwrap(), "Left - Right");
    }

    // ==================== LocalizableInt Lifecycle Tests ====================

    #[test]
    fn test_int_resolve_formats() {
        let mut int = LocalizableInt::pending(1234567);
        assert!(!int.is_resolved());
        int.resolve().expect("resolve");
        assert_eq!(int.text().unwrap(), "1,234,567");
        assert_eq!(int.value(), 1234567);
    }

    #[test]
    fn test_int_reading_pending_is_error() {
        let int = LocalizableInt::pending(7);
        assert!(matches!(
            int.text().unwrap_err(),
            LocalizationError::PendingValue { .. }
        ));
    }

    #[test]
    fn test_int_resolution_is_idempotent() {
        let mut int = LocalizableInt::pending(1000);
        int.resolve().expect("resolve");
        let before = int.clone();
        int.resolve().expect("no-op");
        assert_eq!(int, before);
    }

    // ==================== LocalizableArray Tests ====================

    #[test]
    fn test_array_resolves_indexed_keys() {
        let store = store(
            r#"{"en": {"Vm": {"items": {"0": "First", "1": "Second", "2": "Third"}}}}"#,
        );
        let registry = InstanceRegistry::default();
        let en = locale("en");
        let cx = ResolveContext {
            store: &store,
            locale: &en,
            registry: &registry,
        };

        let mut array = LocalizableArray::pending("items", 3);
        array.resolve(&cx, "Vm").expect("resolve");
        assert_eq!(array.texts().unwrap(), ["First", "Second", "Third"]);
    }

    #[test]
    fn test_array_missing_index_fails_whole_resolve() {
        let store = store(r#"{"en": {"Vm": {"items": {"0": "First"}}}}"#);
        let registry = InstanceRegistry::default();
        let en = locale("en");
        let cx = ResolveContext {
            store: &store,
            locale: &en,
            registry: &registry,
        };

        let mut array = LocalizableArray::pending("items", 2);
        let err = array.resolve(&cx, "Vm").unwrap_err();
        assert!(err.to_string().contains("items.1"));
        assert!(!array.is_resolved());
    }

    #[test]
    fn test_array_is_empty_semantics() {
        assert!(!LocalizableArray::pending("items", 0).is_empty());
        assert!(LocalizableArray::constant(vec![]).is_empty());
    }

    // ==================== LocalizableCompound Tests ====================

    #[test]
    fn test_compound_joins_without_separator() {
        let store = store(r#"{"en": {"Vm": {"greeting": "Hello"}}}"#);
        let registry = InstanceRegistry::default();
        let en = locale("en");
        let cx = ResolveContext {
            store: &store,
            locale: &en,
            registry: &registry,
        };

        let mut compound = LocalizableCompound::pending(vec![
            LocalizedPart::lookup("greeting"),
            LocalizedPart::literal("!"),
        ]);
        compound.resolve(&cx, "Vm").expect("resolve");
        assert_eq!(compound.text().unwrap(), "Hello!");
    }

    #[test]
    fn test_compound_joins_with_resolved_separator() {
        let store = store(r#"{"en": {"Vm": {"sep": " - ", "a": "Left", "b": "Right"}}}"#);
        let registry = InstanceRegistry::default();
        let en = locale("en");
        let cx = ResolveContext {
            store: &store,
            locale: &en,
            registry: &registry,
        };

        let mut compound = LocalizableCompound::pending_with_separator(
            vec![LocalizedPart::lookup("a"), LocalizedPart::lookup("b")],
            LocalizedPart::lookup("sep"),
        );
        compound.resolve(&cx, "Vm").expect("resolve");
        assert_eq!(compound.text().unwrap(), "Left - Right");
    }

    #[test]
    fn test_compound_with_number_piece() {
        let store = store(r#"{"en": {"Vm": {"label": "Total: "}}}"#);
        let registry = InstanceRegistry::default();
        let en = locale("en");
        let cx = ResolveContext {
            store: &store,
            locale: &en,
            registry: &registry,
        };

        let mut compound = LocalizableCompound::pending(vec![
            LocalizedPart::lookup("label"),
            LocalizedPart::Number {
                value: 1234,
                format: IntegerFormat::default(),
            },
        ]);
        compound.resolve(&cx, "Vm").expect("resolve");
        assert_eq!(compound.text().unwrap(), "Total: 1,234");
    }

    #[test]
    fn test_compound_missing_piece_fails() {
        let empty = LocalizationStore::new();
        let registry = InstanceRegistry::default();
        let en = locale("en");
        let cx = ResolveContext {
            store: &empty,
            locale: &en,
            registry: &registry,
        };

        let mut compound = LocalizableCompound::pending(vec![LocalizedPart::lookup("missing")]);
        assert!(compound.resolve(&cx, "Vm").is_err());
    }
}
