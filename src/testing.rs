//! Assertion helpers for view-model test suites.
//!
//! These are meant for `#[cfg(test)]` code and `tests/` binaries: they panic
//! with a readable report instead of returning errors, in the style of the
//! standard `assert_*` macros.

use crate::i18n::coverage::verify_coverage;
use crate::i18n::registry::Localized;
use crate::i18n::store::LocalizationStore;
use crate::locale::Locale;
use crate::version::Version;
use crate::versioned::{VersionRange, VersionedDecoder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Assert that a value survives a JSON round trip unchanged.
///
/// # Panics
/// If serialization or deserialization fails, or the restored value differs.
pub fn assert_round_trip<T>(value: &T)
where
    T: Serialize + DeserializeOwned + PartialEq + Debug,
{
    let json = serde_json::to_string(value)
        .unwrap_or_else(|e| panic!("serialization failed: {}", e));
    let restored: T = serde_json::from_str(&json)
        .unwrap_or_else(|e| panic!("deserialization failed for {}: {}", json, e));
    assert_eq!(
        value, &restored,
        "round trip changed the value (wire body: {})",
        json
    );
}

/// Assert that every localizable key reachable from `root` has a translation
/// in every listed locale.
///
/// # Panics
/// With the full list of missing translations if coverage is incomplete.
pub fn assert_full_coverage(root: &dyn Localized, store: &LocalizationStore, locales: &[Locale]) {
    let report = verify_coverage(root, store, locales);
    if report.has_errors() {
        panic!(
            "localization coverage incomplete ({} missing):\n  {}",
            report.errors.len(),
            report.errors.join("\n  ")
        );
    }
}

/// Assert that each named field of a payload decodes under a claimed version.
///
/// # Arguments
/// * `body` - The raw JSON payload
/// * `version` - The version the payload claims
/// * `fields` - `(name, range)` pairs to check; fields outside their range are
///   allowed to be absent
///
/// # Panics
/// If the payload is not an object or any in-range field is missing.
pub fn assert_decodes_at(body: &str, version: Version, fields: &[(&str, VersionRange)]) {
    let decoder = VersionedDecoder::from_str(body, version)
        .unwrap_or_else(|e| panic!("payload rejected at {}: {}", version, e));
    for (name, range) in fields {
        if let Err(e) = decoder.field::<serde_json::Value>(name, *range) {
            panic!("field '{}' failed to decode at {}: {}", name, version, e);
        }
    }
}
