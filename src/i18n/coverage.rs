//! Per-locale translation completeness reporting.
//!
//! For every (type, localizable-field) pair a view-model graph can require,
//! and for every locale an application claims to support, the store must hold
//! a translation. Absence is an error entry in the report, never a warning:
//! a gap found at test time is a release blocker, not a log line.

use crate::i18n::registry::{localization_keys, Localized};
use crate::i18n::store::LocalizationStore;
use crate::locale::Locale;

/// Outcome of a coverage check over one view-model graph and a set of locales.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageReport {
    /// Missing translations. Any entry here fails the check.
    pub errors: Vec<String>,

    /// Observations that do not fail the check, such as a requested locale
    /// the store holds no entries for.
    pub warnings: Vec<String>,
}

impl CoverageReport {
    /// An empty report; entries accumulate during verification.
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Whether any translation was missing.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Whether anything non-fatal was noted.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Whether the graph is fully covered with nothing noted at all.
    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

impl Default for CoverageReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Verify that every localizable key reachable from `root` has a translation
/// in every requested locale.
///
/// # Arguments
/// * `root` - The view-model graph whose keys are aggregated
/// * `store` - The loaded localization store
/// * `locales` - The locales the application claims to support
///
/// # Returns
/// A `CoverageReport` with one error per missing (type, path, locale) triple.
pub fn verify_coverage(
    root: &dyn Localized,
    store: &LocalizationStore,
    locales: &[Locale],
) -> CoverageReport {
    let mut report = CoverageReport::new();
    let keys = localization_keys(root);

    if keys.is_empty() {
        report
            .warnings
            .push("view-model graph declares no localizable fields".to_string());
        return report;
    }

    for locale in locales {
        if !store.locales().contains(locale) {
            report
                .warnings
                .push(format!("store holds no entries for locale '{}'", locale));
        }
        for key in keys.keys() {
            if let Err(missing) = store.lookup(&key.type_name, &key.path, locale) {
                report.errors.push(missing.to_string());
            }
        }
    }

    report
}
