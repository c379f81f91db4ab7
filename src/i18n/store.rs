//! Localization store: translated text by (type, property path, locale).
//!
//! Resource documents are JSON with a fixed three-level shape,
//! `locale -> typeName -> propertyPath -> string`, where the property-path
//! level may nest objects arbitrarily deep; nested keys flatten to dot-joined
//! paths. The store is loaded once before any encoding occurs and is immutable
//! during lookups.
//!
//! Lookups are exact-match only. `"en-GB"` does not fall back to `"en"` here;
//! callers and tests must request the exact locale they expect data for.

use crate::i18n::LocalizationError;
use crate::locale::Locale;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Merge precedence when adding a document to a non-empty store.
///
/// There is no implicit policy: callers control precedence explicitly so that
/// later documents never overwrite earlier keys silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Keys already present in the store win; incoming duplicates are ignored.
    KeepExisting,
    /// Incoming keys win over keys already present.
    Overwrite,
}

/// Immutable mapping from `(typeName, propertyPath)` to per-locale text.
#[derive(Debug, Clone, Default)]
pub struct LocalizationStore {
    // locale -> type name -> flattened property path -> text
    entries: HashMap<Locale, HashMap<String, HashMap<String, String>>>,
}

impl LocalizationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a single JSON resource document into a fresh store.
    pub fn from_document(document: &str) -> Result<Self, LocalizationError> {
        let mut store = Self::new();
        store.merge_document(document, MergePolicy::Overwrite)?;
        Ok(store)
    }

    /// Load a single resource file into a fresh store.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LocalizationError> {
        let mut store = Self::new();
        store.merge_file(path, MergePolicy::Overwrite)?;
        Ok(store)
    }

    /// Load several resource files, earlier files taking precedence over later
    /// ones (each subsequent file is merged with `MergePolicy::KeepExisting`).
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self, LocalizationError> {
        let mut store = Self::new();
        for path in paths {
            store.merge_file(path, MergePolicy::KeepExisting)?;
        }
        Ok(store)
    }

    /// Merge a resource file into this store under an explicit policy.
    pub fn merge_file(
        &mut self,
        path: impl AsRef<Path>,
        policy: MergePolicy,
    ) -> Result<(), LocalizationError> {
        let path = path.as_ref();
        let document =
            std::fs::read_to_string(path).map_err(|source| LocalizationError::ResourceIo {
                path: path.display().to_string(),
                source,
            })?;
        debug!("Loaded localization resource file {}", path.display());
        self.merge_document(&document, policy)
    }

    /// Merge a JSON resource document into this store under an explicit policy.
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(LocalizationError::MalformedResource)` if the document does not
    ///   match the `locale -> type -> path -> string` nesting, naming the
    ///   offending key
    pub fn merge_document(
        &mut self,
        document: &str,
        policy: MergePolicy,
    ) -> Result<(), LocalizationError> {
        let root: Value =
            serde_json::from_str(document).map_err(|e| LocalizationError::MalformedResource {
                detail: format!("not valid JSON: {}", e),
            })?;

        let Value::Object(locales) = root else {
            return Err(LocalizationError::MalformedResource {
                detail: "top level must be an object keyed by locale".to_string(),
            });
        };

        let mut added = 0usize;
        for (locale_key, types_value) in locales {
            let locale =
                Locale::new(&locale_key).map_err(|_| LocalizationError::MalformedResource {
                    detail: format!("'{}' is not a valid locale key", locale_key),
                })?;

            let Value::Object(types) = types_value else {
                return Err(LocalizationError::MalformedResource {
                    detail: format!("locale '{}' must map to an object of type names", locale_key),
                });
            };

            for (type_name, paths_value) in types {
                let Value::Object(paths) = paths_value else {
                    return Err(LocalizationError::MalformedResource {
                        detail: format!(
                            "'{}.{}' must map to an object of property paths",
                            locale_key, type_name
                        ),
                    });
                };

                let per_type = self
                    .entries
                    .entry(locale.clone())
                    .or_default()
                    .entry(type_name.clone())
                    .or_default();

                added += flatten_into(per_type, &locale_key, &type_name, "", &paths, policy)?;
            }
        }

        info!("Merged localization document ({} entries added)", added);
        Ok(())
    }

    /// Look up translated text for an exact (type, path, locale) triple.
    ///
    /// # Returns
    /// * `Ok(&str)` with the translated text
    /// * `Err(LocalizationError::MissingTranslation)` on any miss; there is
    ///   no fallback to another locale
    pub fn lookup(
        &self,
        type_name: &str,
        path: &str,
        locale: &Locale,
    ) -> Result<&str, LocalizationError> {
        self.entries
            .get(locale)
            .and_then(|types| types.get(type_name))
            .and_then(|paths| paths.get(path))
            .map(String::as_str)
            .ok_or_else(|| LocalizationError::MissingTranslation {
                type_name: type_name.to_string(),
                path: path.to_string(),
                locale: locale.clone(),
            })
    }

    /// All locales with at least one entry, sorted.
    pub fn locales(&self) -> Vec<Locale> {
        let mut locales: Vec<Locale> = self.entries.keys().cloned().collect();
        locales.sort();
        locales
    }

    /// Whether the store holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Flatten a (possibly nested) property-path object into dot-joined keys,
/// honoring the merge policy per leaf. Returns the number of entries added.
fn flatten_into(
    target: &mut HashMap<String, String>,
    locale_key: &str,
    type_name: &str,
    prefix: &str,
    paths: &serde_json::Map<String, Value>,
    policy: MergePolicy,
) -> Result<usize, LocalizationError> {
    let mut added = 0usize;
    for (key, value) in paths {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            Value::String(text) => {
                let keep_incoming =
                    policy == MergePolicy::Overwrite || !target.contains_key(&path);
                if keep_incoming {
                    target.insert(path, text.clone());
                    added += 1;
                }
            }
            Value::Object(nested) => {
                added += flatten_into(target, locale_key, type_name, &path, nested, policy)?;
            }
            other => {
                return Err(LocalizationError::MalformedResource {
                    detail: format!(
                        "'{}.{}.{}' must be a string or nested object, found {}",
                        locale_key,
                        type_name,
                        path,
                        json_kind(other)
                    ),
                });
            }
        }
    }
    Ok(added)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
