//! Deferred localization for view-model graphs.
//!
//! View-models are constructed by business logic with *pending* localizable
//! fields: each field carries a lookup key instead of final text. At encode
//! time, [`encoder::LocalizingEncoder`] resolves every pending field against
//! the [`store::LocalizationStore`] and the requested locale, so the wire
//! format contains only plain, fully localized scalars and arrays.
//!
//! # Architecture
//!
//! - `store`: immutable `(type, path) -> (locale -> text)` mapping loaded from
//!   JSON resource documents at startup
//! - `value`: the localizable value variants and their pending/resolved
//!   lifecycle
//! - `registry`: structural paths, the `Localized` capability trait, and the
//!   per-encode instance registry that disambiguates multiple embedded
//!   instances of the same type
//! - `encoder`: the two-pass encode operation (register, then resolve and
//!   serialize)
//! - `coverage`: per-locale translation completeness reporting
//!
//! # Example
//!
//! ```rust,ignore
//! use viewmodel_wire::i18n::{encoder::LocalizingEncoder, store::LocalizationStore};
//!
//! let store = LocalizationStore::from_document(resource_json)?;
//! let encoder = LocalizingEncoder::new(&store, "en".parse()?);
//! let wire_json = encoder.encode(view_model)?;
//! ```

pub mod coverage;
pub mod encoder;
pub mod registry;
pub mod store;
pub mod value;

use crate::locale::Locale;

/// Errors raised while loading localization resources or resolving localizable
/// fields. Every variant is a hard failure of the operation in progress;
/// nothing here is ever silently defaulted to empty or placeholder text.
#[derive(Debug, thiserror::Error)]
pub enum LocalizationError {
    /// A resource document did not match the expected
    /// `locale -> type -> path -> string` nesting.
    #[error("malformed localization resource: {detail}")]
    MalformedResource { detail: String },

    /// Could not read a resource file from disk.
    #[error("failed to read localization resource '{path}': {source}")]
    ResourceIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// No translation exists for the exact (type, path, locale) triple.
    /// There is no fallback to another locale.
    #[error("missing translation for {type_name}.{path} in locale '{locale}'")]
    MissingTranslation {
        type_name: String,
        path: String,
        locale: Locale,
    },

    /// A localizable value's final text was read while it was still pending.
    /// This signals a programming error (resolution was skipped), not a
    /// recoverable condition.
    #[error("localizable value for '{key}' is still pending resolution")]
    PendingValue { key: String },

    /// A looked-up template contains a `%{key}` placeholder with no matching
    /// entry in the enclosing instance's substitution map.
    #[error("no substitution value for '%{{{key}}}' at path '{path}'")]
    MissingSubstitution { key: String, path: String },

    /// A field was resolved at a path with no enclosing registered instance at
    /// all, not even the root. Indicates resolution ran outside an encode
    /// operation.
    #[error("no registered instance encloses path '{path}'")]
    UnregisteredPath { path: String },

    /// The final serialization pass failed.
    #[error("failed to serialize resolved view-model: {0}")]
    Emit(#[from] serde_json::Error),
}
