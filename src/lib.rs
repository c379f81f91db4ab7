//! Wire-format plumbing for server-driven view-models.
//!
//! A server builds a view-model graph per request, localizes every
//! user-visible string for the client's locale, and ships the result as plain
//! JSON. Clients decode plain data; all localization and version negotiation
//! happens server-side. This crate provides the pieces:
//!
//! - [`version`]: the three-part wire-format version and its compatibility rule
//! - [`runtime`]: immutable per-process context (current/minimum version,
//!   deployment, globals)
//! - [`locale`]: validated, exact-match locale tags
//! - [`i18n`]: the localization store and the deferred-localization encoder
//! - [`versioned`]: version-ranged fields and range-aware payload decoding
//! - [`transport`]: a version-stamping JSON client with structured server
//!   errors
//! - [`binding`]: axum route binding for view-model factories
//! - [`gate`]: bounded-concurrency permits for expensive view-model work
//! - [`testing`]: assertion helpers for downstream test suites

pub mod binding;
pub mod gate;
pub mod i18n;
pub mod locale;
pub mod runtime;
pub mod testing;
pub mod transport;
pub mod version;
pub mod versioned;

pub use binding::{view_model_router, BindingError, BindingState, ViewModelFactory};
pub use gate::{ConcurrencyGate, GatePermit};
pub use i18n::encoder::LocalizingEncoder;
pub use i18n::registry::{InstancePath, Localized, PathSegment, ResolveContext};
pub use i18n::store::LocalizationStore;
pub use i18n::value::{
    IntegerFormat, LocalizableArray, LocalizableCompound, LocalizableInt, LocalizableText,
    LocalizedPart, LookupKey, SubstitutionMap,
};
pub use i18n::LocalizationError;
pub use locale::Locale;
pub use runtime::{Deployment, RuntimeContext};
pub use transport::{JsonTransport, ServerError, TransportError, VERSION_HEADER};
pub use version::{Version, VersionError};
pub use versioned::{DecodeError, VersionRange, VersionedDecoder, VersionedField};
