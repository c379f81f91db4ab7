//! The deferred-localization encoder.
//!
//! Serializes a view-model graph to JSON such that every localizable field is
//! emitted as final, locale-resolved text, and every per-instance substitution
//! is bound to the correct instance even when multiple instances of the same
//! declared type appear at different positions in the graph.
//!
//! Each `encode` call moves through a fixed sequence:
//! Idle -> Registering (build a fresh registry for the whole graph) ->
//! Encoding (walk the graph resolving every field through registry + store) ->
//! Done (plain serde emission). Registries are never cached or reused across
//! calls, and no suspension occurs mid-traversal.

use crate::i18n::registry::{InstancePath, InstanceRegistry, Localized, ResolveContext};
use crate::i18n::store::LocalizationStore;
use crate::i18n::LocalizationError;
use crate::locale::Locale;
use serde::Serialize;
use tracing::debug;

/// Encodes view-model graphs with all localizable fields resolved for one
/// locale.
pub struct LocalizingEncoder<'a> {
    store: &'a LocalizationStore,
    locale: Locale,
}

impl<'a> LocalizingEncoder<'a> {
    pub fn new(store: &'a LocalizationStore, locale: Locale) -> Self {
        Self { store, locale }
    }

    /// The locale this encoder resolves for.
    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Encode a view-model graph to a JSON value.
    ///
    /// Consumes the graph: per the view-model lifecycle it is built fresh per
    /// request, encoded once, and discarded.
    ///
    /// # Returns
    /// * `Ok(serde_json::Value)` with every localizable field resolved
    /// * `Err(LocalizationError)` if any translation is missing for the
    ///   requested locale (the whole encode fails; nothing is emitted) or if
    ///   a substitution cannot be bound
    pub fn encode<T: Localized + Serialize>(
        &self,
        mut value: T,
    ) -> Result<serde_json::Value, LocalizationError> {
        // Registering: one pass over the whole graph, before any encoding.
        let registry = InstanceRegistry::build(&value);
        debug!(
            instances = registry.len(),
            locale = %self.locale,
            "Registered view-model graph"
        );

        // Encoding: resolve every field through registry + store.
        let cx = ResolveContext {
            store: self.store,
            locale: &self.locale,
            registry: &registry,
        };
        resolve_graph(&mut value, &cx, InstancePath::root())?;

        // Done: by now nothing pending remains, so plain serde emission
        // cannot observe a pending value.
        Ok(serde_json::to_value(&value)?)
    }

    /// Encode a view-model graph directly to the wire body.
    pub fn encode_to_string<T: Localized + Serialize>(
        &self,
        value: T,
    ) -> Result<String, LocalizationError> {
        let encoded = self.encode(value)?;
        Ok(serde_json::to_string(&encoded)?)
    }
}

/// Depth-first resolution over the instance graph. Each instance resolves its
/// own fields at its structural path, then its children at theirs.
fn resolve_graph(
    node: &mut dyn Localized,
    cx: &ResolveContext<'_>,
    path: InstancePath,
) -> Result<(), LocalizationError> {
    node.resolve(cx, &path)?;
    for (segment, child) in node.children_mut() {
        resolve_graph(child, cx, path.child(segment))?;
    }
    Ok(())
}
