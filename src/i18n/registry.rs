//! Structural paths, the `Localized` capability trait, and the per-encode
//! instance registry.
//!
//! A naive "current instance of type T" slot breaks as soon as two sibling
//! instances of the same type are encoded: the second overwrites the first's
//! substitution context before the first's nested fields are reached. The
//! registry sidesteps ordering entirely: one pre-registration pass walks the
//! whole graph and records every instance at its structural path, and
//! resolution then performs pure reads keyed by position.
//!
//! Instead of structural reflection, view-model types implement [`Localized`]
//! directly: they enumerate their localizable field paths and their child
//! instances at named or indexed positions. Child positions are either a field
//! or a field element; dictionary-shaped children and arrays of optionals are
//! unrepresentable by construction.

use crate::i18n::store::LocalizationStore;
use crate::i18n::value::SubstitutionMap;
use crate::i18n::LocalizationError;
use crate::locale::Locale;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// One segment of a structural path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A named property (`"detail"`).
    Field(&'static str),
    /// A collection element (`"items.2"`).
    Element { field: &'static str, index: usize },
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => f.write_str(name),
            PathSegment::Element { field, index } => write!(f, "{}.{}", field, index),
        }
    }
}

/// A structural path from the root of a view-model graph: a sequence of
/// property names, with collection elements suffixed by their index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct InstancePath {
    segments: Vec<PathSegment>,
}

impl InstancePath {
    /// The root path (no segments).
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The path extended by one segment.
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    /// The enclosing path, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }
}

impl fmt::Display for InstancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// Everything a resolution step needs: the store, the requested locale, and
/// the registry built for the current encode operation.
pub struct ResolveContext<'a> {
    pub store: &'a LocalizationStore,
    pub locale: &'a Locale,
    pub registry: &'a InstanceRegistry,
}

/// Capability interface for view-model types carrying localizable fields.
///
/// Implementing types enumerate their own localizable field paths and their
/// child localizable instances; the registry and encoder drive everything else
/// through this trait. A present `Option<Child>` is listed as a child at the
/// field's own segment; an absent optional contributes nothing.
pub trait Localized {
    /// The declared type name, used as the first key into the localization
    /// store. Multiple instances of the same declared type may coexist at
    /// different paths in one graph.
    fn type_name(&self) -> &'static str;

    /// Property paths (relative to this instance) of the locally declared
    /// localizable fields, concrete per instance (indexed array elements
    /// included, e.g. `"items.0"`).
    fn localizable_paths(&self) -> Vec<String>;

    /// This instance's substitution values for `%{key}` placeholders, if any.
    fn substitutions(&self) -> Option<&SubstitutionMap> {
        None
    }

    /// Child localizable instances at named or indexed positions.
    fn children(&self) -> Vec<(PathSegment, &dyn Localized)> {
        Vec::new()
    }

    /// Mutable access to the same children, in the same order.
    fn children_mut(&mut self) -> Vec<(PathSegment, &mut dyn Localized)> {
        Vec::new()
    }

    /// Resolve this instance's own localizable fields in place. `path` is the
    /// instance's structural position in the graph being encoded.
    fn resolve(
        &mut self,
        cx: &ResolveContext<'_>,
        path: &InstancePath,
    ) -> Result<(), LocalizationError>;
}

/// What the registry records for one instance: its declared type and a
/// snapshot of its substitution map taken during pre-registration.
#[derive(Debug, Clone)]
pub struct RegisteredInstance {
    pub type_name: &'static str,
    pub substitutions: SubstitutionMap,
}

/// Immutable `path -> instance` mapping for one whole view-model graph.
///
/// Built in a single pass before any encoding happens; never cached or shared
/// across encode calls.
#[derive(Debug, Clone, Default)]
pub struct InstanceRegistry {
    entries: HashMap<InstancePath, RegisteredInstance>,
}

impl InstanceRegistry {
    /// Walk the whole graph from `root`, registering every instance at its
    /// structural path.
    pub fn build(root: &dyn Localized) -> Self {
        let mut registry = Self::default();
        registry.register(root, InstancePath::root());
        registry
    }

    fn register(&mut self, node: &dyn Localized, path: InstancePath) {
        self.entries.insert(
            path.clone(),
            RegisteredInstance {
                type_name: node.type_name(),
                substitutions: node.substitutions().cloned().unwrap_or_default(),
            },
        );
        for (segment, child) in node.children() {
            self.register(child, path.child(segment));
        }
    }

    /// Number of registered instances.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The instance registered at an exact path.
    pub fn at(&self, path: &InstancePath) -> Option<&RegisteredInstance> {
        self.entries.get(path)
    }

    /// Find the nearest enclosing registered instance of the requested type.
    ///
    /// The lookup walks the path upward, dropping the last segment repeatedly.
    /// A registered instance of the *wrong* type does not stop the walk; the
    /// search continues toward the root. If no enclosing instance of the
    /// requested type exists, the root-registered instance is returned
    /// regardless of its type. Returns `None` only when not even a root is
    /// registered.
    pub fn nearest_enclosing(
        &self,
        path: &InstancePath,
        type_name: &str,
    ) -> Option<&RegisteredInstance> {
        let mut current = path.clone();
        loop {
            if let Some(instance) = self.entries.get(&current) {
                if instance.type_name == type_name {
                    return Some(instance);
                }
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
        self.entries.get(&InstancePath::root())
    }
}

/// A (type, property path) pair requiring a store lookup.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct LocalizationKey {
    pub type_name: String,
    pub path: String,
}

/// Compute the union of all (type, localizable-field) pairs across a graph,
/// by the same structural walk as registration. When the same logical key is
/// contributed from multiple levels, the deeper instance wins (override-wins
/// merge); the value records the winning instance's path.
pub fn localization_keys(root: &dyn Localized) -> BTreeMap<LocalizationKey, InstancePath> {
    fn walk(
        node: &dyn Localized,
        path: &InstancePath,
        keys: &mut BTreeMap<LocalizationKey, InstancePath>,
    ) {
        for field_path in node.localizable_paths() {
            let key = LocalizationKey {
                type_name: node.type_name().to_string(),
                path: field_path,
            };
            match keys.entry(key) {
                Entry::Vacant(entry) => {
                    entry.insert(path.clone());
                }
                Entry::Occupied(mut entry) => {
                    if path.len() >= entry.get().len() {
                        entry.insert(path.clone());
                    }
                }
            }
        }
        for (segment, child) in node.children() {
            walk(child, &path.child(segment), keys);
        }
    }

    let mut keys = BTreeMap::new();
    walk(root, &InstancePath::root(), &mut keys);
    keys
}
