//! Variant registry: named concrete classes per category root.
//!
//! The registry is an explicit namespace object. Each concrete class is
//! registered once at startup with [`Registry::register`]; lookups resolve a
//! variant name within the namespace of a class's category root.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::builder::Resolver;
use crate::class::ConfigClass;
use crate::error::{Error, Result};
use crate::instance::ConfigInstance;
use crate::value::{Mapping, Value};

#[derive(Debug, Clone)]
struct Namespace {
    root: Arc<ConfigClass>,
    variants: BTreeMap<String, Arc<ConfigClass>>,
}

/// Maps each category root to the variants declared beneath it.
///
/// Names are stored lower-cased and matched case-insensitively. Registering
/// a second class under a name already taken replaces the first (last
/// declared wins).
///
/// # Examples
///
/// ```
/// use cfgforge::{ConfigClass, FieldType, Registry};
///
/// let model = ConfigClass::root("Model").build().unwrap();
/// let dit = ConfigClass::extends("Dit", &model)
///     .field_with_default("layers", FieldType::Int, 16)
///     .build()
///     .unwrap();
///
/// let mut registry = Registry::new();
/// registry.register(&model);
/// registry.register(&dit);
///
/// let found = registry.lookup_variant(&model, Some("DIT")).unwrap();
/// assert_eq!(found.name(), "Dit");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Registry {
    namespaces: BTreeMap<String, Namespace>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a class in its category root's namespace.
    ///
    /// A category root opens its namespace; registering a different root
    /// under the same name starts a fresh, empty namespace. Any other class
    /// is registered under its variant name (and opens its root's namespace
    /// first if needed).
    pub fn register(&mut self, class: &Arc<ConfigClass>) {
        if class.is_category_root() {
            self.open_namespace(class);
            return;
        }
        let root = self.root_arc(class);
        self.register_variant(&root, class.variant_name(), class);
    }

    /// Registers `class` under `name` in the namespace of `category_root`.
    ///
    /// Returns the class previously registered under that name, if any.
    pub fn register_variant(
        &mut self,
        category_root: &Arc<ConfigClass>,
        name: &str,
        class: &Arc<ConfigClass>,
    ) -> Option<Arc<ConfigClass>> {
        let namespace = self.open_namespace(category_root);
        let key = name.to_lowercase();
        let previous = namespace.variants.insert(key.clone(), Arc::clone(class));
        if let Some(old) = &previous {
            if !Arc::ptr_eq(old, class) {
                log::debug!(
                    "variant '{key}' of {} redefined: {} replaces {}",
                    category_root.name(),
                    class.name(),
                    old.name()
                );
            }
        }
        previous
    }

    /// Resolves which class to instantiate for a requested variant name.
    ///
    /// An absent or empty name selects `class` itself, as does `class`'s own
    /// variant name. Any other name is looked up in the namespace of
    /// `class`'s category root and must name `class` or one of its
    /// descendants; a sibling variant is not a valid value for `class`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownVariant`] listing the names `class` accepts
    /// when the name is not found among them.
    pub fn lookup_variant(
        &self,
        class: &Arc<ConfigClass>,
        name: Option<&str>,
    ) -> Result<Arc<ConfigClass>> {
        let Some(name) = name.filter(|n| !n.is_empty()) else {
            return Ok(Arc::clone(class));
        };
        let key = name.to_lowercase();
        if key == class.variant_name() {
            return Ok(Arc::clone(class));
        }

        let found = self
            .namespace_of(class)
            .and_then(|ns| ns.variants.get(&key))
            .filter(|found| found.is_subclass_of(class));
        match found {
            Some(found) => Ok(Arc::clone(found)),
            None => Err(Error::UnknownVariant {
                category: class.category_root().name().to_string(),
                name: name.to_string(),
                available: self
                    .variants_of(class)
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            }),
        }
    }

    /// Registered variant names that `class` accepts: its own (when
    /// registered) and its descendants', sorted.
    #[must_use]
    pub fn variants_of(&self, class: &ConfigClass) -> Vec<&str> {
        self.namespace_of(class)
            .map(|ns| {
                ns.variants
                    .iter()
                    .filter(|(_, variant)| variant.is_subclass_of(class))
                    .map(|(name, _)| name.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn namespace_of(&self, class: &ConfigClass) -> Option<&Namespace> {
        let root = class.category_root();
        self.namespaces
            .get(root.name())
            .filter(|ns| std::ptr::eq(ns.root.as_ref(), root))
    }

    /// Registered variant names of `category_root`, sorted.
    #[must_use]
    pub fn variants(&self, category_root: &ConfigClass) -> Vec<&str> {
        self.namespaces
            .get(category_root.category_root().name())
            .map(|ns| ns.variants.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Every registered category root, sorted by name.
    pub fn categories(&self) -> impl Iterator<Item = &Arc<ConfigClass>> {
        self.namespaces.values().map(|ns| &ns.root)
    }

    /// A strict resolver over this registry.
    #[must_use]
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(self)
    }

    /// Builds `class` from a nested mapping.
    ///
    /// # Errors
    ///
    /// See [`Resolver::build_from_nested`].
    pub fn build_from_nested(
        &self,
        class: &Arc<ConfigClass>,
        nested: Mapping,
        strict: bool,
    ) -> Result<ConfigInstance> {
        self.resolver().strict(strict).build_from_nested(class, nested)
    }

    /// Builds `class` from flat dotted-key pairs.
    ///
    /// # Errors
    ///
    /// See [`Resolver::build_from_flat`].
    pub fn build_from_flat<I, K>(
        &self,
        class: &Arc<ConfigClass>,
        flat: I,
        strict: bool,
    ) -> Result<ConfigInstance>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.resolver().strict(strict).build_from_flat(class, flat)
    }

    fn open_namespace(&mut self, root: &Arc<ConfigClass>) -> &mut Namespace {
        let root = if root.is_category_root() {
            Arc::clone(root)
        } else {
            self.root_arc(root)
        };
        let namespace = self
            .namespaces
            .entry(root.name().to_string())
            .or_insert_with(|| Namespace {
                root: Arc::clone(&root),
                variants: BTreeMap::new(),
            });
        if !Arc::ptr_eq(&namespace.root, &root) {
            log::debug!("category root {} redefined, starting a new namespace", root.name());
            *namespace = Namespace {
                root,
                variants: BTreeMap::new(),
            };
        }
        namespace
    }

    /// The `Arc` holding `class`'s category root.
    fn root_arc(&self, class: &Arc<ConfigClass>) -> Arc<ConfigClass> {
        let mut current = class;
        while let Some(parent) = current.parent() {
            current = parent;
        }
        Arc::clone(current)
    }
}
