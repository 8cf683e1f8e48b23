//! Nested builder: resolves a class and a nested mapping into an instance.
//!
//! [`Resolver`] carries the registry and the [`ResolveOptions`] for one
//! resolution. Every entry point bottoms out in the same recursive step:
//! pick the concrete variant, reject unknown keys, coerce supplied fields,
//! fill the rest from defaults, and check the result.

use std::sync::Arc;

use crate::class::{ConfigClass, FieldDecl};
use crate::error::{Error, Result};
use crate::instance::ConfigInstance;
use crate::merge::deep_merge;
use crate::normalize::normalize;
use crate::registry::Registry;
use crate::types::TypeShape;
use crate::value::{Mapping, Value, MAX_DISPLAY_LEN};
use crate::VARIANT_KEY;

/// Separator used between path segments of a flat key.
pub const DEFAULT_SEPARATOR: char = '.';

/// What the normalizer does when a path prefix already holds a scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Treat the scalar as a variant name: `x` becomes `{"_name": x}`.
    #[default]
    Promote,
    /// Fail with [`Error::KeyCollision`].
    Reject,
}

/// Options for one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Fail on type mismatches and missing required fields instead of
    /// recovering with a warning.
    pub strict: bool,
    /// Separator between segments of flat keys.
    pub separator: char,
    /// How flat-key collisions are handled.
    pub collision: CollisionPolicy,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            strict: true,
            separator: DEFAULT_SEPARATOR,
            collision: CollisionPolicy::default(),
        }
    }
}

/// Builds config instances against a [`Registry`].
///
/// # Examples
///
/// ```
/// use cfgforge::{ConfigClass, FieldType, Mapping, Registry, Resolver, Value};
///
/// let model = ConfigClass::root("Model")
///     .field_with_default("layers", FieldType::Int, 4)
///     .build()
///     .unwrap();
/// let mut registry = Registry::new();
/// registry.register(&model);
///
/// let resolver = Resolver::new(&registry).strict(false);
/// let instance = resolver
///     .build_from_flat(&model, [("layers", Value::from("8"))])
///     .unwrap();
/// assert_eq!(instance.get("layers"), Some(&Value::Int(8)));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'r> {
    registry: &'r Registry,
    options: ResolveOptions,
}

impl<'r> Resolver<'r> {
    /// A strict resolver with default options.
    #[must_use]
    pub fn new(registry: &'r Registry) -> Self {
        Self::with_options(registry, ResolveOptions::default())
    }

    /// A resolver with explicit options.
    #[must_use]
    pub fn with_options(registry: &'r Registry, options: ResolveOptions) -> Self {
        Self { registry, options }
    }

    /// Sets strict mode.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.options.strict = strict;
        self
    }

    /// Sets the flat-key separator.
    #[must_use]
    pub fn separator(mut self, separator: char) -> Self {
        self.options.separator = separator;
        self
    }

    /// Sets the flat-key collision policy.
    #[must_use]
    pub fn collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.options.collision = policy;
        self
    }

    /// The options in effect.
    #[must_use]
    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// The registry variants are looked up in.
    #[must_use]
    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Builds `class` from a nested mapping.
    ///
    /// A `_name` key at any level selects a registered variant of that
    /// level's declared class.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownVariant`] or [`Error::UnknownField`] in any mode
    /// - [`Error::TypeMismatch`] or [`Error::MissingRequiredField`] in
    ///   strict mode
    pub fn build_from_nested(
        &self,
        class: &Arc<ConfigClass>,
        nested: Mapping,
    ) -> Result<ConfigInstance> {
        self.build(class, Value::Map(nested), "")
    }

    /// Normalizes flat dotted-key pairs and builds `class` from the result.
    ///
    /// # Errors
    ///
    /// [`Error::KeyCollision`] under [`CollisionPolicy::Reject`], otherwise
    /// as [`Resolver::build_from_nested`].
    pub fn build_from_flat<I, K>(&self, class: &Arc<ConfigClass>, flat: I) -> Result<ConfigInstance>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let nested = normalize(flat, self.options.separator, self.options.collision)?;
        self.build_from_nested(class, nested)
    }

    /// Copy of `instance` with flat overrides layered over its fields.
    ///
    /// The overrides are normalized, deep-merged over
    /// `instance.to_mapping(false)` and the merged mapping is rebuilt from
    /// the instance's class. `instance` itself is not modified.
    ///
    /// # Errors
    ///
    /// As [`Resolver::build_from_flat`].
    pub fn with_overrides<I, K>(
        &self,
        instance: &ConfigInstance,
        overrides: I,
    ) -> Result<ConfigInstance>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let overlay = normalize(overrides, self.options.separator, self.options.collision)?;
        let merged = deep_merge(instance.to_mapping(false), overlay);
        self.build_from_nested(instance.class(), merged)
    }

    /// One level of the recursive build. `raw` is a mapping or a bare
    /// variant name; `path` is the dotted path of this level.
    pub(crate) fn build(
        &self,
        class: &Arc<ConfigClass>,
        raw: Value,
        path: &str,
    ) -> Result<ConfigInstance> {
        let mut supplied = match raw {
            Value::Str(name) => Mapping::from([(VARIANT_KEY.to_string(), Value::Str(name))]),
            Value::Map(map) => map,
            other => {
                return Err(Error::TypeMismatch {
                    path: display_path(path).to_string(),
                    expected: class.name().to_string(),
                    value: other.display_truncated(MAX_DISPLAY_LEN),
                    reason: format!("cannot build a config from {}", other.kind()),
                })
            }
        };

        let requested = supplied.remove(VARIANT_KEY).and_then(|name| match name {
            Value::Null => None,
            Value::Str(s) => Some(s),
            other => Some(other.to_string()),
        });
        let actual = self.registry.lookup_variant(class, requested.as_deref())?;
        log::debug!(
            "building {} as {} at '{}' (strict: {})",
            class.name(),
            actual.name(),
            display_path(path),
            self.options.strict
        );

        let decls = actual.fields();
        if let Some(unknown) = supplied
            .keys()
            .find(|key| !decls.iter().any(|decl| decl.name() == key.as_str()))
        {
            return Err(Error::UnknownField {
                path: join_path(path, unknown),
                class: actual.name().to_string(),
            });
        }

        let mut defaults = actual.defaults();
        let mut values = Vec::with_capacity(decls.len());
        for decl in decls {
            let field_path = join_path(path, decl.name());
            let value = match supplied.remove(decl.name()) {
                Some(raw) => self.coerce(raw, decl.ty(), &field_path)?,
                None => match defaults.remove(decl.name()) {
                    Some(default) => default,
                    None => self.missing(&actual, decl, &field_path)?,
                },
            };
            values.push((decl.name().to_string(), value));
        }

        let instance = ConfigInstance::from_parts(actual, values);
        if self.options.strict {
            check_conformance(&instance, path)?;
        }
        Ok(instance)
    }

    /// Fallback for a field with neither a supplied value nor a default.
    fn missing(&self, class: &ConfigClass, decl: &FieldDecl, path: &str) -> Result<Value> {
        if self.options.strict {
            return Err(Error::MissingRequiredField {
                path: path.to_string(),
                class: class.name().to_string(),
                expected: decl.ty().to_string(),
            });
        }

        log::warn!(
            "missing required field '{path}' of type '{}' in {}, using a fallback",
            decl.ty(),
            class.name()
        );
        match decl.ty().classify() {
            TypeShape::ConfigType(nested) | TypeShape::Union { config: Some(nested), .. } => self
                .build(nested, Value::Map(Mapping::new()), path)
                .map(Value::Config),
            _ => Ok(Value::Null),
        }
    }
}

/// Re-checks every stored value against its declared type.
fn check_conformance(instance: &ConfigInstance, path: &str) -> Result<()> {
    for (name, value) in instance.fields() {
        let Some(ty) = instance.class().field_type(name) else {
            continue;
        };
        if !ty.admits(value) {
            return Err(Error::TypeMismatch {
                path: join_path(path, name),
                expected: ty.to_string(),
                value: value.display_truncated(MAX_DISPLAY_LEN),
                reason: format!("resolved {} does not conform to the declared type", value.kind()),
            });
        }
    }
    Ok(())
}

/// Appends a field name to a dotted path.
pub(crate) fn join_path(path: &str, field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{path}.{field}")
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "<root>"
    } else {
        path
    }
}
