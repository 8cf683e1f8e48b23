//! Materialized config instances.

use std::fmt;
use std::sync::Arc;

use crate::builder::{Resolver, DEFAULT_SEPARATOR};
use crate::class::ConfigClass;
use crate::error::{Error, Result};
use crate::normalize;
use crate::registry::Registry;
use crate::value::{Mapping, Value};
use crate::VARIANT_KEY;

/// A resolved config: a concrete class plus one value per declared field.
///
/// Instances are produced by the builder and hold every field of their
/// class in declaration order. Values are owned, so cloning an instance (or
/// building two instances from the same defaults) never shares lists or
/// nested configs.
///
/// # Examples
///
/// ```
/// use cfgforge::{ConfigClass, FieldType, Mapping, Registry, Value};
///
/// let trainer = ConfigClass::root("Trainer")
///     .field_with_default("steps", FieldType::Int, 1000)
///     .build()
///     .unwrap();
/// let registry = Registry::new();
///
/// let mut instance = registry.build_from_nested(&trainer, Mapping::new(), true).unwrap();
/// instance.set(&registry, "steps", "2000").unwrap();
/// assert_eq!(instance.get("steps"), Some(&Value::Int(2000)));
///
/// let flat = instance.to_mapping(true);
/// assert_eq!(flat["_name"], Value::from("trainer"));
/// ```
#[derive(Clone)]
pub struct ConfigInstance {
    class: Arc<ConfigClass>,
    values: Vec<(String, Value)>,
}

impl ConfigInstance {
    /// Assembles an instance from already-resolved values.
    pub(crate) fn from_parts(class: Arc<ConfigClass>, values: Vec<(String, Value)>) -> Self {
        Self { class, values }
    }

    /// The concrete class.
    #[must_use]
    pub fn class(&self) -> &Arc<ConfigClass> {
        &self.class
    }

    /// The concrete class's variant name.
    #[must_use]
    pub fn variant_name(&self) -> &str {
        self.class.variant_name()
    }

    /// The value of `field`, if the class declares it.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Every field and its value, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Assigns a field, coercing `value` strictly to the declared type.
    ///
    /// Config-typed fields accept variant names and mappings resolved
    /// through `registry`. On error the instance is unchanged.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownField`] if the class has no such field, otherwise any
    /// strict coercion error.
    pub fn set(&mut self, registry: &Registry, field: &str, value: impl Into<Value>) -> Result<()> {
        let position = self.values.iter().position(|(name, _)| name == field);
        let (Some(index), Some(ty)) = (position, self.class.field_type(field)) else {
            return Err(Error::UnknownField {
                path: field.to_string(),
                class: self.class.name().to_string(),
            });
        };
        let coerced = Resolver::new(registry).coerce(value.into(), ty, field)?;
        self.values[index].1 = coerced;
        Ok(())
    }

    /// Projects the instance back into plain data.
    ///
    /// Every level records its variant under `_name`, so building the same
    /// class from the result selects the same variants. With `flatten` the
    /// result uses dotted keys, the inverse of flat-mapping normalization.
    #[must_use]
    pub fn to_mapping(&self, flatten: bool) -> Mapping {
        let mut nested = Mapping::new();
        nested.insert(VARIANT_KEY.to_string(), Value::from(self.variant_name()));
        for (name, value) in &self.values {
            nested.insert(name.clone(), value.clone().into_plain());
        }
        if flatten {
            normalize::flatten(&nested, DEFAULT_SEPARATOR)
        } else {
            nested
        }
    }

    /// Copy of this instance with flat dotted-key overrides applied.
    ///
    /// # Errors
    ///
    /// See [`Resolver::with_overrides`].
    pub fn with_overrides<I, K>(
        &self,
        registry: &Registry,
        overrides: I,
        strict: bool,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Resolver::new(registry).strict(strict).with_overrides(self, overrides)
    }
}

impl PartialEq for ConfigInstance {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.class, &other.class) && self.values == other.values
    }
}

impl fmt::Debug for ConfigInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(self.class.name());
        for (name, value) in &self.values {
            out.field(name, value);
        }
        out.finish()
    }
}
