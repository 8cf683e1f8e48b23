//! Config class declarations.
//!
//! A [`ConfigClass`] is one node of a hierarchy. A class declared with
//! [`ConfigClass::root`] is a *category root*: it opens a namespace of
//! interchangeable variants. Classes declared with [`ConfigClass::extends`]
//! inherit every field and default of their ancestors and live in the
//! namespace of their category root.
//!
//! # Examples
//!
//! ```
//! use cfgforge::{ConfigClass, FieldType, Value};
//!
//! let optimizer = ConfigClass::root("OptimizerConfig")
//!     .field_with_default("lr", FieldType::Float, 0.001)
//!     .build()
//!     .unwrap();
//! let adamw = ConfigClass::extends("AdamW", &optimizer)
//!     .field_with_default("weight_decay", FieldType::Float, 0.01)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(adamw.variant_name(), "adamw");
//! assert_eq!(adamw.category_root().name(), "OptimizerConfig");
//! assert_eq!(adamw.defaults()["lr"], Value::Float(0.001));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::builder::Resolver;
use crate::defaults::gather_defaults;
use crate::error::{Error, Result};
use crate::registry::Registry;
use crate::types::FieldType;
use crate::value::{Mapping, Value};
use crate::VARIANT_KEY;

/// A single field declaration.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    name: String,
    ty: FieldType,
    default: Option<Value>,
}

impl FieldDecl {
    /// The field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared type.
    #[must_use]
    pub fn ty(&self) -> &FieldType {
        &self.ty
    }

    /// The default declared alongside the field, if any.
    #[must_use]
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

/// A declared config class.
pub struct ConfigClass {
    name: String,
    variant_name: String,
    parent: Option<Arc<ConfigClass>>,
    fields: Vec<FieldDecl>,
    default_overrides: Vec<(String, Value)>,
}

impl ConfigClass {
    /// Starts declaring a category root.
    #[must_use]
    pub fn root(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder::new(name.into(), None)
    }

    /// Starts declaring a class derived from `parent`.
    #[must_use]
    pub fn extends(name: impl Into<String>, parent: &Arc<ConfigClass>) -> ClassBuilder {
        ClassBuilder::new(name.into(), Some(Arc::clone(parent)))
    }

    /// The class name as declared.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The lower-cased name used to select this class as a variant.
    #[must_use]
    pub fn variant_name(&self) -> &str {
        &self.variant_name
    }

    /// The direct parent, `None` for a category root.
    #[must_use]
    pub fn parent(&self) -> Option<&Arc<ConfigClass>> {
        self.parent.as_ref()
    }

    /// Returns true if this class opens its own variant namespace.
    #[must_use]
    pub fn is_category_root(&self) -> bool {
        self.parent.is_none()
    }

    /// The ancestor whose namespace this class is registered in.
    #[must_use]
    pub fn category_root(&self) -> &ConfigClass {
        let mut current = self;
        while let Some(parent) = &current.parent {
            current = parent;
        }
        current
    }

    /// Every class from the category root down to `self`, root first.
    #[must_use]
    pub fn ancestry(&self) -> Vec<&ConfigClass> {
        let mut chain = vec![self];
        let mut current = self;
        while let Some(parent) = &current.parent {
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        chain
    }

    /// Returns true if `self` is `other` or descends from it.
    #[must_use]
    pub fn is_subclass_of(&self, other: &ConfigClass) -> bool {
        self.ancestry()
            .into_iter()
            .any(|ancestor| std::ptr::eq(ancestor, other))
    }

    /// Fields declared directly on this class.
    #[must_use]
    pub fn own_fields(&self) -> &[FieldDecl] {
        &self.fields
    }

    /// Default overrides declared directly on this class.
    #[must_use]
    pub fn own_default_overrides(&self) -> &[(String, Value)] {
        &self.default_overrides
    }

    /// Every declared field across the ancestry, in declaration order.
    ///
    /// A field redeclared by a descendant keeps the position of its first
    /// declaration but takes the descendant's type.
    #[must_use]
    pub fn fields(&self) -> Vec<&FieldDecl> {
        let mut resolved: Vec<&FieldDecl> = Vec::new();
        for class in self.ancestry() {
            for decl in &class.fields {
                match resolved.iter_mut().find(|f| f.name == decl.name) {
                    Some(slot) => *slot = decl,
                    None => resolved.push(decl),
                }
            }
        }
        resolved
    }

    /// The resolved declared type of `field`, if the class has it.
    #[must_use]
    pub fn field_type(&self, field: &str) -> Option<&FieldType> {
        self.ancestry()
            .into_iter()
            .rev()
            .flat_map(|class| class.fields.iter())
            .find(|decl| decl.name == field)
            .map(FieldDecl::ty)
    }

    /// Defaults merged across the ancestry; see [`gather_defaults`].
    #[must_use]
    pub fn defaults(&self) -> Mapping {
        gather_defaults(self)
    }
}

impl fmt::Debug for ConfigClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigClass")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name.as_str()))
            .field(
                "fields",
                &self
                    .fields
                    .iter()
                    .map(|decl| (decl.name.as_str(), decl.ty.to_string()))
                    .collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

/// Builder returned by [`ConfigClass::root`] and [`ConfigClass::extends`].
#[derive(Debug)]
pub struct ClassBuilder {
    name: String,
    parent: Option<Arc<ConfigClass>>,
    fields: Vec<FieldDecl>,
    default_overrides: Vec<(String, Value)>,
}

impl ClassBuilder {
    fn new(name: String, parent: Option<Arc<ConfigClass>>) -> Self {
        Self {
            name,
            parent,
            fields: Vec::new(),
            default_overrides: Vec::new(),
        }
    }

    /// Declares a required field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push(FieldDecl {
            name: name.into(),
            ty,
            default: None,
        });
        self
    }

    /// Declares a field with a default.
    #[must_use]
    pub fn field_with_default(
        mut self,
        name: impl Into<String>,
        ty: FieldType,
        default: impl Into<Value>,
    ) -> Self {
        self.fields.push(FieldDecl {
            name: name.into(),
            ty,
            default: Some(default.into()),
        });
        self
    }

    /// Overrides the default of a field declared by an ancestor.
    #[must_use]
    pub fn default(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.default_overrides.push((name.into(), value.into()));
        self
    }

    /// Validates the declaration and produces the class.
    ///
    /// Every default is coerced strictly against its field's type here, once.
    /// Config-typed defaults must already be instances (or, for the field's
    /// own class, a mapping without a variant switch); use
    /// [`crate::Schema`] to declare defaults that select registered variants.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDeclaration`] for empty, private or duplicate
    /// field names and for overrides of undeclared fields, or the coercion
    /// error of a default that does not fit its type.
    pub fn build(self) -> Result<Arc<ConfigClass>> {
        let scratch = Registry::new();
        self.build_with(&scratch)
    }

    /// Like [`ClassBuilder::build`], resolving config-typed defaults through
    /// `registry` so they may name registered variants.
    ///
    /// # Errors
    ///
    /// See [`ClassBuilder::build`].
    pub fn build_with(self, registry: &Registry) -> Result<Arc<ConfigClass>> {
        let Self {
            name,
            parent,
            fields,
            default_overrides,
        } = self;

        let invalid = |message: String| Error::InvalidDeclaration {
            class: name.clone(),
            message,
        };

        if name.trim().is_empty() {
            return Err(invalid("class name cannot be empty".into()));
        }

        for (i, decl) in fields.iter().enumerate() {
            validate_field_name(&decl.name).map_err(&invalid)?;
            if fields[..i].iter().any(|earlier| earlier.name == decl.name) {
                return Err(invalid(format!("field '{}' declared twice", decl.name)));
            }
        }

        let resolver = Resolver::new(registry).strict(true);
        let mut checked_fields = Vec::with_capacity(fields.len());
        for decl in fields {
            let default = match decl.default {
                Some(raw) => {
                    let path = format!("{name}.{}", decl.name);
                    Some(resolver.coerce(raw, &decl.ty, &path)?)
                }
                None => None,
            };
            checked_fields.push(FieldDecl { default, ..decl });
        }

        let mut checked_overrides = Vec::with_capacity(default_overrides.len());
        for (field, raw) in default_overrides {
            if checked_fields.iter().any(|decl| decl.name == field) {
                return Err(invalid(format!(
                    "'{field}' is declared on this class; give the default in its declaration"
                )));
            }
            let ty = parent
                .as_ref()
                .and_then(|p| p.field_type(&field))
                .ok_or_else(|| invalid(format!("default given for undeclared field '{field}'")))?;
            let value = resolver.coerce(raw, ty, &format!("{name}.{field}"))?;
            checked_overrides.retain(|(existing, _): &(String, Value)| existing != &field);
            checked_overrides.push((field, value));
        }

        log::debug!(
            "declared config class {name} ({} own fields, parent {:?})",
            checked_fields.len(),
            parent.as_ref().map(|p| p.name())
        );

        Ok(Arc::new(ConfigClass {
            variant_name: name.to_lowercase(),
            name,
            parent,
            fields: checked_fields,
            default_overrides: checked_overrides,
        }))
    }
}

/// Field names must be usable as a dotted-path segment and must not collide
/// with the reserved variant key.
fn validate_field_name(field: &str) -> std::result::Result<(), String> {
    if field.is_empty() {
        return Err("field name cannot be empty".into());
    }
    if field == VARIANT_KEY || field.starts_with('_') {
        return Err(format!("field '{field}' is private; names may not start with '_'"));
    }
    if field.contains('.') || field.chars().any(char::is_whitespace) {
        return Err(format!("field '{field}' cannot contain '.' or whitespace"));
    }
    Ok(())
}
