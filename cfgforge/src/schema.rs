//! Declarative class hierarchies.
//!
//! A schema document declares config classes in YAML or JSON instead of in
//! code. Classes are declared and registered in document order, so a field
//! type or `extends` may only refer to classes declared above it.
//!
//! ```yaml
//! classes:
//!   - name: ModelConfig
//!     fields:
//!       - { name: version, type: str, default: "0.1.0" }
//!   - name: DiT
//!     extends: ModelConfig
//!     fields:
//!       - { name: layers, type: "int | list[int]", default: 16 }
//!   - name: Experiment
//!     fields:
//!       - { name: model, type: ModelConfig, default: dit }
//!       - { name: seed, type: int }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};

use crate::builder::Resolver;
use crate::class::ConfigClass;
use crate::error::{Error, Result};
use crate::loader::DocumentFormat;
use crate::registry::Registry;
use crate::types::FieldType;
use crate::value::Value;

/// Names that type expressions reserve for themselves.
const TYPE_KEYWORDS: &[&str] = &[
    "any", "bool", "int", "float", "str", "none", "optional", "list", "union",
];

/// A whole schema document.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    /// Class declarations, in declaration order.
    #[serde(default)]
    pub classes: Vec<ClassSpec>,
}

/// One class declaration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ClassSpec {
    /// Class name; its lower-cased form is the variant name.
    pub name: String,

    /// Parent class. Absent for a category root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,

    /// Fields declared on this class.
    #[serde(default)]
    pub fields: Vec<FieldSpec>,

    /// New defaults for inherited fields.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub defaults: BTreeMap<String, serde_yaml::Value>,
}

/// One field declaration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    /// Field name.
    pub name: String,

    /// Type expression, see [`FieldType::parse`].
    #[serde(rename = "type")]
    pub ty: String,

    /// Default value. An explicit `null` is a default; an absent key means
    /// the field is required.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<serde_yaml::Value>,
}

fn present<'de, D>(deserializer: D) -> std::result::Result<Option<serde_yaml::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_yaml::Value::deserialize(deserializer).map(Some)
}

/// Classes declared from schema documents, with their registry.
///
/// # Examples
///
/// ```
/// use cfgforge::{Mapping, Schema, Value};
///
/// let schema = Schema::from_yaml_str(r#"
/// classes:
///   - name: Optimizer
///     fields:
///       - { name: lr, type: float, default: 0.001 }
///   - name: AdamW
///     extends: Optimizer
///     fields:
///       - { name: weight_decay, type: float, default: 0.01 }
/// "#).unwrap();
///
/// let optimizer = schema.class("Optimizer").unwrap();
/// let built = schema
///     .resolver()
///     .build_from_flat(&optimizer, [("_name", Value::from("adamw")), ("lr", Value::from("3e-4"))])
///     .unwrap();
/// assert_eq!(built.variant_name(), "adamw");
/// assert_eq!(built.get("lr"), Some(&Value::Float(3e-4)));
/// ```
#[derive(Debug, Default)]
pub struct Schema {
    registry: Registry,
    classes: BTreeMap<String, Arc<ConfigClass>>,
}

impl Schema {
    /// An empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares every class of `document`, in order.
    ///
    /// # Errors
    ///
    /// The first declaration error, see [`Schema::declare`].
    pub fn from_document(document: SchemaDocument) -> Result<Self> {
        let mut schema = Self::new();
        for spec in document.classes {
            schema.declare(spec)?;
        }
        Ok(schema)
    }

    /// Parses and declares a YAML schema.
    ///
    /// # Errors
    ///
    /// [`Error::Yaml`] for malformed documents, otherwise as
    /// [`Schema::declare`].
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        Self::from_document(serde_yaml::from_str(contents)?)
    }

    /// Parses and declares a JSON schema.
    ///
    /// # Errors
    ///
    /// [`Error::Json`] for malformed documents, otherwise as
    /// [`Schema::declare`].
    pub fn from_json_str(contents: &str) -> Result<Self> {
        Self::from_document(serde_json::from_str(contents)?)
    }

    /// Loads a schema from a `.yaml`, `.yml` or `.json` file.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDocument`] for other extensions, [`Error::Io`] if the
    /// file cannot be read, otherwise as the string constructors.
    pub fn load(path: &Path) -> Result<Self> {
        let format = DocumentFormat::from_path(path).ok_or_else(|| Error::InvalidDocument {
            path: path.to_path_buf(),
            reason: "expected a .yaml, .yml or .json schema".to_string(),
        })?;
        let contents = std::fs::read_to_string(path)?;
        log::debug!("loading schema from {}", path.display());
        match format {
            DocumentFormat::Yaml => Self::from_yaml_str(&contents),
            DocumentFormat::Json => Self::from_json_str(&contents),
        }
    }

    /// Declares and registers one class.
    ///
    /// Config-typed defaults may be variant names or mappings; they are
    /// resolved through the classes registered so far. Declaring a name
    /// twice replaces the earlier class.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownClass`] for an unknown parent
    /// - [`Error::InvalidTypeExpression`] for a bad field type
    /// - [`Error::InvalidDeclaration`] for bad names or defaults
    pub fn declare(&mut self, spec: ClassSpec) -> Result<Arc<ConfigClass>> {
        let ClassSpec {
            name,
            extends,
            fields,
            defaults,
        } = spec;

        if TYPE_KEYWORDS.contains(&name.to_ascii_lowercase().as_str()) {
            return Err(Error::InvalidDeclaration {
                class: name,
                message: "class name is a reserved type keyword".to_string(),
            });
        }

        let mut builder = match extends {
            Some(parent) => ConfigClass::extends(name.clone(), &self.class(&parent)?),
            None => ConfigClass::root(name.clone()),
        };
        for field in fields {
            let ty = FieldType::parse(&field.ty, |class| self.classes.get(class).cloned())?;
            builder = match field.default {
                Some(default) => builder.field_with_default(field.name, ty, Value::from(default)),
                None => builder.field(field.name, ty),
            };
        }
        for (field, value) in defaults {
            builder = builder.default(field, Value::from(value));
        }

        let class = builder.build_with(&self.registry)?;
        if self.classes.contains_key(&name) {
            log::debug!("class {name} redeclared, replacing the earlier declaration");
        }
        self.registry.register(&class);
        self.classes.insert(name, Arc::clone(&class));
        Ok(class)
    }

    /// A declared class by name.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownClass`] if no class of that name was declared.
    pub fn class(&self, name: &str) -> Result<Arc<ConfigClass>> {
        self.classes
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownClass {
                name: name.to_string(),
            })
    }

    /// Every declared class, sorted by name.
    pub fn classes(&self) -> impl Iterator<Item = &Arc<ConfigClass>> {
        self.classes.values()
    }

    /// The registry every declared class is registered in.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// A strict resolver over the schema's registry.
    #[must_use]
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODELS: &str = r#"
classes:
  - name: ModelConfig
    fields:
      - { name: version, type: str, default: "0.1.0" }
  - name: DiT
    extends: ModelConfig
    fields:
      - { name: layers, type: "int | list[int]", default: 16 }
  - name: Unet
    extends: ModelConfig
    fields:
      - { name: conv, type: str, default: DISCO }
  - name: Experiment
    fields:
      - { name: model, type: ModelConfig, default: dit }
      - { name: seed, type: int }
      - { name: note, type: "optional[str]", default: null }
"#;

    #[test]
    fn test_parse_document() {
        let document: SchemaDocument = serde_yaml::from_str(MODELS).unwrap();
        assert_eq!(document.classes.len(), 4);
        assert_eq!(document.classes[1].extends.as_deref(), Some("ModelConfig"));

        let experiment = &document.classes[3];
        assert_eq!(experiment.fields[1].default, None);
        assert_eq!(experiment.fields[2].default, Some(serde_yaml::Value::Null));
    }

    #[test]
    fn test_declares_and_registers() {
        let schema = Schema::from_yaml_str(MODELS).unwrap();
        let model = schema.class("ModelConfig").unwrap();
        assert_eq!(schema.registry().variants(&model), vec!["dit", "unet"]);
        assert_eq!(schema.classes().count(), 4);
    }

    #[test]
    fn test_config_default_names_variant() {
        let schema = Schema::from_yaml_str(MODELS).unwrap();
        let experiment = schema.class("Experiment").unwrap();
        let defaults = experiment.defaults();
        let model = defaults["model"].as_config().unwrap();
        assert_eq!(model.variant_name(), "dit");
        assert_eq!(defaults["note"], Value::Null);
        assert!(!defaults.contains_key("seed"));
    }

    #[test]
    fn test_build_through_schema() {
        let schema = Schema::from_yaml_str(MODELS).unwrap();
        let experiment = schema.class("Experiment").unwrap();
        let built = schema
            .resolver()
            .build_from_flat(
                &experiment,
                [("model", Value::from("unet")), ("seed", Value::from("5"))],
            )
            .unwrap();
        let model = built.get("model").and_then(Value::as_config).unwrap();
        assert_eq!(model.get("conv"), Some(&Value::from("DISCO")));
        assert_eq!(built.get("seed"), Some(&Value::Int(5)));
    }

    #[test]
    fn test_json_schema() {
        let schema = Schema::from_json_str(
            r#"{"classes": [{"name": "Trainer", "fields": [{"name": "steps", "type": "int", "default": "100"}]}]}"#,
        )
        .unwrap();
        let trainer = schema.class("Trainer").unwrap();
        assert_eq!(trainer.defaults()["steps"], Value::Int(100));
    }

    #[test]
    fn test_declaration_errors() {
        let unknown_parent = "classes:\n  - { name: B, extends: A }\n";
        assert!(matches!(
            Schema::from_yaml_str(unknown_parent),
            Err(Error::UnknownClass { ref name }) if name == "A"
        ));

        let forward_reference =
            "classes:\n  - { name: A, fields: [{ name: b, type: B }] }\n  - { name: B }\n";
        assert!(matches!(
            Schema::from_yaml_str(forward_reference),
            Err(Error::InvalidTypeExpression { .. })
        ));

        let keyword = "classes:\n  - { name: List }\n";
        assert!(matches!(
            Schema::from_yaml_str(keyword),
            Err(Error::InvalidDeclaration { .. })
        ));

        let stray_key = "classes:\n  - { name: A, feilds: [] }\n";
        assert!(matches!(Schema::from_yaml_str(stray_key), Err(Error::Yaml(_))));
    }

    #[test]
    fn test_unknown_class_lookup() {
        let schema = Schema::new();
        assert!(matches!(schema.class("Nope"), Err(Error::UnknownClass { .. })));
    }
}
