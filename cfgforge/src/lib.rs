#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # cfgforge
//!
//! Typed configuration hierarchies with variant selection.
//!
//! Config classes carry typed fields with defaults and form hierarchies under
//! *category roots*. Any level of a config can select one of its category's
//! registered variants by name, and instances can be built from nested
//! mappings (files) or flat dotted-key pairs (command lines).
//!
//! ## Core Types
//!
//! - [`ConfigClass`] and [`FieldType`]: class declarations
//! - [`Registry`]: variant namespaces per category root
//! - [`Resolver`]: the builder, with strict and lenient modes
//! - [`ConfigInstance`] and [`Value`]: resolved configs and raw data
//! - [`Schema`]: classes declared from YAML/JSON documents
//! - [`Error`] and [`Result`]: Error handling types
//!
//! ## Examples
//!
//! ```
//! use cfgforge::{ConfigClass, FieldType, Registry, Value};
//!
//! let model = ConfigClass::root("ModelConfig")
//!     .field_with_default("version", FieldType::Str, "0.1.0")
//!     .build()
//!     .unwrap();
//! let dit = ConfigClass::extends("DiT", &model)
//!     .field_with_default("layers", FieldType::Int, 16)
//!     .build()
//!     .unwrap();
//! let experiment = ConfigClass::root("Experiment")
//!     .field("model", FieldType::config(&model))
//!     .build()
//!     .unwrap();
//!
//! let mut registry = Registry::new();
//! for class in [&model, &dit, &experiment] {
//!     registry.register(class);
//! }
//!
//! let built = registry
//!     .build_from_flat(
//!         &experiment,
//!         [("model", Value::from("dit")), ("model.layers", Value::from("8"))],
//!         true,
//!     )
//!     .unwrap();
//! let model = built.get("model").and_then(Value::as_config).unwrap();
//! assert_eq!(model.variant_name(), "dit");
//! assert_eq!(model.get("layers"), Some(&Value::Int(8)));
//! ```

pub mod builder;
pub mod class;
pub mod coerce;
pub mod defaults;
pub mod error;
pub mod instance;
pub mod loader;
pub mod logging;
pub mod merge;
pub mod normalize;
pub mod registry;
pub mod schema;
pub mod types;
pub mod value;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

/// Reserved key that carries a variant selection in nested mappings.
///
/// It is never a declared field and never appears among an instance's
/// fields; [`ConfigInstance::to_mapping`] writes it at every level.
pub const VARIANT_KEY: &str = "_name";

// Re-export key types at crate root for convenience
pub use builder::{CollisionPolicy, ResolveOptions, Resolver, DEFAULT_SEPARATOR};
pub use class::{ClassBuilder, ConfigClass, FieldDecl};
pub use defaults::gather_defaults;
pub use error::{Error, Result};
pub use instance::ConfigInstance;
pub use loader::{load_document, parse_document, DocumentFormat};
pub use logging::{init_logger, LogLevel, Logger};
pub use merge::{deep_merge, deep_merge_all};
pub use normalize::{flatten, normalize};
pub use registry::Registry;
pub use schema::{ClassSpec, FieldSpec, Schema, SchemaDocument};
pub use types::{FieldType, TypeShape};
pub use value::{Mapping, Value};
