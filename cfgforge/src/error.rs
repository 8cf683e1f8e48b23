//! Error types for the cfgforge library.
//!
//! This module provides the error hierarchy for class declaration, variant
//! lookup, mapping normalization and instance resolution, using `thiserror`
//! for ergonomic error handling.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for operations that may fail with a cfgforge error.
///
/// # Examples
///
/// ```
/// use cfgforge::{Error, Result};
///
/// fn example_operation() -> Result<i64> {
///     Ok(8)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the cfgforge library.
///
/// The first five variants are resolution failures: they describe defects in
/// caller-provided data and carry the dotted path of the offending key. The
/// remaining variants cover declaration and document-loading problems.
#[derive(Debug, Error)]
pub enum Error {
    /// A variant name has no match in its category namespace.
    #[error("unknown variant '{name}' for category '{category}', expected one of: {available:?}")]
    UnknownVariant {
        /// The category root whose namespace was searched.
        category: String,
        /// The requested variant name.
        name: String,
        /// The registered variant names the requested class accepts.
        available: Vec<String>,
    },

    /// A supplied key is not a declared field of the resolved class.
    #[error("unknown key '{path}' in {class}, check for typos or remove unused config keys")]
    UnknownField {
        /// Full dotted path of the key.
        path: String,
        /// Name of the resolved class.
        class: String,
    },

    /// A required field has neither a supplied value nor a default.
    #[error("missing required field '{path}' of type '{expected}' in {class}")]
    MissingRequiredField {
        /// Full dotted path of the field.
        path: String,
        /// Name of the resolved class.
        class: String,
        /// The declared type of the field.
        expected: String,
    },

    /// A raw value could not be coerced to the declared type.
    #[error("invalid value for '{path}' (expected {expected}, got {value}): {reason}")]
    TypeMismatch {
        /// Full dotted path of the field.
        path: String,
        /// The declared type.
        expected: String,
        /// The offending value, truncated for display.
        value: String,
        /// The underlying coercion diagnostic.
        reason: String,
    },

    /// A path prefix is claimed both as a scalar and as a nesting parent.
    #[error("key collision at '{path}': prefix already holds a value that is not a mapping")]
    KeyCollision {
        /// The colliding prefix.
        path: String,
    },

    /// A class or field declaration is malformed.
    #[error("invalid declaration of {class}: {message}")]
    InvalidDeclaration {
        /// The class being declared.
        class: String,
        /// A description of the problem.
        message: String,
    },

    /// A type expression in a schema document could not be parsed.
    #[error("invalid type expression '{expression}': {reason}")]
    InvalidTypeExpression {
        /// The expression as written.
        expression: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A class was requested by name but has not been declared.
    #[error("unknown config class '{name}'")]
    UnknownClass {
        /// The requested class name.
        name: String,
    },

    /// A document could not be used as a nested mapping.
    #[error("invalid document {}: {reason}", path.display())]
    InvalidDocument {
        /// Path to the document.
        path: PathBuf,
        /// Why it was rejected.
        reason: String,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML document failed to parse.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON document failed to parse.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Check if error is one that non-strict resolution can never recover from.
    ///
    /// Unknown variants, unknown fields and key collisions indicate malformed
    /// input rather than an ambiguous type, so they are fatal in every mode.
    ///
    /// # Examples
    ///
    /// ```
    /// use cfgforge::Error;
    ///
    /// let err = Error::UnknownField { path: "model.lyers".into(), class: "Dit".into() };
    /// assert!(err.is_fatal_regardless_of_strictness());
    /// ```
    #[must_use]
    pub fn is_fatal_regardless_of_strictness(&self) -> bool {
        matches!(
            self,
            Self::UnknownVariant { .. } | Self::UnknownField { .. } | Self::KeyCollision { .. }
        )
    }

    /// Check if error came out of resolving caller-provided data.
    #[must_use]
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownVariant { .. }
                | Self::UnknownField { .. }
                | Self::MissingRequiredField { .. }
                | Self::TypeMismatch { .. }
                | Self::KeyCollision { .. }
        )
    }

    /// The dotted path the error refers to, when it has one.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::UnknownField { path, .. }
            | Self::MissingRequiredField { path, .. }
            | Self::TypeMismatch { path, .. }
            | Self::KeyCollision { path } => Some(path),
            _ => None,
        }
    }
}
