//! Reading nested mappings from YAML and JSON documents.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::value::{Mapping, Value};

/// Document formats understood by [`load_document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// `.yaml` / `.yml`.
    Yaml,
    /// `.json`.
    Json,
}

impl DocumentFormat {
    /// Picks the format from a file extension, case-insensitively.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Loads a nested mapping from a `.yaml`, `.yml` or `.json` file.
///
/// An empty YAML document is an empty mapping.
///
/// # Errors
///
/// Returns [`Error::InvalidDocument`] for unknown extensions or a top level
/// that is not a mapping, [`Error::Io`] if the file cannot be read and
/// [`Error::Yaml`]/[`Error::Json`] for syntax errors.
///
/// # Examples
///
/// ```no_run
/// use cfgforge::load_document;
/// use std::path::Path;
///
/// let nested = load_document(Path::new("experiment.yaml")).unwrap();
/// println!("{} top-level keys", nested.len());
/// ```
pub fn load_document(path: &Path) -> Result<Mapping> {
    let format = DocumentFormat::from_path(path).ok_or_else(|| Error::InvalidDocument {
        path: path.to_path_buf(),
        reason: "expected a .yaml, .yml or .json file".to_string(),
    })?;
    let contents = fs::read_to_string(path)?;
    parse_document(&contents, format).map_err(|err| match err {
        Error::InvalidDocument { reason, .. } => Error::InvalidDocument {
            path: path.to_path_buf(),
            reason,
        },
        other => other,
    })
}

/// Parses document text into a nested mapping.
///
/// # Errors
///
/// As [`load_document`], with an empty path in [`Error::InvalidDocument`].
pub fn parse_document(contents: &str, format: DocumentFormat) -> Result<Mapping> {
    let value = match format {
        DocumentFormat::Yaml => {
            let raw: serde_yaml::Value = serde_yaml::from_str(contents)?;
            Value::from(raw)
        }
        DocumentFormat::Json => {
            let raw: serde_json::Value = serde_json::from_str(contents)?;
            Value::from(raw)
        }
    };
    match value {
        Value::Map(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        other => Err(Error::InvalidDocument {
            path: std::path::PathBuf::new(),
            reason: format!("top level must be a mapping, found {}", other.kind()),
        }),
    }
}
