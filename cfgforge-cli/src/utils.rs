//! Utility functions for CLI operations.
//!
//! This module provides helpers shared across commands: schema loading,
//! `KEY=VALUE` parsing and output formatting.

use crate::error::CliError;
use cfgforge::{Mapping, Schema};
use clap::ValueEnum;
use std::path::Path;

/// Global CLI options shared across all commands.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,
}

/// Output format for resolved configs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML document.
    Yaml,
    /// Pretty-printed JSON object.
    Json,
}

impl OutputFormat {
    /// Render a mapping in this format.
    ///
    /// The result always ends with a newline.
    pub fn render(self, mapping: &Mapping) -> Result<String, CliError> {
        match self {
            OutputFormat::Yaml => {
                serde_yaml::to_string(mapping).map_err(|e| CliError::Output(e.to_string()))
            }
            OutputFormat::Json => serde_json::to_string_pretty(mapping)
                .map(|json| json + "\n")
                .map_err(|e| CliError::Output(e.to_string())),
        }
    }
}

/// Parse a `KEY=VALUE` override.
///
/// The value is kept as a string; the resolver coerces it to the declared
/// field type. Only the first `=` splits, so values may contain `=`.
pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Load a schema file, checking that it exists first.
pub fn load_schema(path: &Path) -> Result<Schema, CliError> {
    if !path.exists() {
        return Err(CliError::InvalidArguments(format!(
            "Schema file not found: {}",
            path.display()
        )));
    }
    Ok(Schema::load(path)?)
}
