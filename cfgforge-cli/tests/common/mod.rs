//! Common test utilities for CLI integration tests.
//!
//! This module provides shared helpers for CLI testing:
//! - Test environment setup with a temporary directory
//! - A schema file written into that directory
//! - Command builder helpers

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Schema written by [`TestEnv::new`].
pub const SCHEMA: &str = r#"
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
  - name: OptimizerConfig
    fields:
      - { name: lr, type: float, default: 0.001 }
  - name: Sgd
    extends: OptimizerConfig
    fields:
      - { name: momentum, type: float, default: 0.9 }
  - name: Experiment
    fields:
      - { name: model, type: ModelConfig, default: dit }
      - { name: optimizer, type: OptimizerConfig, default: sgd }
      - { name: seed, type: int }
      - { name: note, type: "optional[str]", default: null }
"#;

/// Test environment with an isolated temporary directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Path to the temporary directory
    pub temp_path: PathBuf,
    /// Path to the schema file
    pub schema: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// Create a new test environment with [`SCHEMA`] written to `schema.yaml`.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let temp_path = temp_dir.path().to_path_buf();
        let schema = temp_path.join("schema.yaml");
        std::fs::write(&schema, SCHEMA).expect("Failed to write schema");

        Self {
            temp_dir,
            temp_path,
            schema,
        }
    }

    /// Get a bare command builder without pre-configured flags.
    pub fn command_bare(&self) -> Command {
        let mut cmd = Command::cargo_bin("cfgforge").expect("Failed to find cfgforge binary");
        cmd.env_remove("CFGFORGE_SCHEMA").env_remove("CFGFORGE_LOG_MODE");
        cmd
    }

    /// A `resolve` command for `class` against this environment's schema.
    pub fn resolve(&self, class: &str) -> Command {
        let mut cmd = self.command_bare();
        cmd.arg("resolve")
            .arg("--schema")
            .arg(&self.schema)
            .arg("--class")
            .arg(class);
        cmd
    }

    /// Get the temp path.
    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    /// Write a file under the temporary directory and return its path.
    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_path.join(name);
        std::fs::write(&path, contents).expect("Failed to write test file");
        path
    }

    /// Run `resolve` with JSON output and parse the result.
    ///
    /// # Panics
    /// Panics if the command fails or prints invalid JSON.
    pub fn resolve_json(&self, class: &str, args: &[&str]) -> serde_json::Value {
        let output = self
            .resolve(class)
            .args(["--format", "json"])
            .args(args)
            .output()
            .expect("Failed to run resolve command");

        assert!(
            output.status.success(),
            "Resolve failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("Output is not valid JSON")
    }
}
