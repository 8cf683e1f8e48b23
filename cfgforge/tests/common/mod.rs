//! Common test utilities for integration tests.
//!
//! Fixture schemas and documents live under `tests/fixtures`.

use std::fs;
use std::path::{Path, PathBuf};

use cfgforge::{Mapping, Schema, Value};

/// Path to a file under `tests/fixtures`.
#[allow(dead_code)]
pub fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(relative)
}

/// The model/optimizer/experiment hierarchy shared by most tests.
#[allow(dead_code)]
pub fn training_schema() -> Schema {
    Schema::load(&fixture_path("schemas/training.yaml")).unwrap()
}

/// Writes `content` to `dir/filename` and returns the path.
#[allow(dead_code)]
pub fn write_file(dir: &Path, filename: &str, content: &str) -> PathBuf {
    let path = dir.join(filename);
    fs::write(&path, content).unwrap();
    path
}

/// Builds a mapping from literal pairs.
#[allow(dead_code)]
pub fn mapping<const N: usize>(pairs: [(&str, Value); N]) -> Mapping {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Follows a dotted path of config fields from `root`.
#[allow(dead_code)]
pub fn field<'a>(root: &'a cfgforge::ConfigInstance, path: &str) -> &'a Value {
    let mut segments = path.split('.');
    let first = segments.next().unwrap();
    let mut current = root.get(first).unwrap();
    for segment in segments {
        current = current.as_config().unwrap().get(segment).unwrap();
    }
    current
}
