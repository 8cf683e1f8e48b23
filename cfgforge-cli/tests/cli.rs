//! Integration tests for the cfgforge CLI.
//!
//! These tests verify argument parsing, help text, version output and the
//! non-resolve commands.

mod common;

use assert_cmd::Command;
use common::TestEnv;
use predicates::prelude::*;

/// Test that the binary without arguments shows usage and fails.
#[test]
fn test_cli_no_arguments() {
    let mut cmd = Command::cargo_bin("cfgforge").expect("Failed to find cfgforge binary");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

/// Test that the --version flag displays version information.
#[test]
fn test_cli_version_flag() {
    let mut cmd = Command::cargo_bin("cfgforge").expect("Failed to find cfgforge binary");

    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("cfgforge"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

/// Test that the --help flag lists the commands.
#[test]
fn test_cli_help_flag() {
    let mut cmd = Command::cargo_bin("cfgforge").expect("Failed to find cfgforge binary");

    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Resolve typed configuration hierarchies"))
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("variants"));
}

/// Test that an invalid subcommand produces an error.
#[test]
fn test_cli_invalid_subcommand() {
    let mut cmd = Command::cargo_bin("cfgforge").expect("Failed to find cfgforge binary");

    cmd.arg("invalid-command");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_variants_lists_every_category() {
    let env = TestEnv::new();

    env.command_bare()
        .arg("variants")
        .arg("--schema")
        .arg(&env.schema)
        .assert()
        .success()
        .stdout(predicate::str::contains("ModelConfig: dit, unet"))
        .stdout(predicate::str::contains("OptimizerConfig: sgd"))
        .stdout(predicate::str::contains("Experiment: (no variants)"));
}

#[test]
fn test_variants_for_one_class() {
    let env = TestEnv::new();

    env.command_bare()
        .arg("variants")
        .arg("--schema")
        .arg(&env.schema)
        .arg("DiT")
        .assert()
        .success()
        .stdout("dit\n");
}

#[test]
fn test_variants_for_category_root() {
    let env = TestEnv::new();

    env.command_bare()
        .arg("variants")
        .arg("--schema")
        .arg(&env.schema)
        .arg("ModelConfig")
        .assert()
        .success()
        .stdout("dit\nunet\n");
}

#[test]
fn test_variants_schema_from_env() {
    let env = TestEnv::new();

    env.command_bare()
        .env("CFGFORGE_SCHEMA", &env.schema)
        .args(["variants", "Sgd"])
        .assert()
        .success()
        .stdout("sgd\n");
}

#[test]
fn test_variants_unknown_class() {
    let env = TestEnv::new();

    env.command_bare()
        .arg("variants")
        .arg("--schema")
        .arg(&env.schema)
        .arg("Vit")
        .assert()
        .code(7)
        .stderr(predicate::str::contains("unknown config class 'Vit'"));
}

#[test]
fn test_validate_valid_schema() {
    let env = TestEnv::new();

    env.command_bare()
        .arg("validate")
        .arg(&env.schema)
        .assert()
        .success()
        .stdout(predicate::str::contains("DiT extends ModelConfig"))
        .stdout(predicate::str::contains("  layers: int | list[int] = 16"))
        .stdout(predicate::str::contains("  seed: int\n"))
        .stdout(predicate::str::contains("Schema is valid (6 classes)"));
}

#[test]
fn test_validate_quiet() {
    let env = TestEnv::new();

    env.command_bare()
        .arg("--quiet")
        .arg("validate")
        .arg(&env.schema)
        .assert()
        .success()
        .stdout("Schema is valid (6 classes)\n");
}

#[test]
fn test_validate_bad_default() {
    let env = TestEnv::new();
    let schema = env.write_file(
        "bad.yaml",
        "classes:\n  - name: A\n    fields:\n      - { name: n, type: int, default: lots }\n",
    );

    env.command_bare()
        .arg("validate")
        .arg(&schema)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("A.n"));
}

#[test]
fn test_validate_bad_type_expression() {
    let env = TestEnv::new();
    let schema = env.write_file(
        "bad.yaml",
        "classes:\n  - name: A\n    fields:\n      - { name: n, type: \"list[\" }\n",
    );

    env.command_bare()
        .arg("validate")
        .arg(&schema)
        .assert()
        .code(7)
        .stderr(predicate::str::contains("invalid type expression"));
}

#[test]
fn test_validate_missing_file() {
    let env = TestEnv::new();

    env.command_bare()
        .arg("validate")
        .arg(env.path().join("nope.yaml"))
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Schema file not found"));
}

#[test]
fn test_completions_bash() {
    let env = TestEnv::new();

    env.command_bare()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cfgforge"));
}
