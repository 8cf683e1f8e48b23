//! Integration tests for the `resolve` command.

mod common;

use common::TestEnv;
use predicates::prelude::*;
use serde_json::json;

#[test]
fn test_resolve_defaults_with_override() {
    let env = TestEnv::new();
    let output = env.resolve_json("Experiment", &["--set", "seed=3"]);

    assert_eq!(
        output,
        json!({
            "model": { "_name": "dit", "version": "0.1.0", "layers": 16 },
            "optimizer": { "_name": "sgd", "lr": 0.001, "momentum": 0.9 },
            "seed": 3,
            "note": null,
            "_name": "experiment"
        })
    );
}

#[test]
fn test_resolve_switches_variant_from_flat_key() {
    let env = TestEnv::new();
    let output = env.resolve_json(
        "Experiment",
        &["-s", "model=unet", "-s", "model.conv=plain", "-s", "seed=1"],
    );

    assert_eq!(output["model"]["_name"], "unet");
    assert_eq!(output["model"]["conv"], "plain");
    assert!(output["model"].get("layers").is_none());
}

#[test]
fn test_resolve_flat_yaml_output() {
    let env = TestEnv::new();

    env.resolve("Experiment")
        .args(["--flat", "--set", "seed=5", "--set", "model.layers=[2, 4]"])
        .assert()
        .success()
        .stdout(predicate::str::contains("model._name: dit"))
        .stdout(predicate::str::contains("optimizer.momentum: 0.9"))
        .stdout(predicate::str::contains("seed: 5"));
}

#[test]
fn test_resolve_merges_files_in_order() {
    let env = TestEnv::new();
    let base = env.write_file("base.yaml", "seed: 1\nmodel:\n  _name: dit\n  layers: 4\n");
    let local = env.write_file("local.json", r#"{"seed": 2, "model": {"layers": [1, 2]}}"#);

    let output = env.resolve_json(
        "Experiment",
        &[
            "-f",
            base.to_str().unwrap(),
            "-f",
            local.to_str().unwrap(),
            "--set",
            "note=hello",
        ],
    );

    assert_eq!(output["seed"], 2);
    assert_eq!(output["model"]["layers"], json!([1, 2]));
    assert_eq!(output["note"], "hello");
}

#[test]
fn test_resolve_file_variant_name_with_flat_override() {
    let env = TestEnv::new();
    let doc = env.write_file("run.yaml", "model: dit\nseed: 1\n");

    let output = env.resolve_json(
        "Experiment",
        &["-f", doc.to_str().unwrap(), "--set", "model.layers=8"],
    );

    assert_eq!(output["model"]["_name"], "dit");
    assert_eq!(output["model"]["layers"], 8);
    assert_eq!(output["seed"], 1);
}

#[test]
fn test_resolve_lenient_missing_field_warns() {
    let env = TestEnv::new();

    env.resolve("Experiment")
        .args(["--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"seed\": null"))
        .stderr(predicate::str::contains("missing required field 'seed'"));
}

#[test]
fn test_resolve_quiet_silences_warnings() {
    let env = TestEnv::new();

    env.resolve("Experiment")
        .arg("--quiet")
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_resolve_strict_missing_field() {
    let env = TestEnv::new();

    env.resolve("Experiment")
        .arg("--strict")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing required field 'seed'"));
}

#[test]
fn test_resolve_strict_type_mismatch() {
    let env = TestEnv::new();

    env.resolve("Experiment")
        .args(["--strict", "--set", "seed=abc"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid value for 'seed'"));
}

#[test]
fn test_resolve_unknown_key_fails_even_when_lenient() {
    let env = TestEnv::new();

    env.resolve("Experiment")
        .args(["--set", "seed=1", "--set", "model.lyers=3"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown key 'model.lyers'"));
}

#[test]
fn test_resolve_unknown_variant() {
    let env = TestEnv::new();

    env.resolve("Experiment")
        .args(["--set", "seed=1", "--set", "model=vit"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown variant 'vit'"))
        .stderr(predicate::str::contains("dit"));
}

#[test]
fn test_resolve_reject_collisions() {
    let env = TestEnv::new();

    env.resolve("Experiment")
        .args([
            "--reject-collisions",
            "--set",
            "model=dit",
            "--set",
            "model.layers=2",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("key collision at 'model'"));
}

#[test]
fn test_resolve_custom_separator() {
    let env = TestEnv::new();
    let output = env.resolve_json(
        "Experiment",
        &["--separator", "/", "--set", "optimizer/lr=0.5", "--set", "seed=1"],
    );

    assert_eq!(output["optimizer"]["lr"], 0.5);
}

#[test]
fn test_resolve_malformed_assignment() {
    let env = TestEnv::new();

    env.resolve("Experiment")
        .args(["--set", "seed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected KEY=VALUE"));
}

#[test]
fn test_resolve_unknown_class() {
    let env = TestEnv::new();

    env.resolve("Trainer")
        .assert()
        .code(7)
        .stderr(predicate::str::contains("unknown config class 'Trainer'"));
}

#[test]
fn test_resolve_document_that_is_not_a_mapping() {
    let env = TestEnv::new();
    let doc = env.write_file("list.yaml", "- 1\n- 2\n");

    env.resolve("Experiment")
        .arg("--file")
        .arg(&doc)
        .assert()
        .code(7)
        .stderr(predicate::str::contains("invalid document"));
}

#[test]
fn test_resolve_missing_document() {
    let env = TestEnv::new();

    env.resolve("Experiment")
        .arg("--file")
        .arg(env.path().join("missing.yaml"))
        .assert()
        .code(5);
}
