//! Smoke tests -- verify the binary runs and key subcommands load.

use assert_cmd::Command;
use std::io::Write;

#[test]
fn test_cli_help() {
    Command::cargo_bin("servicemedic")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicates::str::contains(
            "Deterministic incident triage for service telemetry",
        ));
}

#[test]
fn test_cli_version() {
    Command::cargo_bin("servicemedic")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicates::str::contains("servicemedic"));
}

#[test]
fn test_serve_subcommand_exists() {
    Command::cargo_bin("servicemedic")
        .unwrap()
        .args(["serve", "--help"])
        .assert()
        .success();
}

#[test]
fn test_simulate_produces_report() {
    Command::cargo_bin("servicemedic")
        .unwrap()
        .args(["simulate", "--count", "5", "--seed", "7"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Scenario"));
}

#[test]
fn test_simulate_seed_is_reproducible() {
    let run = |seed: &str| {
        let output = Command::cargo_bin("servicemedic")
            .unwrap()
            .args(["simulate", "--count", "8", "--seed", seed, "--json"])
            .output()
            .unwrap();
        assert!(output.status.success());
        output.stdout
    };
    assert_eq!(run("42"), run("42"));
}

#[test]
fn test_triage_classifies_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, r#"{{"mean_cpu": 85.0, "unit_economics_ratio": 0.8}}"#).unwrap();

    Command::cargo_bin("servicemedic")
        .unwrap()
        .args(["triage", "--input"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicates::str::contains("BadDeploy"));
}

#[test]
fn test_triage_missing_file_fails() {
    Command::cargo_bin("servicemedic")
        .unwrap()
        .args(["triage", "--input", "/nonexistent/telemetry.json"])
        .assert()
        .failure();
}
