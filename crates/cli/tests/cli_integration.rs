//! CLI integration tests for the `dossier` subcommands.
//!
//! Uses `assert_cmd` to spawn the binary and verify exit codes, stdout
//! content, and stderr content. The `analyze` tests clear
//! ANTHROPIC_API_KEY so the heuristic provider runs offline.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper: create a Command for the `dossier` binary without an API key.
fn dossier() -> Command {
    let mut cmd = cargo_bin_cmd!("dossier");
    cmd.env_remove("ANTHROPIC_API_KEY");
    cmd
}

/// A complete valid intake form as JSON text.
fn valid_intake_json() -> String {
    serde_json::json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "ada@example.com",
        "companyName": "Analytical Engines Ltd",
        "currentRevenue": "$40k/mo",
        "biggestBottleneck": "every delivery requires a senior engineer to babysit it",
        "acquisitionSource": "outbound plus referrals",
        "salesProcess": "two-call close",
        "fulfillmentWorkflow": "pod per client",
        "revenueGoal": "$100k/mo",
        "dreamOutcome": "an operation that runs without the founder",
        "commitmentLevel": 9
    })
    .to_string()
}

#[test]
fn help_exits_0_with_description() {
    dossier()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Dossier intake and analysis service",
        ));
}

#[test]
fn version_exits_0() {
    dossier()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dossier"));
}

#[test]
fn analyze_valid_form_prints_dossier_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("intake.json");
    fs::write(&path, valid_intake_json()).unwrap();

    let output = dossier().arg("analyze").arg(&path).assert().success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout).to_string();

    let dossier: serde_json::Value = serde_json::from_str(&stdout).expect("stdout is JSON");
    assert!(dossier.get("executiveSummary").is_some());
    assert!(dossier.get("strategicQuestions").is_some());
    let score = dossier["estimatedFitScore"].as_u64().expect("fit score");
    assert!(score <= 100);
}

#[test]
fn analyze_reports_missing_required_fields() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("intake.json");
    fs::write(
        &path,
        r#"{"firstName": "", "lastName": "Lovelace", "email": "ada@example.com"}"#,
    )
    .unwrap();

    dossier()
        .arg("analyze")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required fields"))
        .stderr(predicate::str::contains("firstName"));
}

#[test]
fn analyze_rejects_malformed_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("intake.json");
    fs::write(&path, "this is not json").unwrap();

    dossier()
        .arg("analyze")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a valid intake form"));
}

#[test]
fn analyze_missing_file_exits_1() {
    dossier()
        .arg("analyze")
        .arg("no-such-file.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}
