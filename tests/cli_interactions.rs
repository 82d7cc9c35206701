//! CLI-level tests: argument surface and validation failures
//!
//! Only scenarios that fail before any network activity are exercised
//! here; live runs need a reachable cluster.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn clt() -> Command {
    Command::cargo_bin("clt").unwrap()
}

#[test]
fn help_lists_all_subcommands() {
    clt()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("loadtest"))
        .stdout(predicate::str::contains("master"))
        .stdout(predicate::str::contains("worker"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn version_flag_reports_version() {
    clt()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn missing_subcommand_fails() {
    clt().assert().failure();
}

#[test]
fn loadtest_rejects_out_of_range_hit_rate() {
    clt()
        .args(["loadtest", "--hit-rate", "2.0"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Hit rate must be between 0.0 and 1.0"));
}

#[test]
fn loadtest_rejects_inverted_wait_bounds() {
    clt()
        .args(["loadtest", "--wait-min", "5", "--wait-max", "1"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Pacing wait"));
}

#[test]
fn init_rejects_zero_keys() {
    clt()
        .args(["init", "--keys", "0"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Key count"));
}

#[test]
fn master_rejects_zero_expected_workers() {
    clt()
        .args(["master", "--expect-workers", "0"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("--expect-workers"));
}

#[test]
fn loadtest_help_documents_core_flags() {
    clt()
        .args(["loadtest", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--hit-rate"))
        .stdout(predicate::str::contains("--spawn-rate"))
        .stdout(predicate::str::contains("--retry-count"))
        .stdout(predicate::str::contains("--csv"));
}
