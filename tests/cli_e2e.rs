//! End-to-end CLI tests for the waybackscan binary.
//!
//! Only flows that exit without touching the network are exercised here; the
//! scan pipeline itself is covered by the wiremock integration tests.

use assert_cmd::Command;
use predicates::prelude::*;

/// Test that --help displays usage information and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    let mut cmd = Command::cargo_bin("waybackscan").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wayback Machine"));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    let mut cmd = Command::cargo_bin("waybackscan").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("waybackscan"));
}

/// Test that invalid flags cause non-zero exit.
#[test]
fn test_binary_invalid_flag_returns_error() {
    let mut cmd = Command::cargo_bin("waybackscan").unwrap();
    cmd.arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

/// Test that the scan subcommand requires a domain argument.
#[test]
fn test_binary_scan_without_domain_returns_error() {
    let mut cmd = Command::cargo_bin("waybackscan").unwrap();
    cmd.arg("scan")
        .assert()
        .failure()
        .stderr(predicate::str::contains("DOMAIN"));
}

/// Test that subcommand help lists the scan options.
#[test]
fn test_binary_scan_help_lists_flags() {
    let mut cmd = Command::cargo_bin("waybackscan").unwrap();
    cmd.args(["scan", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--no-snapshots"))
        .stdout(predicate::str::contains("--download"));
}

/// Test that the shell refuses to run without an interactive stdin.
#[test]
fn test_binary_shell_with_closed_stdin_exits_nonzero() {
    let temp = tempfile::TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("waybackscan").unwrap();
    cmd.current_dir(temp.path()).write_stdin("").assert().failure();
}
