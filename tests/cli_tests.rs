//! CLI tests for the profilebridge binary.
//!
//! These run the compiled binary and check the surfaces that work without a
//! profile service: help, version, and configuration validation.

use assert_cmd::Command;
use predicates::prelude::*;

fn bridge_cmd() -> Command {
    Command::cargo_bin("profilebridge").expect("Failed to find profilebridge binary")
}

#[test]
fn test_version_flag() {
    bridge_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("profilebridge"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_flag() {
    bridge_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "MCP bridge for batched browser-profile lifecycle management",
        ))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn test_missing_configuration_fails_with_named_variable() {
    bridge_cmd()
        .arg("check")
        .env_remove("PROFILE_API_URL")
        .env_remove("PROFILE_API_KEY")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("PROFILE_API_URL"));
}

#[test]
fn test_missing_api_key_is_named() {
    bridge_cmd()
        .arg("check")
        .env("PROFILE_API_URL", "http://127.0.0.1:54345")
        .env_remove("PROFILE_API_KEY")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("PROFILE_API_KEY"));
}

#[test]
fn test_check_against_unreachable_service_renders_classification() {
    // Port 9 on localhost refuses connections; the probe should come back
    // as a classified network failure, not a crash.
    bridge_cmd()
        .arg("--quiet")
        .arg("check")
        .env("PROFILE_API_URL", "http://127.0.0.1:9")
        .env("PROFILE_API_KEY", "test-key")
        .env("PROFILE_API_TIMEOUT_SECS", "2")
        .assert()
        .failure()
        .stdout(predicate::str::contains("**Error**"))
        .stdout(predicate::str::contains("Troubleshooting:"));
}
