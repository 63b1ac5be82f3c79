//! Integration tests for the framesmith binary
//!
//! Only paths that never reach an external tool are exercised here: argument
//! handling and the early organization check.

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn framesmith(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_framesmith"))
        .args(args)
        .env("FRAMESMITH_ROOT", root)
        .env_remove("RUST_LOG")
        .env_remove("FRAMESMITH_LOG_LEVEL")
        .env_remove("FRAMESMITH_VERSION")
        .env_remove("FRAMESMITH_MAX_ATTEMPTS")
        .env_remove("FRAMESMITH_INITIAL_BACKOFF_MS")
        .output()
        .expect("Failed to execute framesmith")
}

#[test]
fn test_help_command() {
    let root = TempDir::new().unwrap();
    let output = framesmith(root.path(), &["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ORGANIZATION"));
    assert!(stdout.contains("FRAMESMITH_ROOT"));
}

#[test]
fn test_version_command() {
    let root = TempDir::new().unwrap();
    let output = framesmith(root.path(), &["--version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("framesmith"));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_organization_exits_1() {
    let root = TempDir::new().unwrap();
    let output = framesmith(root.path(), &[]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ORGANIZATION"), "stderr: {}", stderr);
}

#[test]
fn test_extra_arguments_exit_1() {
    let root = TempDir::new().unwrap();
    let output = framesmith(root.path(), &["Google", "Netflix"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(!root.path().join("GOOGLE_enterprise_framework").exists());
}

#[test]
fn test_unsupported_organization_exits_1_without_tree() {
    let root = TempDir::new().unwrap();
    let output = framesmith(root.path(), &["Nonexistent"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Nonexistent"), "stderr: {}", stderr);
    assert!(!root.path().join("NONEXISTENT_enterprise_framework").exists());
    assert!(!root.path().join("artifacts").exists());

    let log = std::fs::read_to_string(root.path().join("framesmith_v1.0.0.log")).unwrap();
    assert!(log.contains("Unsupported organization: Nonexistent"));
}

#[test]
fn test_path_unsafe_organization_exits_1() {
    let root = TempDir::new().unwrap();
    let output = framesmith(root.path(), &["../etc"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid organization name"), "stderr: {}", stderr);
}

#[test]
fn test_malformed_retry_setting_exits_1() {
    let root = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_framesmith"))
        .arg("Google")
        .env("FRAMESMITH_ROOT", root.path())
        .env("FRAMESMITH_MAX_ATTEMPTS", "three")
        .env_remove("FRAMESMITH_VERSION")
        .env_remove("RUST_LOG")
        .env_remove("FRAMESMITH_LOG_LEVEL")
        .output()
        .expect("Failed to execute framesmith");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("FRAMESMITH_MAX_ATTEMPTS"));
    assert!(!root.path().join("GOOGLE_enterprise_framework").exists());

    let log = std::fs::read_to_string(root.path().join("framesmith_v1.0.0.log")).unwrap();
    assert!(log.contains("Invalid configuration"), "log: {}", log);
    assert!(log.contains("FRAMESMITH_MAX_ATTEMPTS"), "log: {}", log);
}
