//! Argument handling and early failures of the `dockhand` binary.

#![allow(clippy::expect_used)]

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn dockhand() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("dockhand"));
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Binary confined to `root`: its own home and project directory, and a
/// `PATH` with no executables so `docker` cannot be found.
fn isolated(root: &Path) -> Command {
    let empty_bin = root.join("bin");
    let home = root.join("home");
    let project = root.join("project");
    for dir in [&empty_bin, &home, &project] {
        std::fs::create_dir_all(dir).expect("mkdir");
    }
    let mut cmd = dockhand();
    cmd.current_dir(&project)
        .env("PATH", &empty_bin)
        .env("HOME", &home)
        .env("DOCKHAND_PROJECT_DIR", &project)
        .env_remove("DOCKHAND_CONFIG_DIR")
        .env_remove("DOCKHAND_WORKSPACE_DIR")
        .env_remove("DOCKHAND_GATEWAY_PORT")
        .env_remove("DOCKHAND_BRIDGE_PORT");
    cmd
}

// --- Help and version ---

#[test]
fn test_help_lists_mode_flags() {
    dockhand()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--build-only"))
        .stdout(predicate::str::contains("--run-only"));
}

#[test]
fn test_version_flag_shows_version() {
    dockhand()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

// --- Argument errors ---

#[test]
fn test_unknown_flag_exits_2() {
    dockhand()
        .arg("--frobnicate")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--frobnicate"));
}

#[test]
fn test_conflicting_modes_exit_2_without_side_effects() {
    let dir = tempfile::tempdir().expect("tempdir");
    isolated(dir.path())
        .args(["-b", "-r"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot be used with"));

    assert!(!dir.path().join("project").join(".env").exists());
    assert!(!dir.path().join("home").join(".dockhand").exists());
}

#[test]
fn test_conflicting_long_flags_exit_2() {
    let dir = tempfile::tempdir().expect("tempdir");
    isolated(dir.path())
        .args(["--run-only", "--build-only"])
        .assert()
        .code(2);
}

// --- Environment failures ---

#[test]
fn test_missing_docker_exits_1_and_writes_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    isolated(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Missing dependency"))
        .stderr(predicate::str::contains("docker"));

    assert!(!dir.path().join("project").join(".env").exists());
    assert!(!dir.path().join("home").join(".dockhand").exists());
}

#[test]
fn test_invalid_port_is_rejected_before_docker_probe() {
    let dir = tempfile::tempdir().expect("tempdir");
    isolated(dir.path())
        .env("DOCKHAND_GATEWAY_PORT", "not-a-port")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("DOCKHAND_GATEWAY_PORT"))
        .stderr(predicate::str::contains("Missing dependency").not());
}
