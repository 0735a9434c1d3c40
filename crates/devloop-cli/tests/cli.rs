//! End-to-end tests for the `devloop` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn devloop() -> Command {
    let mut cmd = Command::cargo_bin("devloop").unwrap();
    cmd.env("NO_COLOR", "1");
    cmd
}

fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("demo")).unwrap();
    fs::write(
        temp.path().join("demo/index.html"),
        "<html><body></body></html>",
    )
    .unwrap();
    temp
}

#[test]
fn test_help_lists_commands() {
    devloop()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("dev"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn test_check_skip_tools_passes() {
    let temp = project();

    devloop()
        .args(["check", "--skip-tools", "--cwd"])
        .arg(temp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("All checks passed!"));
}

#[test]
fn test_check_reports_missing_watch_roots() {
    let temp = project();

    devloop()
        .args(["check", "--skip-tools", "--cwd"])
        .arg(temp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("does not exist, not watched"));
}

#[test]
fn test_check_missing_entry_fails() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("demo")).unwrap();

    devloop()
        .args(["check", "--skip-tools", "--cwd"])
        .arg(temp.path())
        .assert()
        .failure();
}

#[test]
fn test_check_reads_config_file() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("public")).unwrap();
    fs::write(temp.path().join("public/app.html"), "<html></html>").unwrap();
    fs::write(
        temp.path().join("devloop.toml"),
        "[site]\ndir = \"public\"\nentry = \"app.html\"\n",
    )
    .unwrap();

    devloop()
        .args(["check", "--skip-tools", "--cwd"])
        .arg(temp.path())
        .assert()
        .success();
}

#[test]
fn test_check_missing_explicit_config_fails() {
    let temp = project();

    devloop()
        .args(["check", "--skip-tools", "--config", "nope.toml", "--cwd"])
        .arg(temp.path())
        .assert()
        .failure();
}
