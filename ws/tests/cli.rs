// CLI tests that exercise input validation; none of them reach AWS.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn ws(log_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ws").expect("ws binary should build");
    cmd.env("WS_LOG_DIR", log_dir.path())
        .env_remove("RUST_LOG")
        .env_remove("LOG_FORMAT");
    cmd
}

fn log_files(log_dir: &TempDir) -> Vec<String> {
    fs::read_dir(log_dir.path())
        .expect("log dir should exist")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect()
}

#[test]
fn test_start_without_targets_exits_3() {
    let logs = TempDir::new().unwrap();
    ws(&logs)
        .args(["--action", "start"])
        .assert()
        .code(3)
        .stdout(predicate::str::contains(
            "You must provide at least one workspace target",
        ));
}

#[test]
fn test_missing_file_exits_3() {
    let logs = TempDir::new().unwrap();
    let missing = logs.path().join("does-not-exist.txt");
    ws(&logs)
        .args(["--action", "status", "--file"])
        .arg(&missing)
        .assert()
        .code(3)
        .stdout(predicate::str::contains("File not found"));
}

#[test]
fn test_each_run_writes_its_own_log_file() {
    let logs = TempDir::new().unwrap();
    ws(&logs).args(["--action", "stop"]).assert().code(3);

    let files = log_files(&logs);
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("-workspace-stop.log"));
    let contents = fs::read_to_string(logs.path().join(&files[0])).unwrap();
    assert!(contents.contains("| ERROR | You must provide at least one workspace target"));
}

#[test]
fn test_unknown_action_is_rejected() {
    let logs = TempDir::new().unwrap();
    ws(&logs)
        .args(["--action", "reboot"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'reboot'"));
}

#[test]
fn test_help_lists_actions() {
    let logs = TempDir::new().unwrap();
    ws(&logs)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--include-tags"))
        .stdout(predicate::str::contains("--max-tag-lookups"));
}
