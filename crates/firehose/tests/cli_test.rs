//! End-to-end tests for the firehose binary

use std::io::Write;
use std::process::Command;

fn firehose() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_firehose"));
    cmd.env_remove("FIREHOSE_CONFIG");
    cmd
}

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_check_prints_effective_config() {
    let file = config_file("[history]\ncapacity = 7\n");

    let output = firehose()
        .args(["check", "--config"])
        .arg(file.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("capacity = 7"));
    assert!(stdout.contains("queue_capacity = 256"));
}

#[test]
fn test_check_rejects_invalid_config() {
    let file = config_file("[stream]\nqueue_capacity = 0\n");

    let output = firehose()
        .args(["check", "--config"])
        .arg(file.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("queue_capacity"));
}

#[test]
fn test_check_missing_file() {
    let dir = tempfile::tempdir().unwrap();

    let output = firehose()
        .args(["check", "--config"])
        .arg(dir.path().join("absent.toml"))
        .output()
        .unwrap();

    assert!(!output.status.success());
}

#[test]
fn test_config_from_env() {
    let file = config_file("[history]\ncapacity = 9\n");

    let output = firehose()
        .env("FIREHOSE_CONFIG", file.path())
        .arg("check")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("capacity = 9"));
}

#[test]
fn test_smoke_passes() {
    let file = config_file("[log]\nlevel = \"warn\"\n\n[history]\ncapacity = 1\n");

    let output = firehose()
        .args(["smoke", "--timeout-ms", "1000", "--config"])
        .arg(file.path())
        .output()
        .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "{stdout}");
    assert!(stdout.contains("[PASS] recent logs"));
    assert!(stdout.contains("[PASS] http on firehose by origin"));
    assert!(!stdout.contains("[FAIL]"));
}
