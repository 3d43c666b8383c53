use assert_cmd::Command;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

fn sqlbind() -> Command {
    Command::cargo_bin("sqlbind").unwrap()
}

#[test]
fn test_table_query_prints_json() {
    let output = sqlbind()
        .args([":memory:", "SELECT {0} AS n, {1} AS name", "5", "Ann"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["n"], 5);
    assert_eq!(json[0]["name"], "Ann");
}

#[test]
fn test_scalar_and_full_precision_modes() {
    sqlbind()
        .args(["--scalar", ":memory:", "SELECT {0} * 2", "21"])
        .assert()
        .success()
        .stdout("42\n");

    sqlbind()
        .args(["--full", ":memory:", "SELECT 1 WHERE 0"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_driver_error_exit_code() {
    let output = sqlbind()
        .args([":memory:", "SELECT * FROM missing"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no such table"), "stderr: {}", stderr);
}

#[test]
fn test_usage_error_exit_code() {
    let output = sqlbind().arg(":memory:").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("usage"));
}

#[test]
fn test_connection_string_from_config() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("cfg.db");

    let mut config = NamedTempFile::new().unwrap();
    writeln!(
        config,
        "[connection]\nstring = \"Data Source={}\"\n\n[logging]\nlevel = \"warn\"\nlog_statements = true",
        db.display()
    )
    .unwrap();
    let config_path = config.path().to_str().unwrap().to_string();

    sqlbind()
        .args(["--config", &config_path, "--exec", "-", "CREATE TABLE t (v TEXT)"])
        .assert()
        .success();
    sqlbind()
        .args(["--config", &config_path, "--exec", "-", "INSERT INTO t VALUES ({0})", "hello"])
        .assert()
        .success();
    sqlbind()
        .args(["--config", &config_path, "--scalar", "-", "SELECT v FROM t"])
        .assert()
        .success()
        .stdout("hello\n");
}

#[test]
fn test_invalid_log_level_is_config_error() {
    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, "[logging]\nlevel = \"loud\"").unwrap();

    let output = sqlbind()
        .args(["--config", config.path().to_str().unwrap(), ":memory:", "SELECT 1"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_missing_configured_connection_string_is_config_error() {
    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, "[logging]\nlevel = \"warn\"").unwrap();

    let output = sqlbind()
        .args(["--config", config.path().to_str().unwrap(), "-", "SELECT 1"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Connection string is not set"));
}
