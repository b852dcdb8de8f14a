//! Integration tests for the sql-safety-gateway binary.

use std::io::Write;

use assert_cmd::{Command, cargo::cargo_bin_cmd};
use predicates::prelude::*;
use tempfile::{NamedTempFile, TempDir};

/// Command isolated from any config file or variable on the host
fn cmd(home: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("sql-safety-gateway");
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env_remove("SQL_GATEWAY_BACKEND")
        .env_remove("SQL_GATEWAY_CONNECTION")
        .env_remove("SQL_GATEWAY_WHITELIST")
        .env_remove("SQL_GATEWAY_ROW_CAP")
        .env_remove("RUST_LOG");
    cmd
}

fn json_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

#[test]
fn test_check_success() {
    let home = TempDir::new().unwrap();
    cmd(&home)
        .args([
            "--whitelist",
            "safe_users_v",
            "--no-color",
            "check",
            "SELECT id, email FROM safe_users_v"
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "SELECT * FROM (SELECT id, email FROM safe_users_v) AS gateway_capped LIMIT 200"
        ));
}

#[test]
fn test_check_forbidden_relation() {
    let home = TempDir::new().unwrap();
    cmd(&home)
        .args(["--whitelist", "safe_users_v", "--no-color", "check", "SELECT * FROM secret_table"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("ForbiddenRelationError"))
        .stdout(predicate::str::contains("secret_table"));
}

#[test]
fn test_check_multiple_statements_json() {
    let home = TempDir::new().unwrap();
    cmd(&home)
        .args([
            "--whitelist",
            "users",
            "-f",
            "json",
            "check",
            "SELECT * FROM users; DROP TABLE users;"
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"kind\": \"MultipleStatementsError\""));
}

#[test]
fn test_check_reads_stdin() {
    let home = TempDir::new().unwrap();
    cmd(&home)
        .args(["--whitelist", "orders", "--no-color", "check", "-"])
        .write_stdin("SELECT * FROM orders LIMIT 5")
        .assert()
        .success()
        .stdout(predicate::str::contains("Row cap: not needed"));
}

#[test]
fn test_config_command_hides_connection() {
    let home = TempDir::new().unwrap();
    cmd(&home)
        .env("SQL_GATEWAY_CONNECTION", "postgres://reader:secret@db/app")
        .env("SQL_GATEWAY_WHITELIST", "orders,users")
        .args(["--backend", "postgres", "-f", "json", "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"backendType\": \"networked\""))
        .stdout(predicate::str::contains("\"rowCap\": 200"))
        .stdout(predicate::str::contains("secret").not());
}

#[test]
fn test_local_config_file() {
    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join(".sql-gateway.toml"),
        "whitelist = [\"orders\"]\nrow_cap = 7\n"
    )
    .unwrap();
    cmd(&home)
        .args(["--no-color", "check", "SELECT * FROM orders"])
        .assert()
        .success()
        .stdout(predicate::str::contains("LIMIT 7"));
}

#[test]
fn test_unsupported_backend() {
    let home = TempDir::new().unwrap();
    cmd(&home)
        .args(["--backend", "oracle", "config"])
        .assert()
        .failure();
}

#[test]
fn test_query_masks_snapshot_rows() {
    let home = TempDir::new().unwrap();
    let rows = json_file(r#"[{"id": 1, "email": "john.doe@example.com", "notes": "987-65-4321"}]"#);
    cmd(&home)
        .args([
            "--whitelist",
            "safe_users_v",
            "-f",
            "json",
            "query",
            "SELECT * FROM safe_users_v",
            "-r",
            rows.path().to_str().unwrap()
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("j***e@*******.com"))
        .stdout(predicate::str::contains("***-**-4321"))
        .stdout(predicate::str::contains("john.doe").not());
}

#[test]
fn test_mask_command() {
    let home = TempDir::new().unwrap();
    cmd(&home)
        .args(["--no-color", "mask", "-"])
        .write_stdin(r#"[{"phone": "555-123-4567"}]"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("phone=***-***-**67"));
}

#[test]
fn test_explain_degraded() {
    let home = TempDir::new().unwrap();
    cmd(&home)
        .args(["--whitelist", "orders", "--no-color", "explain", "SELECT * FROM orders"])
        .assert()
        .success()
        .stdout(predicate::str::contains("- Select\n  - Scan"));
}

#[test]
fn test_explain_with_plan_file() {
    let home = TempDir::new().unwrap();
    let plan = json_file(
        r#"[{"id": 2, "parent": 0, "notused": 0, "detail": "SEARCH orders USING INDEX idx_total (total>?)"}]"#
    );
    cmd(&home)
        .args([
            "--whitelist",
            "orders",
            "--no-color",
            "explain",
            "SELECT * FROM orders WHERE total > 500",
            "-p",
            plan.path().to_str().unwrap()
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("- Search"))
        .stdout(predicate::str::contains("idx_total").not());
}

#[test]
fn test_missing_rows_file() {
    let home = TempDir::new().unwrap();
    cmd(&home)
        .args(["--whitelist", "orders", "query", "SELECT * FROM orders", "-r", "/nonexistent/rows.json"])
        .assert()
        .failure();
}
