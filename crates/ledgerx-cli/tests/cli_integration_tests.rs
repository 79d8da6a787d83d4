//! CLI integration tests
//!
//! Run the built binary end to end against in-memory and on-disk stores.

use rusqlite::Connection;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn ledgerx(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ledgerx-cli"))
        .args(args)
        .env_remove("LEDGERX__URL")
        .env_remove("LEDGERX__DRIVER")
        .output()
        .expect("Failed to execute CLI")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn file_url(path: &Path) -> String {
    format!("sqlite://{}", path.display())
}

#[test]
fn test_schema_prints_three_tables() {
    let output = ledgerx(&["schema"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let ddl = stdout(&output);
    assert_eq!(ddl.matches("CREATE TABLE").count(), 3);
    assert!(ddl.contains("REFERENCES account(id) ON DELETE CASCADE"));

    let fingerprint = ledgerx(&["schema", "--fingerprint"]);
    let digest = stdout(&fingerprint).trim().to_string();
    assert_eq!(digest.len(), 64);
    assert!(ddl.starts_with(&format!("-- fingerprint: {}", digest)));
}

#[test]
fn test_demo_in_memory_json() {
    let output = ledgerx(&["demo", "--db", "sqlite::memory:", "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["accounts"].as_array().unwrap().len(), 3);
    assert_eq!(report["credit_accounts"].as_array().unwrap().len(), 1);
    assert_eq!(report["debit_accounts"].as_array().unwrap().len(), 1);

    let kinds: Vec<&str> = report["polymorphic"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["plain", "credit", "debit"]);
}

#[test]
fn test_demo_human_output_lists_every_kind() {
    let output = ledgerx(&["demo", "--db", "sqlite::memory:"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let text = stdout(&output);
    assert!(text.contains("Polymorphic (3):"));
    assert!(text.contains("CreditAccount"));
    assert!(text.contains("credit_limit=500.00"));
    assert!(text.contains("overdraft_fee=25.00"));
}

#[test]
fn test_demo_then_accounts_on_file_store() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("ledger.db");
    let url = file_url(&db);

    let demo = ledgerx(&["demo", "--db", &url]);
    assert!(demo.status.success(), "stderr: {}", stderr(&demo));

    let conn = Connection::open(&db).unwrap();
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM account", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 3);
    drop(conn);

    let credit = ledgerx(&["accounts", "--db", &url, "--kind", "credit", "--json"]);
    assert!(credit.status.success(), "stderr: {}", stderr(&credit));
    let listed: serde_json::Value = serde_json::from_str(&stdout(&credit)).unwrap();
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["kind"], "credit");
    assert_eq!(listed[0]["owner"], "Bob");
}

#[test]
fn test_accounts_on_empty_store_fails_validation() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("empty.db");
    drop(Connection::open(&db).unwrap());

    let output = ledgerx(&["accounts", "--db", &file_url(&db)]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Error: [ERR_SCHEMA_MISMATCH]"));
}

#[test]
fn test_accounts_never_creates_missing_database() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("missing.db");

    let output = ledgerx(&["accounts", "--db", &file_url(&db)]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Error: [ERR_CONNECTIVITY]"));
    assert!(!db.exists());

    let bare = ledgerx(&["accounts", "--db", &format!("sqlite:{}", db.display())]);
    assert!(!bare.status.success());
    assert!(!db.exists());
}

#[test]
fn test_foreign_url_is_rejected() {
    let output = ledgerx(&["demo", "--db", "jdbc:mysql://localhost:3306/sakila"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Error: Invalid connection URL"));
}

#[test]
fn test_json_log_format_keeps_stdout_clean() {
    let output = ledgerx(&[
        "--log-format",
        "json",
        "demo",
        "--db",
        "sqlite::memory:",
        "--json",
        "--show-sql",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    assert!(serde_json::from_str::<serde_json::Value>(&stdout(&output)).is_ok());
    assert!(stderr(&output).contains("ledgerx::sql"));
}
