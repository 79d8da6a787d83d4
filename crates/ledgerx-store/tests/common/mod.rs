#![allow(dead_code)]

use std::path::Path;

use ledgerx_store::config::{SchemaGeneration, Settings};
use rusqlite::Connection;

pub fn memory_settings(mode: SchemaGeneration) -> Settings {
    Settings::builder()
        .driver("sqlite")
        .url("sqlite::memory:")
        .username("root")
        .password("root")
        .schema_generation(mode)
        .build()
        .expect("valid in-memory settings")
}

pub fn file_settings(path: &Path, mode: SchemaGeneration) -> Settings {
    Settings::builder()
        .driver("org.sqlite.JDBC")
        .url(format!("sqlite://{}", path.display()))
        .schema_generation(mode)
        .build()
        .expect("valid file settings")
}

pub fn table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap()
}

pub fn row_count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })
    .unwrap()
}
