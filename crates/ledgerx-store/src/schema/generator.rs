//! Applying a schema-generation mode to a live connection

use rusqlite::Connection;
use std::collections::BTreeSet;
use std::time::Instant;

use ledgerx_core::mapping::MappingModel;
use ledgerx_core::{log_op_end, log_op_error, log_op_start};

use super::ddl::{create_table_sql, drop_table_sql};
use crate::config::SchemaGeneration;
use crate::errors::{from_rusqlite, schema_mismatch, Result};
use crate::sql_log::{self, SCHEMA_SCOPE};

/// Bring the mapped tables in line with `mode`
///
/// `Create` and `CreateDrop` run in one transaction: leaf tables are dropped
/// first, then every table is created parents first.
///
/// # Errors
///
/// - `SchemaMismatch` when `Validate` finds a missing table or column
/// - `Persistence` when a statement fails
pub fn apply(
    conn: &mut Connection,
    model: &MappingModel,
    mode: SchemaGeneration,
    show_sql: bool,
) -> Result<()> {
    let start = Instant::now();
    log_op_start!("schema_generate", mode = mode.as_str());

    let result = match mode {
        SchemaGeneration::None => Ok(()),
        SchemaGeneration::Validate => validate(conn, model),
        SchemaGeneration::Update => create_all(conn, model, true, show_sql),
        SchemaGeneration::Create | SchemaGeneration::CreateDrop => {
            recreate_all(conn, model, show_sql)
        }
    };

    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(()) => log_op_end!(
            "schema_generate",
            duration_ms = duration_ms,
            mode = mode.as_str()
        ),
        Err(err) => log_op_error!(
            "schema_generate",
            err.clone(),
            duration_ms = duration_ms,
            mode = mode.as_str()
        ),
    }
    result
}

/// Drop every mapped table, children first
///
/// # Errors
///
/// `Persistence` when a DROP fails.
pub fn teardown(conn: &Connection, model: &MappingModel, show_sql: bool) -> Result<()> {
    for entity in model.tables_in_drop_order() {
        execute(conn, &drop_table_sql(entity), show_sql)?;
    }
    Ok(())
}

/// Check that every mapped table and column exists
///
/// # Errors
///
/// `SchemaMismatch` naming the first missing table or column.
pub fn validate(conn: &Connection, model: &MappingModel) -> Result<()> {
    for entity in model.tables_in_creation_order() {
        let existing = table_columns(conn, entity.table)?;
        if existing.is_empty() {
            return Err(schema_mismatch(entity.table, "table does not exist")
                .with_entity(entity.name));
        }

        let expected = std::iter::once(entity.id_column).chain(entity.columns.iter().map(|c| c.name));
        for column in expected {
            if !existing.contains(column) {
                return Err(schema_mismatch(
                    entity.table,
                    &format!("missing column {}", column),
                )
                .with_entity(entity.name));
            }
        }
    }
    Ok(())
}

fn recreate_all(conn: &mut Connection, model: &MappingModel, show_sql: bool) -> Result<()> {
    let tx = conn.transaction().map_err(from_rusqlite)?;
    teardown(&tx, model, show_sql)?;
    create_all(&tx, model, false, show_sql)?;
    tx.commit().map_err(from_rusqlite)
}

fn create_all(
    conn: &Connection,
    model: &MappingModel,
    if_not_exists: bool,
    show_sql: bool,
) -> Result<()> {
    for entity in model.tables_in_creation_order() {
        let sql = create_table_sql(model, entity, if_not_exists)?;
        execute(conn, &sql, show_sql)?;
    }
    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info(?1)")
        .map_err(from_rusqlite)?;
    let names = stmt
        .query_map([table], |row| row.get::<_, String>(0))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<BTreeSet<_>, _>>()
        .map_err(from_rusqlite)?;
    Ok(names)
}

fn execute(conn: &Connection, sql: &str, show_sql: bool) -> Result<()> {
    sql_log::statement(show_sql, SCHEMA_SCOPE, sql);
    conn.execute_batch(sql).map_err(from_rusqlite)
}
