//! DDL rendering

use ledgerx_core::mapping::{EntityDescriptor, MappingModel};
use sha2::{Digest, Sha256};

use crate::errors::Result;

/// CREATE TABLE statement for one mapped entity
///
/// # Errors
///
/// `MissingMapping` when the entity's parent is not part of `model`.
pub fn create_table_sql(
    model: &MappingModel,
    entity: &EntityDescriptor,
    if_not_exists: bool,
) -> Result<String> {
    let mut lines = Vec::with_capacity(entity.columns.len() + 1);

    match entity.parent {
        None => lines.push(format!("    {} INTEGER PRIMARY KEY", entity.id_column)),
        Some(parent) => {
            let parent = model.require(parent)?;
            lines.push(format!(
                "    {} INTEGER PRIMARY KEY REFERENCES {}({}) ON DELETE CASCADE",
                entity.id_column, parent.table, parent.id_column
            ));
        }
    }

    for column in entity.columns {
        let null = if column.nullable { "" } else { " NOT NULL" };
        lines.push(format!("    {} {}{}", column.name, column.ty.sql_type(), null));
    }

    Ok(format!(
        "CREATE TABLE {}{} (\n{}\n)",
        if if_not_exists { "IF NOT EXISTS " } else { "" },
        entity.table,
        lines.join(",\n")
    ))
}

pub fn drop_table_sql(entity: &EntityDescriptor) -> String {
    format!("DROP TABLE IF EXISTS {}", entity.table)
}

/// Every CREATE statement of the model, parents before children
///
/// # Errors
///
/// Propagates [`create_table_sql`] failures.
pub fn render_ddl(model: &MappingModel) -> Result<String> {
    let mut out = String::new();
    for entity in model.tables_in_creation_order() {
        out.push_str(&create_table_sql(model, entity, false)?);
        out.push_str(";\n");
    }
    Ok(out)
}

/// SHA-256 of [`render_ddl`], hex encoded
///
/// # Errors
///
/// Propagates [`render_ddl`] failures.
pub fn fingerprint(model: &MappingModel) -> Result<String> {
    let ddl = render_ddl(model)?;
    let mut hasher = Sha256::new();
    hasher.update(ddl.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}
