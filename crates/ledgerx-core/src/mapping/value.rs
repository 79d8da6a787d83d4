use std::collections::BTreeMap;

use crate::errors::{LedgerXError, Result};

/// A column value as it crosses the mapping boundary
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Flattened state of one entity across every table of its chain
///
/// The identifier is kept apart from the column values because it is shared
/// by all tables of the chain, whatever each table names its key column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    id: Option<i64>,
    values: BTreeMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(id: Option<i64>) -> Self {
        Self {
            id,
            values: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    /// Set a column value, builder style
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Identifier, or `MissingId` naming the entity being rebuilt
    pub fn require_id(&self, entity: &str) -> Result<i64> {
        self.id.ok_or_else(|| LedgerXError::MissingId {
            entity: entity.to_string(),
        })
    }

    pub fn require_text(&self, entity: &str, column: &str) -> Result<String> {
        match self.require(entity, column)? {
            Value::Text(s) => Ok(s.clone()),
            _ => Err(type_error(entity, column, "text")),
        }
    }

    /// Real value; integral storage is widened since SQLite may hand back
    /// whole numbers as integers.
    pub fn require_f64(&self, entity: &str, column: &str) -> Result<f64> {
        match self.require(entity, column)? {
            Value::Real(f) => Ok(*f),
            Value::Integer(i) => Ok(*i as f64),
            _ => Err(type_error(entity, column, "a real number")),
        }
    }

    fn require(&self, entity: &str, column: &str) -> Result<&Value> {
        match self.values.get(column) {
            None | Some(Value::Null) => Err(LedgerXError::MissingColumn {
                entity: entity.to_string(),
                column: column.to_string(),
            }),
            Some(v) => Ok(v),
        }
    }
}

fn type_error(entity: &str, column: &str, expected: &str) -> LedgerXError {
    LedgerXError::ColumnType {
        entity: entity.to_string(),
        column: column.to_string(),
        expected: expected.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_accessors() {
        let row = Row::with_id(Some(3))
            .with("owner", "ada")
            .with("balance", 12.5)
            .with("visits", 4_i64);

        assert_eq!(row.require_id("Account"), Ok(3));
        assert_eq!(row.require_text("Account", "owner").unwrap(), "ada");
        assert_eq!(row.require_f64("Account", "balance").unwrap(), 12.5);
        assert_eq!(row.get("visits"), Some(&Value::Integer(4)));
        assert_eq!(row.len(), 3);
    }

    #[test]
    fn test_integral_real_is_widened() {
        let row = Row::new().with("balance", 100_i64);
        assert_eq!(row.require_f64("Account", "balance").unwrap(), 100.0);
    }

    #[test]
    fn test_null_counts_as_missing() {
        let row = Row::new().with("owner", Value::Null);
        assert!(matches!(
            row.require_text("Account", "owner"),
            Err(LedgerXError::MissingColumn { .. })
        ));
        assert!(row.get("owner").is_some_and(Value::is_null));
    }

    #[test]
    fn test_wrong_type_is_reported() {
        let row = Row::new().with("owner", 1_i64);
        let err = row.require_text("Account", "owner").unwrap_err();
        assert_eq!(
            err,
            LedgerXError::ColumnType {
                entity: "Account".to_string(),
                column: "owner".to_string(),
                expected: "text".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_id() {
        let row = Row::new();
        assert!(matches!(
            row.require_id("DebitAccount"),
            Err(LedgerXError::MissingId { .. })
        ));
    }
}
