//! Conversion between mapping values and SQLite values

use ledgerx_core::errors::{ExError, ExErrorKind};
use ledgerx_core::Value;
use rusqlite::types::{Value as SqlValue, ValueRef};

use crate::errors::Result;

pub(crate) fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(v) => SqlValue::Integer(*v),
        Value::Real(v) => SqlValue::Real(*v),
        Value::Text(v) => SqlValue::Text(v.clone()),
    }
}

pub(crate) fn from_sql(value: ValueRef<'_>) -> Result<Value> {
    match value {
        ValueRef::Null => Ok(Value::Null),
        ValueRef::Integer(v) => Ok(Value::Integer(v)),
        ValueRef::Real(v) => Ok(Value::Real(v)),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map(|s| Value::Text(s.to_string()))
            .map_err(|e| {
                ExError::new(ExErrorKind::Serialization)
                    .with_op("read_column")
                    .with_message(format!("column is not valid UTF-8: {}", e))
            }),
        ValueRef::Blob(_) => Err(ExError::new(ExErrorKind::Serialization)
            .with_op("read_column")
            .with_message("BLOB columns are not mapped")),
    }
}
