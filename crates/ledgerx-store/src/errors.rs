//! Error handling for ledgerx-store
//!
//! Wraps ledgerx-core ExError with store-specific helpers

use ledgerx_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create a connectivity error for a target that could not be opened
pub fn connectivity_error(target: &str, err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Connectivity)
        .with_op("connect")
        .with_message(format!("Unable to open {}: {}", target, err))
}

/// Create an error for use of a released registry
pub fn registry_destroyed(op: &str) -> ExError {
    ExError::new(ExErrorKind::RegistryDestroyed)
        .with_op(op.to_string())
        .with_message("Service registry has been destroyed")
}

/// Create a schema validation error
pub fn schema_mismatch(table: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::SchemaMismatch)
        .with_op("schema_validate")
        .with_table(table)
        .with_message(reason.to_string())
}

/// Create a not-found error for an entity row
pub fn row_not_found(op: &str, entity: &str, id: i64) -> ExError {
    ExError::new(ExErrorKind::NotFound)
        .with_op(op.to_string())
        .with_entity(entity)
        .with_entity_id(id)
        .with_message(format!("No {} row with id {}", entity, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rusqlite_is_persistence() {
        let err = from_rusqlite(rusqlite::Error::QueryReturnedNoRows);
        assert_eq!(err.kind(), ExErrorKind::Persistence);
        assert_eq!(err.op(), Some("sqlite"));
    }

    #[test]
    fn test_row_not_found_context() {
        let err = row_not_found("update", "CreditAccount", 4);
        assert_eq!(err.kind(), ExErrorKind::NotFound);
        assert_eq!(err.entity(), Some("CreditAccount"));
        assert_eq!(err.entity_id(), Some(4));
    }
}
