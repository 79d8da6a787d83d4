//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_FACTORY_ID: &str = "factory_id";
pub const FIELD_SESSION_ID: &str = "session_id";

// Mapping identifiers
pub const FIELD_ENTITY: &str = "entity";
pub const FIELD_TABLE: &str = "table";
pub const FIELD_ENTITY_ID: &str = "entity_id";

// Statement logging
pub const FIELD_SQL: &str = "sql";
/// Target used for executed-statement events when show-SQL is enabled
pub const SQL_LOG_TARGET: &str = "ledgerx::sql";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_accessibility() {
        assert!(!FIELD_COMPONENT.is_empty());
        assert!(!FIELD_OP.is_empty());
        assert!(!EVENT_START.is_empty());
        assert!(!EVENT_END.is_empty());
        assert!(!EVENT_END_ERROR.is_empty());
    }

    #[test]
    fn test_event_names_are_distinct() {
        assert_ne!(EVENT_START, EVENT_END);
        assert_ne!(EVENT_START, EVENT_END_ERROR);
        assert_ne!(EVENT_END, EVENT_END_ERROR);
    }

    #[test]
    fn test_sql_target_under_crate_prefix() {
        // The default env filter is keyed on "ledgerx"
        assert!(SQL_LOG_TARGET.starts_with("ledgerx"));
    }
}
