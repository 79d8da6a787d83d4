use ledgerx_core::errors::{ExError, ExErrorKind, LedgerXError};

#[test]
fn test_unknown_parent_maps_to_missing_mapping() {
    let err = LedgerXError::UnknownParent {
        entity: "CreditAccount".to_string(),
        parent: "Account".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::MissingMapping);
    assert_eq!(ex_err.code(), "ERR_MISSING_MAPPING");
    assert_eq!(ex_err.entity(), Some("CreditAccount"));
    assert!(ex_err.message().contains("unregistered entity Account"));
}

#[test]
fn test_duplicate_table_carries_table_context() {
    let err = LedgerXError::DuplicateTable {
        table: "account".to_string(),
        first: "Account".to_string(),
        second: "LegacyAccount".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::DuplicateMapping);
    assert_eq!(ex_err.table(), Some("account"));
    assert_eq!(ex_err.entity(), Some("LegacyAccount"));
}

#[test]
fn test_ambiguous_concrete_type_is_invariant_violation() {
    let err = LedgerXError::AmbiguousConcreteType {
        entity: "Account".to_string(),
        id: 12,
        candidates: vec!["CreditAccount".to_string(), "DebitAccount".to_string()],
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::InvariantViolation);
    assert_eq!(ex_err.entity_id(), Some(12));
    assert!(ex_err.message().contains("CreditAccount"));
}

#[test]
fn test_row_conversion_errors_are_serialization() {
    for err in [
        LedgerXError::MissingColumn {
            entity: "DebitAccount".to_string(),
            column: "overdraft_fee".to_string(),
        },
        LedgerXError::ColumnType {
            entity: "DebitAccount".to_string(),
            column: "overdraft_fee".to_string(),
            expected: "a real number".to_string(),
        },
    ] {
        let ex_err: ExError = err.into();
        assert_eq!(ex_err.kind(), ExErrorKind::Serialization);
        assert_eq!(ex_err.entity(), Some("DebitAccount"));
    }
}

#[test]
fn test_error_kind_code_mapping() {
    // Test that each kind has a stable, unique code
    let kinds = vec![
        (ExErrorKind::InvalidInput, "ERR_INVALID_INPUT"),
        (ExErrorKind::NotFound, "ERR_NOT_FOUND"),
        (ExErrorKind::DuplicateMapping, "ERR_DUPLICATE_MAPPING"),
        (ExErrorKind::MissingMapping, "ERR_MISSING_MAPPING"),
        (ExErrorKind::CycleDetected, "ERR_CYCLE_DETECTED"),
        (ExErrorKind::Persistence, "ERR_PERSISTENCE"),
    ];

    let mut seen = std::collections::HashSet::new();
    for (kind, expected_code) in kinds {
        assert_eq!(kind.code(), expected_code);
        assert!(seen.insert(kind.code()), "code reused: {}", kind.code());
    }
}
