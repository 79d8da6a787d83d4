#![allow(clippy::unwrap_used, clippy::expect_used)]

// Single test in its own binary: the capture is process-global and this test
// counts events that carry no per-test identifier.

mod common;

use common::file_settings;
use ledgerx_core::logging_facility::test_capture::init_test_capture;
use ledgerx_core_types::schema::{EVENT_END, EVENT_END_ERROR};
use ledgerx_store::config::SchemaGeneration;
use ledgerx_store::provider::SessionProvider;
use tempfile::TempDir;

#[test]
fn test_failed_build_logs_error_and_destroys_registry() {
    let capture = init_test_capture();
    let dir = TempDir::new().unwrap();
    let provider = SessionProvider::new(file_settings(
        &dir.path().join("empty.db"),
        SchemaGeneration::Validate,
    ));

    assert!(provider.get_factory().is_err());

    let errors: Vec<_> = capture
        .events()
        .into_iter()
        .filter(|e| e.op.as_deref() == Some("get_factory"))
        .filter(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].fields.get("err_code"),
        Some(&"ERR_SCHEMA_MISMATCH".to_string())
    );
    assert_eq!(errors[0].level, tracing::Level::ERROR);

    capture.assert_event_exists("registry_build", EVENT_END);
    capture.assert_event_exists("registry_destroy", EVENT_END);
    assert_eq!(
        capture.count_events(|e| {
            e.op.as_deref() == Some("registry_destroy") && e.event.as_deref() == Some(EVENT_END)
        }),
        1
    );
}
