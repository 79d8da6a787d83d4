//! Canonical operation logging macros
//!
//! Every operation logs a `start` event, then exactly one of `end` or
//! `end_error`. Extra `key = value` fields are passed through to `tracing`.
//! The macros reach `tracing` through this crate, so callers only need
//! `ledgerx-core` as a dependency.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use ledgerx_core::log_op_start;
/// log_op_start!("get_factory");
/// log_op_start!("persist", entity = "CreditAccount");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        $crate::tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::ledgerx_core_types::schema::EVENT_START,
            $($($field)*)?
        )
    };
}

/// Log the successful end of an operation
///
/// `duration_ms` is required.
///
/// # Example
///
/// ```
/// # use ledgerx_core::log_op_end;
/// log_op_end!("get_factory", duration_ms = 42);
/// log_op_end!("persist", duration_ms = 3, entity = "DebitAccount");
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        $crate::tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::ledgerx_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($($field)*)?
        )
    };
}

/// Log an operation failure at ERROR level
///
/// Accepts anything convertible into `ExError`. Besides kind, code and
/// message, the entity, table and row id carried by the error are recorded
/// when present.
///
/// # Example
///
/// ```
/// # use ledgerx_core::{log_op_error, errors::LedgerXError};
/// let err = LedgerXError::UnmappedEntity { entity: "Loan".to_string() };
/// log_op_error!("find", err, duration_ms = 3);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::ledgerx_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            err_message = %ex_err,
            err_entity = ex_err.entity(),
            err_table = ex_err.table(),
            err_entity_id = ex_err.entity_id(),
            $($($field)*)?
        );
    }};
}
