//! Executed-statement logging
//!
//! When show-SQL is on, every statement is emitted at INFO under the
//! `ledgerx::sql` target, tagged with the scope that ran it (a session id,
//! or `schema` for schema generation).

use ledgerx_core_types::schema::SQL_LOG_TARGET;

pub(crate) const SCHEMA_SCOPE: &str = "schema";

pub(crate) fn statement(enabled: bool, scope: &str, sql: &str) {
    if enabled {
        tracing::info!(target: SQL_LOG_TARGET, scope = scope, sql = sql);
    }
}
