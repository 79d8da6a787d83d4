pub mod accounts;
pub mod demo;
pub mod schema;

use ledgerx_core::AnyAccount;
use ledgerx_store::config::{SchemaGeneration, Settings};
use ledgerx_store::db::ConnectionTarget;

/// Settings for `--db`, or from `LEDGERX__*` variables when it is absent
///
/// The schema-generation mode is always the one the command needs.
pub fn resolve_settings(
    db: Option<String>,
    show_sql: bool,
    mode: SchemaGeneration,
) -> Result<Settings, Box<dyn std::error::Error>> {
    let settings = match db {
        Some(url) => Settings::builder()
            .driver("sqlite")
            .url(url)
            .show_sql(show_sql)
            .build()?,
        None => {
            let loaded = Settings::load()?;
            Settings {
                show_sql: show_sql || loaded.show_sql,
                ..loaded
            }
        }
    };

    Ok(Settings {
        schema_generation: mode,
        ..settings
    })
}

/// File URLs without an explicit `mode` open read-write, never creating
/// the database
pub fn existing_only(url: &str) -> String {
    let url = url.trim();
    match ConnectionTarget::parse(url) {
        Ok(ConnectionTarget::File { .. }) if !url.contains("mode=") => {
            let separator = if url.contains('?') { '&' } else { '?' };
            format!("{}{}mode=rw", url, separator)
        }
        _ => url.to_string(),
    }
}

/// One line per account, tagged with its concrete kind
pub fn describe(account: &AnyAccount) -> String {
    let base = account.account();
    let id = base.id.map(|id| id.to_string()).unwrap_or_else(|| "-".into());
    let detail = match account {
        AnyAccount::Plain(_) => String::new(),
        AnyAccount::Credit(c) => format!(" credit_limit={:.2}", c.credit_limit),
        AnyAccount::Debit(d) => format!(" overdraft_fee={:.2}", d.overdraft_fee),
    };
    format!(
        "#{} {:<13} owner={} balance={:.2} interest_rate={:.4}{}",
        id,
        account.kind().entity_name(),
        base.owner,
        base.balance,
        base.interest_rate,
        detail
    )
}
