//! Accounts command
//!
//! Usage: ledgerx accounts [--db <URL>] [--kind all|plain|credit|debit] [--json]
//!
//! Reads an existing store; the schema is validated, never changed, and a
//! missing database file is an error rather than created.

use clap::{Args, ValueEnum};

use ledgerx_core::{AccountKind, AnyAccount};
use ledgerx_store::config::SchemaGeneration;
use ledgerx_store::provider::SessionProvider;

use super::{describe, existing_only, resolve_settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindFilter {
    All,
    Plain,
    Credit,
    Debit,
}

impl KindFilter {
    fn matches(&self, kind: AccountKind) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Plain => kind == AccountKind::Plain,
            KindFilter::Credit => kind == AccountKind::Credit,
            KindFilter::Debit => kind == AccountKind::Debit,
        }
    }
}

#[derive(Debug, Args)]
pub struct AccountsArgs {
    /// Connection URL (default: LEDGERX__URL)
    #[arg(long)]
    pub db: Option<String>,

    /// Only show accounts of this concrete kind
    #[arg(long, value_enum, default_value_t = KindFilter::All)]
    pub kind: KindFilter,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute accounts command
pub fn execute(args: AccountsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = resolve_settings(args.db, false, SchemaGeneration::Validate)?;
    settings.url = existing_only(&settings.url);
    let provider = SessionProvider::new(settings);

    let listed = provider
        .get_factory()
        .and_then(|factory| factory.open_session())
        .and_then(|mut session| session.list_polymorphic::<AnyAccount>());
    provider.shutdown();

    let accounts: Vec<AnyAccount> = listed?
        .into_iter()
        .filter(|a| args.kind.matches(a.kind()))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&accounts)?);
    } else if accounts.is_empty() {
        println!("No accounts found");
    } else {
        for account in &accounts {
            println!("{}", describe(account));
        }
    }
    Ok(())
}
