//! Demo command
//!
//! Usage: ledgerx demo [--db <URL>] [--show-sql] [--json]
//!
//! Always recreates the schema: the target store loses its account tables.

use clap::Args;
use serde::Serialize;

use ledgerx_core::{Account, AnyAccount, CreditAccount, DebitAccount};
use ledgerx_store::config::SchemaGeneration;
use ledgerx_store::provider::SessionProvider;

use super::{describe, resolve_settings};

#[derive(Debug, Args)]
pub struct DemoArgs {
    /// Connection URL (default: LEDGERX__URL, e.g. sqlite::memory:)
    #[arg(long)]
    pub db: Option<String>,

    /// Log every executed statement
    #[arg(long)]
    pub show_sql: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct DemoReport {
    accounts: Vec<Account>,
    credit_accounts: Vec<CreditAccount>,
    debit_accounts: Vec<DebitAccount>,
    polymorphic: Vec<AnyAccount>,
}

/// Execute demo command
pub fn execute(args: DemoArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = resolve_settings(args.db, args.show_sql, SchemaGeneration::Create)?;
    let provider = SessionProvider::new(settings);

    let report = run(&provider);
    provider.shutdown();
    let report = report?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Accounts ({}):", report.accounts.len());
    for account in &report.accounts {
        println!("  {}", describe(&AnyAccount::Plain(account.clone())));
    }
    println!("Credit accounts ({}):", report.credit_accounts.len());
    for account in &report.credit_accounts {
        println!("  {}", describe(&AnyAccount::Credit(account.clone())));
    }
    println!("Debit accounts ({}):", report.debit_accounts.len());
    for account in &report.debit_accounts {
        println!("  {}", describe(&AnyAccount::Debit(account.clone())));
    }
    println!("Polymorphic ({}):", report.polymorphic.len());
    for account in &report.polymorphic {
        println!("  {}", describe(account));
    }
    Ok(())
}

fn run(provider: &SessionProvider) -> Result<DemoReport, Box<dyn std::error::Error>> {
    let factory = provider.get_factory()?;
    let mut session = factory.open_session()?;

    let mut plain = Account::new("Alice", 120.0, 0.01);
    let mut credit = CreditAccount::new("Bob", -40.0, 0.18, 500.0);
    let mut debit = DebitAccount::new("Carol", 310.5, 0.005, 25.0);
    session.transaction(|uow| {
        uow.persist(&mut plain)?;
        uow.persist(&mut credit)?;
        uow.persist(&mut debit)?;
        Ok(())
    })?;

    Ok(DemoReport {
        accounts: session.list()?,
        credit_accounts: session.list()?,
        debit_accounts: session.list()?,
        polymorphic: session.list_polymorphic()?,
    })
}
