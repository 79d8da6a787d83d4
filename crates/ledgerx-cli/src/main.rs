//! LedgerX CLI
//!
//! Command-line driver for the joined-table account store

use clap::{Parser, Subcommand, ValueEnum};
use ledgerx_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "ledgerx")]
#[command(about = "LedgerX - joined-table account persistence", long_about = None)]
struct Cli {
    /// Log output format (logs go to stderr)
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Human)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Human,
    Json,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the DDL generated from the account mapping
    Schema(commands::schema::SchemaArgs),
    /// Create a fresh schema, store one account of each kind, query them back
    Demo(commands::demo::DemoArgs),
    /// List accounts from an existing store
    Accounts(commands::accounts::AccountsArgs),
}

fn main() {
    let cli = Cli::parse();

    init(match cli.log_format {
        LogFormat::Human => Profile::Development,
        LogFormat::Json => Profile::Production,
    });

    let result = match cli.command {
        Commands::Schema(args) => commands::schema::execute(args),
        Commands::Demo(args) => commands::demo::execute(args),
        Commands::Accounts(args) => commands::accounts::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
