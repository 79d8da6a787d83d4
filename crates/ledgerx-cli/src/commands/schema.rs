//! Schema command
//!
//! Usage: ledgerx schema [--fingerprint]

use clap::Args;
use ledgerx_core::{Account, CreditAccount, DebitAccount, MappingModel};
use ledgerx_store::schema;

#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// Print only the SHA-256 fingerprint of the DDL
    #[arg(long)]
    pub fingerprint: bool,
}

/// Execute schema command
pub fn execute(args: SchemaArgs) -> Result<(), Box<dyn std::error::Error>> {
    let model = MappingModel::builder()
        .add::<Account>()
        .add::<CreditAccount>()
        .add::<DebitAccount>()
        .build()?;

    let fingerprint = schema::fingerprint(&model)?;
    if args.fingerprint {
        println!("{}", fingerprint);
    } else {
        println!("-- fingerprint: {}", fingerprint);
        print!("{}", schema::render_ddl(&model)?);
    }
    Ok(())
}
