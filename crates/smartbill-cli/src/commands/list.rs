//! List command - print every stored bill.

use clap::Args;

use smartbill_core::BillStore;

use super::output::{format_records, OutputFormat};

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

pub async fn run(args: ListArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let store = super::open_store(&config)?;

    let records = store.list_all()?;
    println!("{}", format_records(&records, args.format)?);

    Ok(())
}
