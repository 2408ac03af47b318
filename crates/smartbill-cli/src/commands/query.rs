//! Query command - answer a keyword question about stored bills.

use chrono::Local;
use clap::Args;
use console::style;

use smartbill_core::{respond, BillStore};

/// Arguments for the query command.
#[derive(Args)]
pub struct QueryArgs {
    /// Question, e.g. "what is due this month" or "summary"
    #[arg(required = true)]
    text: String,

    /// Print the response as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: QueryArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let store = super::open_store(&config)?;

    let records = store.list_all()?;
    let response = respond(&args.text, &records, Local::now().date_naive());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("{}", response.text);

    if let Some(chart) = &response.chart {
        println!();
        println!("{}", style(&chart.title).bold());
        for point in &chart.points {
            println!("  {:<20} {:>12.2}", point.label, point.value);
        }
    }

    Ok(())
}
