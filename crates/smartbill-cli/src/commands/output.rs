//! Rendering bill records for the terminal or a file.

use smartbill_core::BillRecord;
use smartbill_core::store::COLUMNS;

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub fn format_record(record: &BillRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_csv(std::slice::from_ref(record)),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

pub fn format_records(records: &[BillRecord], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        OutputFormat::Csv => format_csv(records),
        OutputFormat::Text => {
            if records.is_empty() {
                return Ok("No bills stored.".to_string());
            }
            Ok(records
                .iter()
                .map(format_text)
                .collect::<Vec<_>>()
                .join("\n"))
        }
    }
}

fn format_csv(records: &[BillRecord]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(COLUMNS)?;

    for record in records {
        wtr.write_record([
            record.category(),
            &record.amount().to_string(),
            &record.due_date().map(|d| d.to_string()).unwrap_or_default(),
            record.source_file_name(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &BillRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Bill: {}\n", record.source_file_name()));
    output.push_str(&format!("  Type:     {}\n", record.category()));
    output.push_str(&format!("  Amount:   {:.2}\n", record.amount()));
    match record.due_date() {
        Some(date) => output.push_str(&format!("  Due date: {}\n", date)),
        None => output.push_str("  Due date: -\n"),
    }

    output
}
