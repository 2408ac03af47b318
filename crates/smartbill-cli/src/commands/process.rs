//! Process command - extract a bill from a single file.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use smartbill_core::{BillStore, DocumentRouter, MediaType, PdfExtractor, PdfProcessor};

use super::output::{format_record, OutputFormat};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or image)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Skip OCR and use only the PDF text layer
    #[arg(long)]
    text_only: bool,

    /// Append the extracted bill to the store
    #[arg(long)]
    save: bool,

    /// Show steps that fell back to default values
    #[arg(long)]
    show_warnings: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let Some(media_type) = super::media_type_for(&args.input) else {
        anyhow::bail!("Unsupported file format: {}", args.input.display());
    };

    let ocr = super::create_ocr(&config.ocr, args.text_only)?;
    let router = DocumentRouter::new(ocr).with_config(config.pdf.clone());

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Extracting bill...");

    let data = fs::read(&args.input)?;
    let result = router.extract_detailed(&data, media_type, &super::file_name_of(&args.input));

    pb.finish_and_clear();

    let output = format_record(&result.record, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.save {
        let mut store = super::open_store(&config)?;
        store.append(&result.record)?;
        eprintln!(
            "{} Saved to {}",
            style("✓").green(),
            store.path().display()
        );
    }

    if args.show_warnings {
        eprintln!();
        match result.source {
            Some(source) => eprintln!("{} Text source: {}", style("ℹ").blue(), source),
            None => eprintln!("{} Text source: none", style("ℹ").blue()),
        }
        if MediaType::parse(media_type) == MediaType::Pdf {
            if let Ok(pdf) = PdfExtractor::from_bytes(&data) {
                eprintln!(
                    "{} PDF: {} pages, {:?}",
                    style("ℹ").blue(),
                    pdf.page_count(),
                    pdf.analyze()
                );
            }
        }
        eprintln!(
            "{} Processing time: {}ms",
            style("ℹ").blue(),
            result.processing_time_ms
        );
        for warning in &result.warnings {
            eprintln!("{} {}", style("⚠").yellow(), warning);
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
