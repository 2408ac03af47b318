//! Batch processing command for multiple bill files.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use smartbill_core::models::config::{OcrConfig, PdfConfig};
use smartbill_core::{BillRecord, BillStore, DocumentRouter, ExtractionResult};

use super::output::{format_records, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching input files
    #[arg(required = true)]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Skip OCR and use only the PDF text layer
    #[arg(long)]
    text_only: bool,

    /// Append every extracted bill to the store
    #[arg(long)]
    save: bool,

    /// Continue when a file cannot be read
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct FileOutcome {
    index: usize,
    path: PathBuf,
    result: Result<ExtractionResult, String>,
}

/// Settings each worker needs to build its own router.
#[derive(Clone)]
struct WorkerSettings {
    ocr: OcrConfig,
    pdf: PdfConfig,
    text_only: bool,
    continue_on_error: bool,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file() && super::media_type_for(p).is_some())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let settings = WorkerSettings {
        ocr: config.ocr.clone(),
        pdf: config.pdf.clone(),
        text_only: args.text_only,
        continue_on_error: args.continue_on_error,
    };

    // Round-robin the files over the workers; each worker owns its router.
    let workers = args.jobs.clamp(1, files.len());
    let mut chunks: Vec<Vec<(usize, PathBuf)>> = vec![Vec::new(); workers];
    for (index, path) in files.into_iter().enumerate() {
        chunks[index % workers].push((index, path));
    }

    let handles: Vec<_> = chunks
        .into_iter()
        .map(|chunk| {
            let settings = settings.clone();
            let pb = overall_pb.clone();
            tokio::task::spawn_blocking(move || process_chunk(chunk, &settings, &pb))
        })
        .collect();

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.extend(handle.await??);
    }
    outcomes.sort_by_key(|o| o.index);

    overall_pb.finish_and_clear();

    let records: Vec<BillRecord> = outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().ok())
        .map(|r| r.record.clone())
        .collect();
    let failed: Vec<&FileOutcome> = outcomes.iter().filter(|o| o.result.is_err()).collect();

    let output = format_records(&records, args.format)?;
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
        for record in &records {
            store.append(record)?;
        }
        eprintln!(
            "{} Saved {} bills to {}",
            style("✓").green(),
            records.len(),
            store.path().display()
        );
    }

    eprintln!();
    eprintln!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        outcomes.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} extracted, {} failed",
        style(records.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for outcome in &failed {
            if let Err(e) = &outcome.result {
                eprintln!("  - {}: {}", outcome.path.display(), e);
            }
        }
    }

    Ok(())
}

fn process_chunk(
    chunk: Vec<(usize, PathBuf)>,
    settings: &WorkerSettings,
    pb: &ProgressBar,
) -> anyhow::Result<Vec<FileOutcome>> {
    if chunk.is_empty() {
        return Ok(Vec::new());
    }

    let ocr = super::create_ocr(&settings.ocr, settings.text_only)?;
    let router = DocumentRouter::new(ocr).with_config(settings.pdf.clone());

    let mut outcomes = Vec::with_capacity(chunk.len());
    for (index, path) in chunk {
        let result = match fs::read(&path) {
            Ok(data) => {
                // Only paths with a known extension reach a worker.
                let media_type = super::media_type_for(&path).unwrap_or_default();
                let extracted =
                    router.extract_detailed(&data, media_type, &super::file_name_of(&path));
                debug!(
                    "{}: {} warnings in {}ms",
                    path.display(),
                    extracted.warnings.len(),
                    extracted.processing_time_ms
                );
                Ok(extracted)
            }
            Err(e) if settings.continue_on_error => {
                warn!("Failed to read {}: {}", path.display(), e);
                Err(e.to_string())
            }
            Err(e) => {
                error!("Failed to read {}: {}", path.display(), e);
                anyhow::bail!("Processing failed for {}: {}", path.display(), e);
            }
        };

        outcomes.push(FileOutcome { index, path, result });
        pb.inc(1);
    }

    Ok(outcomes)
}
