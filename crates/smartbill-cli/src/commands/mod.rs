//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod list;
pub mod output;
pub mod process;
pub mod query;

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use smartbill_core::models::config::{BillConfig, OcrConfig};
use smartbill_core::{CsvBillStore, MediaType, OcrBackend, PureOcrEngine, UnavailableOcr};

/// Platform config file location, e.g. `~/.config/smartbill/config.json`.
pub fn default_config_path() -> PathBuf {
    BillConfig::default_path(&dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")))
}

/// Resolve configuration: `--config`, then the default file, then defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<BillConfig> {
    if let Some(path) = config_path {
        return BillConfig::from_file(Path::new(path))
            .with_context(|| format!("Failed to load config from {}", path));
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        return BillConfig::from_file(&default_path)
            .with_context(|| format!("Failed to load config from {}", default_path.display()));
    }

    Ok(BillConfig::default())
}

/// Build the OCR backend. Model load failures are fatal here rather than
/// degrading every document.
pub fn create_ocr(config: &OcrConfig, text_only: bool) -> anyhow::Result<Box<dyn OcrBackend>> {
    if text_only {
        return Ok(Box::new(UnavailableOcr::with_reason("disabled by --text-only")));
    }
    if !config.enabled {
        return Ok(Box::new(UnavailableOcr::with_reason("disabled in configuration")));
    }

    let engine = PureOcrEngine::from_config(config).with_context(|| {
        format!(
            "Failed to load OCR models from {} (use --text-only to skip OCR)",
            config.model_dir.display()
        )
    })?;
    Ok(Box::new(engine))
}

pub fn open_store(config: &BillConfig) -> anyhow::Result<CsvBillStore> {
    CsvBillStore::open(&config.store.path)
        .with_context(|| format!("Failed to open bill store {}", config.store.path.display()))
}

/// Declared media type for a path, from its extension.
pub fn media_type_for(path: &Path) -> Option<&'static str> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(MediaType::from_extension)
}

/// File name recorded on the bill.
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
