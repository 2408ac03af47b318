//! CSV-backed bill table.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::{BillStore, COLUMNS};
use crate::error::StoreError;
use crate::models::bill::BillRecord;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A bill table stored as a CSV file with a `type,amount,due_date,source_file_name`
/// header.
#[derive(Debug, Clone)]
pub struct CsvBillStore {
    path: PathBuf,
}

impl CsvBillStore {
    /// Open a store at `path`. The file is created on the first append.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if path.is_dir() {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is a directory", path.display()),
            )));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BillStore for CsvBillStore {
    fn append(&mut self, record: &BillRecord) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let needs_header = file.metadata()?.len() == 0;

        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if needs_header {
            wtr.write_record(COLUMNS)?;
        }

        let due_date = record
            .due_date()
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default();

        wtr.write_record([
            record.category(),
            &record.amount().to_string(),
            &due_date,
            record.source_file_name(),
        ])?;
        wtr.flush()?;

        debug!("Appended bill from {} to {}", record.source_file_name(), self.path.display());
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<BillRecord>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;

        let headers = rdr.headers()?.clone();
        if !headers.is_empty() && headers.iter().ne(COLUMNS) {
            return Err(StoreError::Corrupt {
                line: 1,
                reason: format!("unexpected header {:?}", headers.iter().collect::<Vec<_>>()),
            });
        }

        let mut records = Vec::new();
        for row in rdr.records() {
            let row = row?;
            let line = row.position().map(|p| p.line()).unwrap_or_default();

            if row.len() != COLUMNS.len() {
                warn!(
                    "Skipping row {} of {}: expected {} cells, found {}",
                    line,
                    self.path.display(),
                    COLUMNS.len(),
                    row.len()
                );
                continue;
            }

            let amount = row[1].trim().parse::<f64>().unwrap_or(0.0);
            let due_date = NaiveDate::parse_from_str(row[2].trim(), DATE_FORMAT).ok();

            records.push(BillRecord::new(&row[0], amount, due_date, &row[3]));
        }

        Ok(records)
    }
}
