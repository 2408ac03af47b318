//! Core library for bill extraction.
//!
//! This crate provides:
//! - PDF processing (native text layer, first-page image for scans)
//! - OCR adapter over a pluggable engine (pure-onnx-ocr when `native` is on)
//! - Heuristic bill field extraction (amount, due date)
//! - A document router producing [`BillRecord`]s that never fails
//! - Bill persistence and a keyword query responder

pub mod bill;
pub mod error;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod query;
pub mod store;

#[cfg(test)]
mod test_support;

pub use bill::rules::{extract_amount, extract_due_date, parse_amount, parse_due_date};
pub use bill::{DocumentRouter, ExtractionResult, MediaType, TextSource};
pub use error::{BillError, ExtractionError, OcrError, PdfError, Result, StoreError};
pub use models::{BillConfig, BillRecord, OcrConfig, PdfConfig, StoreConfig, UNKNOWN_CATEGORY};
pub use ocr::{ImageOcr, OcrBackend, OcrResult, TextBox, UnavailableOcr};
pub use pdf::{PdfExtractor, PdfProcessor, PdfType};
pub use query::{respond, ChartData, ChartKind, ChartPoint, QueryResponse};
pub use store::{BillStore, CsvBillStore, MemoryBillStore};

#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
