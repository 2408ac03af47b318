//! Data models and configuration.

pub mod bill;
pub mod config;

pub use bill::{BillRecord, UNKNOWN_CATEGORY};
pub use config::{BillConfig, OcrConfig, PdfConfig, StoreConfig};
