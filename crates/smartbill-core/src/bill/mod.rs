//! Bill extraction: field rules and the document router.

mod router;
pub mod rules;

pub use router::{DocumentRouter, ExtractionResult, MediaType, TextSource};

use crate::error::ExtractionError;

/// Result type for extraction steps.
pub type Result<T> = std::result::Result<T, ExtractionError>;
