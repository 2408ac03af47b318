//! The bill record produced by the extraction pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Category assigned to every extracted bill; no classifier exists.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// A normalized bill extracted from a single document.
///
/// Fields are private and there are no setters: once the router hands a
/// record out it cannot be changed, only appended to a store. Deserialized
/// records go through [`BillRecord::new`] like every other record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawBillRecord")]
pub struct BillRecord {
    /// Free-form label, serialized as `type` to match the store column.
    #[serde(rename = "type")]
    category: String,

    /// Non-negative, finite amount. `0.0` when nothing was found.
    amount: f64,

    /// Due date, absent when nothing parseable was found.
    due_date: Option<NaiveDate>,

    /// Advisory name of the uploaded file.
    #[serde(default)]
    source_file_name: String,
}

impl BillRecord {
    /// Create a record. Amounts that are negative, NaN or infinite become `0.0`.
    pub fn new(
        category: impl Into<String>,
        amount: f64,
        due_date: Option<NaiveDate>,
        source_file_name: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            amount: sanitize_amount(amount),
            due_date,
            source_file_name: source_file_name.into(),
        }
    }

    /// Create a record with the [`UNKNOWN_CATEGORY`] label.
    pub fn unclassified(
        amount: f64,
        due_date: Option<NaiveDate>,
        source_file_name: impl Into<String>,
    ) -> Self {
        Self::new(UNKNOWN_CATEGORY, amount, due_date, source_file_name)
    }

    /// The zeroed record returned when nothing could be extracted.
    pub fn empty(source_file_name: impl Into<String>) -> Self {
        Self::unclassified(0.0, None, source_file_name)
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    pub fn source_file_name(&self) -> &str {
        &self.source_file_name
    }

    /// True when neither an amount nor a due date was found.
    pub fn is_empty(&self) -> bool {
        self.amount == 0.0 && self.due_date.is_none()
    }
}

/// Wire shape of a [`BillRecord`] before the amount is sanitized.
#[derive(Deserialize)]
struct RawBillRecord {
    #[serde(rename = "type")]
    category: String,
    amount: f64,
    due_date: Option<NaiveDate>,
    #[serde(default)]
    source_file_name: String,
}

impl From<RawBillRecord> for BillRecord {
    fn from(raw: RawBillRecord) -> Self {
        Self::new(raw.category, raw.amount, raw.due_date, raw.source_file_name)
    }
}

fn sanitize_amount(amount: f64) -> f64 {
    if amount.is_finite() && amount > 0.0 {
        amount
    } else {
        0.0
    }
}
