//! Amount extraction.
//!
//! The amount is the first numeric token in the text after thousands
//! separators are removed and non-ASCII decimal digits are folded to ASCII. It is not the largest or the labelled one: an
//! invoice number or phone number printed before the total wins.

use super::patterns::{fold_digits, AMOUNT_TOKEN};
use super::{ExtractionMatch, FieldExtractor};
use crate::error::ExtractionError;

/// Amount field extractor.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<f64>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let normalized = normalize(text);
        let m = AMOUNT_TOKEN.find(&normalized)?;
        to_match(m.as_str(), m.start(), m.end())
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let normalized = normalize(text);
        AMOUNT_TOKEN
            .find_iter(&normalized)
            .filter_map(|m| to_match(m.as_str(), m.start(), m.end()))
            .collect()
    }
}

/// Commas are only ever thousands separators here; `1,234.56` -> `1234.56`.
fn normalize(text: &str) -> String {
    fold_digits(text).replace(',', "")
}

fn to_match(token: &str, start: usize, end: usize) -> Option<ExtractionMatch<f64>> {
    let value: f64 = token.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(ExtractionMatch::new(value, token).with_position(start, end))
}

/// Parse the first numeric token of `text`.
pub fn parse_amount(text: &str) -> Result<f64, ExtractionError> {
    AmountExtractor::new()
        .extract(text)
        .map(|m| m.value)
        .ok_or(ExtractionError::UnparseableAmount)
}

/// First numeric token of `text`, or `0.0` when there is none.
pub fn extract_amount(text: &str) -> f64 {
    parse_amount(text).unwrap_or(0.0)
}
