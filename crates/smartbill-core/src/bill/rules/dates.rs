//! Due date extraction.
//!
//! A permissive scan over the whole text: every date-shaped phrase is a
//! candidate and the one that starts earliest wins. Nothing ties the date
//! to a "due" label, so an issue date printed first is taken instead.

use chrono::{Datelike, Local, NaiveDate};
use regex::Captures;

use super::patterns::{fold_digits, month_number, DATE_DAY_FIRST, DATE_MONTH_FIRST, DATE_NUMERIC, DATE_YMD};
use super::{ExtractionMatch, FieldExtractor};
use crate::error::ExtractionError;

/// Date field extractor.
pub struct DateExtractor {
    /// Supplies the year for phrases like "March 15".
    reference: NaiveDate,
}

impl DateExtractor {
    /// Extractor whose reference date is today, local time.
    pub fn new() -> Self {
        Self {
            reference: Local::now().date_naive(),
        }
    }

    pub fn with_reference_date(mut self, reference: NaiveDate) -> Self {
        self.reference = reference;
        self
    }

    fn month_first(&self, caps: &Captures) -> Option<NaiveDate> {
        let month = month_number(&caps[1])?;
        let day: u32 = caps[2].parse().ok()?;
        let year = self.year_or_reference(caps.get(3).map(|m| m.as_str()))?;
        NaiveDate::from_ymd_opt(year, month, day)
    }

    fn day_first(&self, caps: &Captures) -> Option<NaiveDate> {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_number(&caps[2])?;
        let year = self.year_or_reference(caps.get(3).map(|m| m.as_str()))?;
        NaiveDate::from_ymd_opt(year, month, day)
    }

    fn year_or_reference(&self, year: Option<&str>) -> Option<i32> {
        match year {
            Some(y) => y.parse().ok(),
            None => Some(self.reference.year()),
        }
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        // Positions refer to the folded text.
        let text = fold_digits(text);
        let text = text.as_str();
        let mut results = Vec::new();
        let mut push = |caps: &Captures, date: Option<NaiveDate>| {
            if let (Some(date), Some(m)) = (date, caps.get(0)) {
                results.push(ExtractionMatch::new(date, m.as_str()).with_position(m.start(), m.end()));
            }
        };

        // 2025-03-15
        for caps in DATE_YMD.captures_iter(text) {
            push(&caps, ymd_date(&caps));
        }

        // 03/15/2025
        for caps in DATE_NUMERIC.captures_iter(text) {
            push(&caps, numeric_date(&caps));
        }

        // March 15, 2025
        for caps in DATE_MONTH_FIRST.captures_iter(text) {
            let date = self.month_first(&caps);
            push(&caps, date);
        }

        // 15 March 2025
        for caps in DATE_DAY_FIRST.captures_iter(text) {
            let date = self.day_first(&caps);
            push(&caps, date);
        }

        // Document order; at the same start prefer the longer phrase.
        results.sort_by_key(|m| {
            let (start, end) = m.position.unwrap_or_default();
            (start, std::cmp::Reverse(end))
        });
        results.dedup_by_key(|m| m.position.map(|(start, _)| start));
        results
    }
}

fn ymd_date(caps: &Captures) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    )
}

/// Month first, unless the first part cannot be a month.
fn numeric_date(caps: &Captures) -> Option<NaiveDate> {
    let a: u32 = caps[1].parse().ok()?;
    let b: u32 = caps[2].parse().ok()?;
    let year = parse_year(&caps[3])?;
    let (month, day) = if a <= 12 { (a, b) } else { (b, a) };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Two-digit years: 00-50 are 2000s, 51-99 are 1900s.
fn parse_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    Some(match (s.len(), year) {
        (2, y) if y <= 50 => 2000 + y,
        (2, y) => 1900 + y,
        (_, y) => y,
    })
}

/// Parse the first date phrase of `text`.
pub fn parse_due_date(text: &str) -> Result<NaiveDate, ExtractionError> {
    DateExtractor::new()
        .extract(text)
        .map(|m| m.value)
        .ok_or(ExtractionError::UnparseableDate)
}

/// First date phrase of `text`, or `None` when there is none.
pub fn extract_due_date(text: &str) -> Option<NaiveDate> {
    parse_due_date(text).ok()
}
