//! Common regex patterns for bill field extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// Month names, full or abbreviated, as one alternation group.
const MONTH: &str = r"(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\b\.?";

/// Day of month with an optional ordinal suffix.
const DAY: &str = r"([0-9]{1,2})(?:st|nd|rd|th)?";

lazy_static! {
    // First numeric token: digits, optional separator, optional digits.
    // ASCII only; run text through `fold_digits` first.
    pub static ref AMOUNT_TOKEN: Regex = Regex::new(r"([0-9]+[\.,]?[0-9]*)").unwrap();

    // 2025-03-15 or 2025/03/15
    pub static ref DATE_YMD: Regex = Regex::new(
        r"\b([0-9]{4})[/\-]([0-9]{1,2})[/\-]([0-9]{1,2})\b"
    ).unwrap();

    // 03/15/2025, 15.03.2025, 3-15-25
    pub static ref DATE_NUMERIC: Regex = Regex::new(
        r"\b([0-9]{1,2})[./\-]([0-9]{1,2})[./\-]([0-9]{4}|[0-9]{2})\b"
    ).unwrap();

    // March 15, 2025 / Mar 15th 2025 / March 15
    pub static ref DATE_MONTH_FIRST: Regex = Regex::new(&format!(
        r"(?i)\b{MONTH}\s+{DAY}\b(?:,?\s+([0-9]{{4}})\b)?"
    )).unwrap();

    // 15 March 2025 / 15th of March, 2025 / 15 Mar
    pub static ref DATE_DAY_FIRST: Regex = Regex::new(&format!(
        r"(?i)\b{DAY}\s+(?:of\s+)?{MONTH}(?:,?\s+([0-9]{{4}})\b)?"
    )).unwrap();
}

/// First code point of each Unicode block of ten decimal digits that
/// [`fold_digits`] maps to ASCII.
const DIGIT_ZEROS: [u32; 20] = [
    0x0660, // Arabic-Indic
    0x06F0, // Extended Arabic-Indic
    0x07C0, // NKo
    0x0966, // Devanagari
    0x09E6, // Bengali
    0x0A66, // Gurmukhi
    0x0AE6, // Gujarati
    0x0B66, // Oriya
    0x0BE6, // Tamil
    0x0C66, // Telugu
    0x0CE6, // Kannada
    0x0D66, // Malayalam
    0x0E50, // Thai
    0x0ED0, // Lao
    0x0F20, // Tibetan
    0x1040, // Myanmar
    0x17E0, // Khmer
    0x1810, // Mongolian
    0x1946, // Limbu
    0xFF10, // Fullwidth
];

/// Replace decimal digits from the scripts in [`DIGIT_ZEROS`] with their
/// ASCII equivalents. Other characters are kept as they are.
pub fn fold_digits(text: &str) -> String {
    text.chars()
        .map(|c| {
            let code = c as u32;
            DIGIT_ZEROS
                .iter()
                .find(|&&zero| (zero..zero + 10).contains(&code))
                .and_then(|&zero| char::from_digit(code - zero, 10))
                .unwrap_or(c)
        })
        .collect()
}

/// Month number for an English month name or abbreviation.
pub fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    let month = match lower.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
