//! Error types for the smartbill-core library.

use thiserror::Error;

/// Main error type for the smartbill library.
#[derive(Error, Debug)]
pub enum BillError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Bill field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Bill store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract the native text layer.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Failed to extract a page image.
    #[error("failed to extract images: {0}")]
    ImageExtraction(String),

    /// The PDF is encrypted with a non-empty password.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to OCR processing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OcrError {
    /// No OCR engine is available in this process.
    #[error("OCR engine unavailable: {0}")]
    Unavailable(String),

    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// The engine ran but failed to produce text.
    #[error("text recognition failed: {0}")]
    Recognition(String),
}

/// Tagged reasons a bill extraction step degraded.
///
/// None of these reach the caller of [`crate::DocumentRouter::extract`]; they
/// are collected as warnings while the record falls back to default values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The declared media type is neither a PDF nor an image.
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// The bytes cannot be decoded as the declared media type.
    #[error("unreadable document: {0}")]
    UnreadableDocument(String),

    /// Neither the text layer nor OCR produced any text.
    #[error("no text found")]
    NoTextFound,

    /// No numeric token found in the text.
    #[error("no amount found")]
    UnparseableAmount,

    /// No date phrase found in the text.
    #[error("no date found")]
    UnparseableDate,

    /// A PDF step failed after the document was opened.
    #[error("PDF step failed: {0}")]
    Pdf(#[from] PdfError),

    /// The OCR engine failed or is unavailable.
    #[error("OCR step failed: {0}")]
    Ocr(#[from] OcrError),
}

/// Errors related to the bill store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O error on the backing file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding/decoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The store file does not look like a bill table.
    #[error("corrupt store at line {line}: {reason}")]
    Corrupt { line: u64, reason: String },
}

/// Result type for the smartbill library.
pub type Result<T> = std::result::Result<T, BillError>;
