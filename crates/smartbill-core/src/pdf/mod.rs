//! PDF processing module.

mod extractor;

pub use extractor::PdfExtractor;

use crate::error::PdfError;
use image::DynamicImage;

/// Type of PDF content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfType {
    /// Contains a native text layer.
    Text,
    /// Contains only images (scanned document).
    Image,
    /// Contains both text and images.
    Hybrid,
    /// Neither text nor images.
    Empty,
}

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Native text of each page, in page order.
    fn extract_page_texts(&self) -> Result<Vec<String>>;

    /// Native text of the whole document, pages concatenated in order.
    fn extract_text(&self) -> Result<String> {
        Ok(self.extract_page_texts()?.concat())
    }

    /// Rasterize a page (1-indexed) to an image.
    fn render_page(&self, page: u32) -> Result<DynamicImage>;

    /// Decode the images placed on a page (1-indexed).
    fn extract_images(&self, page: u32) -> Result<Vec<DynamicImage>>;
}
