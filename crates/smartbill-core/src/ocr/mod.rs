//! Image/OCR adapter: bytes in, recognized text out.

#[cfg(feature = "native")]
mod pure_engine;

#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ExtractionError, OcrError};

/// A detected text box with its coordinates and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Bounding box coordinates (x1, y1, x2, y2, x3, y3, x4, y4) for quadrilateral.
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    /// Get the axis-aligned bounding rectangle.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

/// Result of OCR processing on an image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResult {
    /// Detected and recognized text boxes.
    pub boxes: Vec<TextBox>,

    /// Full text (boxes joined with newlines).
    pub text: String,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,

    /// Image dimensions (width, height).
    pub image_size: (u32, u32),
}

impl OcrResult {
    /// Create an empty result.
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            boxes: Vec::new(),
            text: String::new(),
            processing_time_ms: 0,
            image_size: (width, height),
        }
    }

    /// Sort boxes by reading order (top-to-bottom, left-to-right) and
    /// rebuild `text` from them.
    pub fn sort_by_reading_order(&mut self) {
        self.boxes.sort_by(|a, b| {
            let (ax, ay, _, _) = a.rect();
            let (bx, by, _, _) = b.rect();

            // Boxes within the same 20px band share a row.
            let row_a = (ay / 20.0) as i32;
            let row_b = (by / 20.0) as i32;

            row_a
                .cmp(&row_b)
                .then(ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal))
        });

        self.text = self
            .boxes
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
    }
}

/// An OCR engine that turns pixels into text.
pub trait OcrBackend {
    /// Run recognition over an image.
    fn process(&self, image: &DynamicImage) -> Result<OcrResult, OcrError>;

    /// Get OCR result as plain text.
    fn extract_text(&self, image: &DynamicImage) -> Result<String, OcrError> {
        Ok(self.process(image)?.text)
    }
}

impl<B: OcrBackend + ?Sized> OcrBackend for Box<B> {
    fn process(&self, image: &DynamicImage) -> Result<OcrResult, OcrError> {
        (**self).process(image)
    }
}

/// Backend used when no engine is loaded; every call fails with
/// [`OcrError::Unavailable`].
#[derive(Debug, Clone, Default)]
pub struct UnavailableOcr {
    reason: Option<String>,
}

impl UnavailableOcr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
        }
    }
}

impl OcrBackend for UnavailableOcr {
    fn process(&self, _image: &DynamicImage) -> Result<OcrResult, OcrError> {
        Err(OcrError::Unavailable(
            self.reason
                .clone()
                .unwrap_or_else(|| "no OCR engine loaded".to_string()),
        ))
    }
}

/// Decodes image bytes and runs them through an [`OcrBackend`].
pub struct ImageOcr<B> {
    backend: B,
}

impl<B: OcrBackend> ImageOcr<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Recognize text in encoded image bytes (PNG, JPEG, TIFF, ...).
    pub fn try_recognize(&self, image_bytes: &[u8]) -> Result<String, ExtractionError> {
        let image = image::load_from_memory(image_bytes)
            .map_err(|e| ExtractionError::UnreadableDocument(e.to_string()))?;
        self.recognize_image(&image)
    }

    /// Recognize text in an already decoded image.
    pub fn recognize_image(&self, image: &DynamicImage) -> Result<String, ExtractionError> {
        let text = self.backend.extract_text(image)?;
        debug!("OCR produced {} chars", text.len());
        Ok(text)
    }

    /// Recognize text in encoded image bytes; any failure yields `""`.
    pub fn recognize(&self, image_bytes: &[u8]) -> String {
        self.try_recognize(image_bytes).unwrap_or_else(|e| {
            warn!("OCR failed, treating image as blank: {}", e);
            String::new()
        })
    }
}
