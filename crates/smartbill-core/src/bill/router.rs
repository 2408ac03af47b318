//! Document router: picks the text path for a file and builds the record.

use std::fmt;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::rules::{AmountExtractor, DateExtractor, FieldExtractor};
use super::Result;
use crate::error::ExtractionError;
use crate::models::bill::BillRecord;
use crate::models::config::PdfConfig;
use crate::ocr::{ImageOcr, OcrBackend};
use crate::pdf::{PdfExtractor, PdfProcessor};

/// Declared media type of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Pdf,
    Image,
    Unsupported,
}

impl MediaType {
    /// Classify a declared MIME type such as `application/pdf` or `image/png`.
    pub fn parse(declared: &str) -> Self {
        let essence = declared
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "application/pdf" | "application/x-pdf" => Self::Pdf,
            s if s.starts_with("image/") => Self::Image,
            _ => Self::Unsupported,
        }
    }

    /// MIME type for a file extension, for callers that only have a path.
    pub fn from_extension(extension: &str) -> Option<&'static str> {
        let mime = match extension.to_ascii_lowercase().as_str() {
            "pdf" => "application/pdf",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "tif" | "tiff" => "image/tiff",
            "bmp" => "image/bmp",
            "gif" => "image/gif",
            "webp" => "image/webp",
            _ => return None,
        };
        Some(mime)
    }
}

/// Where the raw text of a document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    /// The PDF's own text layer.
    NativePdf,
    /// OCR of the first page of a PDF without a text layer.
    ScannedPdf,
    /// OCR of an uploaded image.
    Image,
}

impl fmt::Display for TextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NativePdf => "native-pdf",
            Self::ScannedPdf => "scanned-pdf",
            Self::Image => "image",
        };
        f.write_str(name)
    }
}

/// Outcome of routing one document.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// The extracted bill.
    pub record: BillRecord,
    /// Raw text the fields were parsed from.
    pub raw_text: String,
    /// Path that produced the text, if any did.
    pub source: Option<TextSource>,
    /// Every step that degraded to a default.
    pub warnings: Vec<ExtractionError>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Routes a document to native text extraction or OCR and parses the result
/// into a [`BillRecord`].
///
/// The router holds no per-document state; concurrent callers should each
/// build their own.
pub struct DocumentRouter<B> {
    ocr: ImageOcr<B>,
    config: PdfConfig,
}

impl<B: OcrBackend> DocumentRouter<B> {
    pub fn new(backend: B) -> Self {
        Self {
            ocr: ImageOcr::new(backend),
            config: PdfConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PdfConfig) -> Self {
        self.config = config;
        self
    }

    pub fn ocr(&self) -> &ImageOcr<B> {
        &self.ocr
    }

    /// Extract a bill record. Never fails: unreadable input gives a zeroed record.
    pub fn extract(&self, file_bytes: &[u8], declared_media_type: &str, file_name: &str) -> BillRecord {
        self.extract_detailed(file_bytes, declared_media_type, file_name)
            .record
    }

    /// Like [`extract`](Self::extract), also reporting the text source and
    /// every step that degraded.
    pub fn extract_detailed(
        &self,
        file_bytes: &[u8],
        declared_media_type: &str,
        file_name: &str,
    ) -> ExtractionResult {
        let start = Instant::now();
        let mut warnings = Vec::new();

        info!("Extracting bill from {} ({})", file_name, declared_media_type);

        let (source, raw_text) = match self.route_text(file_bytes, declared_media_type, &mut warnings) {
            Ok((source, text)) => (Some(source), text),
            Err(e) => {
                warn!("{}: {}", file_name, e);
                warnings.push(e);
                (None, String::new())
            }
        };

        if source.is_some() && raw_text.trim().is_empty() {
            warnings.push(ExtractionError::NoTextFound);
        }

        let amount = match AmountExtractor::new().extract(&raw_text) {
            Some(m) => m.value,
            None => {
                warnings.push(ExtractionError::UnparseableAmount);
                0.0
            }
        };
        let due_date = match DateExtractor::new().extract(&raw_text) {
            Some(m) => Some(m.value),
            None => {
                warnings.push(ExtractionError::UnparseableDate);
                None
            }
        };

        let record = BillRecord::unclassified(amount, due_date, file_name);
        let processing_time_ms = start.elapsed().as_millis() as u64;

        debug!(
            "{}: amount={} due_date={:?} source={:?} warnings={} in {}ms",
            file_name,
            record.amount(),
            record.due_date(),
            source,
            warnings.len(),
            processing_time_ms
        );

        ExtractionResult {
            record,
            raw_text,
            source,
            warnings,
            processing_time_ms,
        }
    }

    /// Produce the raw text of a document. Recoverable problems on the way
    /// are pushed onto `warnings`; the returned error is the step that ended
    /// the attempt.
    pub fn route_text(
        &self,
        file_bytes: &[u8],
        declared_media_type: &str,
        warnings: &mut Vec<ExtractionError>,
    ) -> Result<(TextSource, String)> {
        match MediaType::parse(declared_media_type) {
            MediaType::Image => {
                let text = self.ocr.try_recognize(file_bytes)?;
                Ok((TextSource::Image, text))
            }
            MediaType::Pdf => self.route_pdf(file_bytes, warnings),
            MediaType::Unsupported => Err(ExtractionError::UnsupportedMediaType(
                declared_media_type.to_string(),
            )),
        }
    }

    fn route_pdf(
        &self,
        file_bytes: &[u8],
        warnings: &mut Vec<ExtractionError>,
    ) -> Result<(TextSource, String)> {
        let pdf = PdfExtractor::from_bytes(file_bytes)
            .map_err(|e| ExtractionError::UnreadableDocument(e.to_string()))?;

        // A text layer that fails to decode counts as an empty one.
        let text = pdf.extract_text().unwrap_or_else(|e| {
            warn!("Native text extraction failed: {}", e);
            warnings.push(e.into());
            String::new()
        });

        if !text.trim().is_empty() {
            debug!("Using native text layer ({} chars)", text.len());
            return Ok((TextSource::NativePdf, text));
        }

        if !self.config.ocr_fallback {
            debug!("PDF has no text layer and OCR fallback is disabled");
            return Ok((TextSource::NativePdf, text));
        }

        // Only the first page is OCR'd; later pages of a scan are ignored.
        debug!(
            "PDF has no text layer, OCR'ing page {} of {}",
            self.config.ocr_page,
            pdf.page_count()
        );
        let page = pdf.render_page(self.config.ocr_page)?;
        let text = self.ocr.recognize_image(&page)?;
        Ok((TextSource::ScannedPdf, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{OcrError, PdfError};
    use crate::ocr::tests::{png_bytes, FakeOcr};
    use crate::ocr::UnavailableOcr;
    use crate::test_support::{scanned_pages, scanned_pdf, text_pdf};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_media_type_parse() {
        assert_eq!(MediaType::parse("application/pdf"), MediaType::Pdf);
        assert_eq!(MediaType::parse("Application/PDF; charset=binary"), MediaType::Pdf);
        assert_eq!(MediaType::parse("image/png"), MediaType::Image);
        assert_eq!(MediaType::parse(" image/jpeg "), MediaType::Image);
        assert_eq!(MediaType::parse("text/plain"), MediaType::Unsupported);
        assert_eq!(MediaType::parse(""), MediaType::Unsupported);
    }

    #[test]
    fn test_media_type_from_extension() {
        assert_eq!(MediaType::from_extension("PDF"), Some("application/pdf"));
        assert_eq!(MediaType::from_extension("jpeg"), Some("image/jpeg"));
        assert_eq!(MediaType::from_extension("docx"), None);
    }

    #[test]
    fn test_digital_pdf_skips_ocr() {
        let router = DocumentRouter::new(FakeOcr::new("999.00 due 2030-01-01"));
        let pdf = text_pdf(&["Total: 156.99 due March 15, 2025"]);

        let result = router.extract_detailed(&pdf, "application/pdf", "bill.pdf");

        assert_eq!(result.source, Some(TextSource::NativePdf));
        assert_eq!(result.record.amount(), 156.99);
        assert_eq!(result.record.due_date(), Some(date(2025, 3, 15)));
        assert_eq!(result.record.category(), "Unknown");
        assert_eq!(result.record.source_file_name(), "bill.pdf");
        assert_eq!(router.ocr().backend().calls(), 0);
    }

    #[test]
    fn test_scanned_pdf_ocrs_first_page_only() {
        let router = DocumentRouter::new(FakeOcr::new("Amount Due $89.50\nDue 04/01/2025"));
        let pdf = scanned_pdf(&[(10, 6), (20, 12), (30, 18)]);

        let result = router.extract_detailed(&pdf, "application/pdf", "scan.pdf");

        assert_eq!(result.source, Some(TextSource::ScannedPdf));
        assert_eq!(router.ocr().backend().seen.borrow().as_slice(), &[(10, 6)]);
        assert_eq!(result.record.amount(), 89.5);
        assert_eq!(result.record.due_date(), Some(date(2025, 4, 1)));
        assert_eq!(result.raw_text, "Amount Due $89.50\nDue 04/01/2025");
    }

    #[test]
    fn test_scan_on_later_page_is_never_used() {
        let router = DocumentRouter::new(FakeOcr::new("Page two total 777.00"));
        let pdf = scanned_pages(&[None, Some((7, 3))]);

        let result = router.extract_detailed(&pdf, "application/pdf", "scan.pdf");

        assert_eq!(router.ocr().backend().calls(), 0);
        assert!(result.record.is_empty());
        assert_eq!(result.source, None);
        assert!(matches!(
            result.warnings.first(),
            Some(ExtractionError::Pdf(PdfError::ImageExtraction(_)))
        ));
    }

    #[test]
    fn test_scanned_pdf_with_fallback_disabled() {
        let config = PdfConfig {
            ocr_fallback: false,
            ..PdfConfig::default()
        };
        let router = DocumentRouter::new(FakeOcr::new("12.00")).with_config(config);
        let pdf = scanned_pdf(&[(10, 6)]);

        let result = router.extract_detailed(&pdf, "application/pdf", "scan.pdf");

        assert_eq!(router.ocr().backend().calls(), 0);
        assert!(result.record.is_empty());
        assert!(result.warnings.contains(&ExtractionError::NoTextFound));
    }

    #[test]
    fn test_image_goes_straight_to_ocr() {
        let router = DocumentRouter::new(FakeOcr::new("Amount Due $89.50"));

        let result = router.extract_detailed(&png_bytes(5, 5), "image/png", "photo.png");

        assert_eq!(result.source, Some(TextSource::Image));
        assert_eq!(result.record.amount(), 89.5);
        assert_eq!(result.record.due_date(), None);
        assert_eq!(result.warnings, vec![ExtractionError::UnparseableDate]);
    }

    #[test]
    fn test_corrupt_pdf_yields_empty_record() {
        let router = DocumentRouter::new(FakeOcr::new("100"));

        let result = router.extract_detailed(b"%PDF-1.4 garbage", "application/pdf", "bad.pdf");

        assert!(result.record.is_empty());
        assert_eq!(result.source, None);
        assert!(matches!(
            result.warnings.first(),
            Some(ExtractionError::UnreadableDocument(_))
        ));
        assert_eq!(router.ocr().backend().calls(), 0);
    }

    #[test]
    fn test_corrupt_image_yields_empty_record() {
        let router = DocumentRouter::new(FakeOcr::new("100"));

        let record = router.extract(b"\x89PNG broken", "image/png", "bad.png");

        assert!(record.is_empty());
        assert_eq!(record.category(), "Unknown");
    }

    #[test]
    fn test_unavailable_ocr_is_distinguishable_from_missing_date() {
        let router = DocumentRouter::new(UnavailableOcr::new());

        let result = router.extract_detailed(&png_bytes(3, 3), "image/png", "photo.png");

        assert!(result.record.is_empty());
        assert!(matches!(
            result.warnings.first(),
            Some(ExtractionError::Ocr(OcrError::Unavailable(_)))
        ));
        assert!(result.warnings.contains(&ExtractionError::UnparseableDate));
    }

    #[test]
    fn test_scanned_pdf_without_decodable_image() {
        // A text PDF whose only text is whitespace has nothing to OCR.
        let router = DocumentRouter::new(FakeOcr::new("100"));
        let pdf = text_pdf(&["   "]);

        let result = router.extract_detailed(&pdf, "application/pdf", "blank.pdf");

        assert!(result.record.is_empty());
        assert!(matches!(
            result.warnings.first(),
            Some(ExtractionError::Pdf(PdfError::ImageExtraction(_)))
        ));
    }

    #[test]
    fn test_unsupported_media_type() {
        let router = DocumentRouter::new(FakeOcr::new("100"));

        let result = router.extract_detailed(b"hello 42", "text/plain", "note.txt");

        assert!(result.record.is_empty());
        assert_eq!(
            result.warnings.first(),
            Some(&ExtractionError::UnsupportedMediaType("text/plain".to_string()))
        );
    }
}
