//! PDF text and page image extraction using lopdf and pdf-extract.

use std::panic::{self, AssertUnwindSafe};

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, trace, warn};

use super::{PdfProcessor, PdfType, Result};
use crate::error::PdfError;

/// PDF content extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Create an extractor with a document already loaded.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut extractor = Self::new();
        extractor.load(data)?;
        Ok(extractor)
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("no document loaded".to_string()))
    }

    /// Classify the document by what it carries. Used for logging and reports.
    pub fn analyze(&self) -> PdfType {
        let has_text = self
            .extract_text()
            .map(|text| !text.trim().is_empty())
            .unwrap_or(false);
        let has_images = self
            .document
            .as_ref()
            .map(|doc| doc.objects.values().any(is_image_xobject))
            .unwrap_or(false);

        let pdf_type = match (has_text, has_images) {
            (true, false) => PdfType::Text,
            (false, true) => PdfType::Image,
            (true, true) => PdfType::Hybrid,
            (false, false) => PdfType::Empty,
        };

        debug!("PDF analysis: has_text={}, has_images={} -> {:?}", has_text, has_images, pdf_type);
        pdf_type
    }

    /// Resources dictionary for a page, following `Parent` inheritance.
    fn page_resources<'a>(&self, doc: &'a Document, page_id: ObjectId) -> Option<&'a Dictionary> {
        let mut node_id = page_id;
        // Page trees are shallow; the bound only guards against cycles.
        for _ in 0..32 {
            let node = doc.get_object(node_id).ok()?.as_dict().ok()?;
            if let Ok(resources) = node.get(b"Resources") {
                if let Ok((_, Object::Dictionary(dict))) = doc.dereference(resources) {
                    return Some(dict);
                }
            }
            node_id = node.get(b"Parent").ok()?.as_reference().ok()?;
        }
        None
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            // Many generated bills are "encrypted" with an empty user password.
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract reads bytes, so hand it the decrypted document.
            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_page_texts(&self) -> Result<Vec<String>> {
        self.document()?;

        // pdf-extract panics on some malformed content streams.
        let data = &self.raw_data;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(data)
        }));

        match outcome {
            Ok(Ok(pages)) => {
                trace!("Extracted native text from {} pages", pages.len());
                Ok(pages)
            }
            Ok(Err(e)) => Err(PdfError::TextExtraction(e.to_string())),
            Err(_) => {
                warn!("pdf-extract panicked while reading the text layer");
                Err(PdfError::TextExtraction("text extraction panicked".to_string()))
            }
        }
    }

    fn render_page(&self, page: u32) -> Result<DynamicImage> {
        // Only images placed on this page count; a scan on another page is
        // never substituted.
        self.extract_images(page)?.into_iter().next().ok_or_else(|| {
            debug!("No decodable image placed on page {}", page);
            PdfError::ImageExtraction(format!("no decodable image for page {}", page))
        })
    }

    fn extract_images(&self, page: u32) -> Result<Vec<DynamicImage>> {
        let doc = self.document()?;

        let pages = doc.get_pages();
        let page_id = *pages.get(&page).ok_or(PdfError::InvalidPage(page))?;

        let mut images = Vec::new();
        let xobjects = self
            .page_resources(doc, page_id)
            .and_then(|res| res.get(b"XObject").ok())
            .and_then(|obj| doc.dereference(obj).ok());

        if let Some((_, Object::Dictionary(xobjects))) = xobjects {
            for (name, obj_ref) in xobjects.iter() {
                let Ok((_, Object::Stream(stream))) = doc.dereference(obj_ref) else {
                    continue;
                };
                match decode_image_stream(doc, stream) {
                    Some(img) => images.push(img),
                    None => trace!("Skipping XObject {}", String::from_utf8_lossy(name)),
                }
            }
        }

        debug!("Extracted {} images from page {}", images.len(), page);
        Ok(images)
    }
}

fn is_image_xobject(obj: &Object) -> bool {
    matches!(obj, Object::Stream(stream) if is_image_dict(&stream.dict))
}

fn is_image_dict(dict: &Dictionary) -> bool {
    matches!(dict.get(b"Subtype").and_then(Object::as_name), Ok(b"Image"))
}

fn filter_name(dict: &Dictionary) -> Option<&[u8]> {
    match dict.get(b"Filter").ok()? {
        Object::Name(name) => Some(name.as_slice()),
        Object::Array(filters) => filters.first().and_then(|o| o.as_name().ok()),
        _ => None,
    }
}

fn color_space<'a>(doc: &'a Document, dict: &'a Dictionary) -> &'a [u8] {
    dict.get(b"ColorSpace")
        .ok()
        .and_then(|obj| match obj {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
            Object::Reference(id) => doc.get_object(*id).ok().and_then(|o| o.as_name().ok()),
            _ => None,
        })
        .unwrap_or(b"DeviceRGB")
}

/// Decode an image XObject stream into pixels.
fn decode_image_stream(doc: &Document, stream: &Stream) -> Option<DynamicImage> {
    let dict = &stream.dict;
    if !is_image_dict(dict) {
        return None;
    }

    let width = u32::try_from(dict.get(b"Width").ok()?.as_i64().ok()?).ok()?;
    let height = u32::try_from(dict.get(b"Height").ok()?.as_i64().ok()?).ok()?;
    trace!("Found image object: {}x{}", width, height);

    match filter_name(dict) {
        Some(b"DCTDecode") => {
            return image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg).ok();
        }
        Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
            trace!("Unsupported image filter {:?}", filter_name(dict).map(String::from_utf8_lossy));
            return None;
        }
        _ => {}
    }

    let bits = dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(8);
    if bits != 8 {
        trace!("Unsupported bits per component: {}", bits);
        return None;
    }

    // Raw streams without a filter report an error here; use them as-is.
    let data = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());

    let pixels = (width as usize) * (height as usize);
    match color_space(doc, dict) {
        b"DeviceGray" | b"G" | b"CalGray" if data.len() >= pixels => {
            GrayImage::from_raw(width, height, data[..pixels].to_vec()).map(DynamicImage::ImageLuma8)
        }
        b"DeviceRGB" | b"RGB" | b"CalRGB" if data.len() >= pixels * 3 => {
            RgbImage::from_raw(width, height, data[..pixels * 3].to_vec())
                .map(DynamicImage::ImageRgb8)
        }
        other => {
            trace!(
                "Could not decode image: colorspace={}, data_len={}",
                String::from_utf8_lossy(other),
                data.len()
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{scanned_pages, scanned_pdf, text_pdf};
    use image::GenericImageView;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let err = PdfExtractor::from_bytes(b"definitely not a pdf").err().unwrap();
        assert!(matches!(err, PdfError::Parse(_)));
    }

    #[test]
    fn test_extract_text_from_digital_pdf() {
        let pdf = text_pdf(&["Total: 156.99", "due March 15, 2025"]);
        let extractor = PdfExtractor::from_bytes(&pdf).unwrap();

        assert_eq!(extractor.page_count(), 1);
        let text = extractor.extract_text().unwrap();
        assert!(text.contains("156.99"), "got: {text}");
        assert_eq!(extractor.analyze(), PdfType::Text);
    }

    #[test]
    fn test_scanned_pdf_has_no_text_layer() {
        let pdf = scanned_pdf(&[(8, 4)]);
        let extractor = PdfExtractor::from_bytes(&pdf).unwrap();

        let text = extractor.extract_text().unwrap_or_default();
        assert!(text.trim().is_empty());
        assert_eq!(extractor.analyze(), PdfType::Image);
    }

    #[test]
    fn test_render_page_returns_that_pages_scan() {
        let pdf = scanned_pdf(&[(8, 4), (16, 2)]);
        let extractor = PdfExtractor::from_bytes(&pdf).unwrap();

        assert_eq!(extractor.page_count(), 2);
        assert_eq!(extractor.render_page(1).unwrap().dimensions(), (8, 4));
        assert_eq!(extractor.render_page(2).unwrap().dimensions(), (16, 2));
    }

    #[test]
    fn test_render_invalid_page() {
        let pdf = scanned_pdf(&[(8, 4)]);
        let extractor = PdfExtractor::from_bytes(&pdf).unwrap();

        assert_eq!(extractor.render_page(5).unwrap_err(), PdfError::InvalidPage(5));
    }

    #[test]
    fn test_render_page_ignores_images_on_other_pages() {
        let pdf = scanned_pages(&[None, Some((7, 3))]);
        let extractor = PdfExtractor::from_bytes(&pdf).unwrap();

        assert_eq!(extractor.render_page(2).unwrap().dimensions(), (7, 3));
        assert!(matches!(
            extractor.render_page(1).unwrap_err(),
            PdfError::ImageExtraction(_)
        ));
    }

    #[test]
    fn test_render_page_without_any_image() {
        let pdf = text_pdf(&["only text"]);
        let extractor = PdfExtractor::from_bytes(&pdf).unwrap();

        assert!(matches!(
            extractor.render_page(1).unwrap_err(),
            PdfError::ImageExtraction(_)
        ));
    }
}
