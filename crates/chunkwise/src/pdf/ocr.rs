//! OCR backend seam for scanned PDF pages.
//!
//! No OCR engine ships with the crate. Callers plug one in through
//! [`OcrBackend`] and the PDF pipeline hands it the images embedded in a
//! page whenever the page needs recognition.

use super::error::{PdfError, Result};
use crate::core::config::AcceleratorConfig;
use lopdf::{Dictionary, Document, Object, ObjectId};

/// An image XObject drawn on a page, with its stream data still encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    pub page_number: usize,
    pub width: u32,
    pub height: u32,
    /// Stream filters in application order, e.g. `DCTDecode` for JPEG data.
    pub filters: Vec<String>,
    pub data: Vec<u8>,
}

impl PageImage {
    /// Whether `data` is a complete JPEG file.
    pub fn is_jpeg(&self) -> bool {
        self.filters.iter().any(|f| f == "DCTDecode")
    }
}

/// Text recognition for page images.
///
/// # Thread Safety
///
/// Backends must be `Send + Sync`; one instance is shared by every file a
/// loader processes.
///
/// # Example
///
/// ```rust
/// use chunkwise::core::config::AcceleratorConfig;
/// use chunkwise::pdf::ocr::{OcrBackend, PageImage};
///
/// struct FixedText;
///
/// impl OcrBackend for FixedText {
///     fn name(&self) -> &str {
///         "fixed"
///     }
///
///     fn recognize(&self, _image: &PageImage, _accelerator: &AcceleratorConfig) -> chunkwise::Result<String> {
///         Ok("recognized".to_string())
///     }
/// }
/// ```
pub trait OcrBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Recognize the text in one image. The accelerator settings are hints.
    fn recognize(&self, image: &PageImage, accelerator: &AcceleratorConfig) -> crate::Result<String>;
}

/// Images drawn on `page_id`, in content order.
///
/// Pages whose resources carry no `XObject` dictionary, such as text-only
/// or blank pages, have no images.
pub fn page_images(document: &Document, page_id: ObjectId, page_number: usize) -> Result<Vec<PageImage>> {
    if !page_resources(document, page_id).is_some_and(|resources| resources.has(b"XObject")) {
        return Ok(Vec::new());
    }

    let images = document
        .get_page_images(page_id)
        .map_err(|e| PdfError::ImageExtractionFailed(format!("page {}: {}", page_number, e)))?;

    Ok(images
        .into_iter()
        .map(|image| PageImage {
            page_number,
            width: u32::try_from(image.width).unwrap_or(0),
            height: u32::try_from(image.height).unwrap_or(0),
            filters: image.filters.unwrap_or_default(),
            data: image.content.to_vec(),
        })
        .collect())
}

fn page_resources(document: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let page = document.get_dictionary(page_id).ok()?;
    match page.get(b"Resources").ok()? {
        Object::Reference(id) => document.get_dictionary(*id).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

/// Run `backend` over every image on a page and join the results.
///
/// A page without images yields an empty string, not an error.
pub fn recognize_page(
    backend: &dyn OcrBackend,
    images: &[PageImage],
    accelerator: &AcceleratorConfig,
) -> crate::Result<String> {
    let mut texts = Vec::with_capacity(images.len());
    for image in images {
        let text = backend.recognize(image, accelerator)?;
        if !text.trim().is_empty() {
            texts.push(text);
        }
    }
    Ok(texts.join("\n\n"))
}
