//! PDF document processing.
//!
//! This module turns PDF bytes into heading-tagged segments using `lopdf`.
//!
//! # Features
//!
//! - **Text extraction**: page by page, so a broken page only loses itself
//! - **Page furniture removal**: running headers and footers are dropped
//! - **Layout**: heading detection and table recovery from aligned columns
//! - **OCR**: pages without a text layer go to a caller-supplied [`OcrBackend`]
//!
//! # Example
//!
//! ```rust,no_run
//! use chunkwise::core::config::{AcceleratorConfig, PdfConfig};
//! use chunkwise::pdf::extract_pdf;
//!
//! # fn example() -> chunkwise::Result<()> {
//! let pdf_bytes = std::fs::read("document.pdf")?;
//! let extraction = extract_pdf(&pdf_bytes, &PdfConfig::default(), &AcceleratorConfig::default(), None)?;
//! for segment in &extraction.segments {
//!     println!("p{:?} {:?}: {}", segment.page_number, segment.headings, segment.text);
//! }
//! # Ok(())
//! # }
//! ```
pub mod error;
pub mod layout;
pub mod metadata;
pub mod ocr;
pub mod table;
pub mod text;

pub use error::PdfError;
pub use ocr::{OcrBackend, PageImage};

use crate::core::config::{AcceleratorConfig, PdfConfig};
use crate::types::{Extraction, PageFailure};
use crate::{ChunkwiseError, Result};
use layout::segment_pages;
use text::{PageText, PdfTextExtractor, remove_page_furniture};

/// Extract segments from a PDF.
///
/// Pages that cannot be read are recorded in `failed_pages` and skipped.
/// A document whose every page fails still returns `Ok` with no segments;
/// only a document that cannot be opened at all is an error.
///
/// # Errors
///
/// `ChunkwiseError::Parsing` when the bytes are not a readable PDF or the
/// document has no pages.
pub fn extract_pdf(
    pdf_bytes: &[u8],
    config: &PdfConfig,
    accelerator: &AcceleratorConfig,
    ocr_backend: Option<&dyn OcrBackend>,
) -> Result<Extraction> {
    let extractor = PdfTextExtractor::load(pdf_bytes)?;
    let attributes = metadata::document_attributes(extractor.document());

    let mut pages = Vec::with_capacity(extractor.page_count());
    let mut failed_pages = Vec::new();
    let mut warned_missing_backend = false;

    for page_number in extractor.page_numbers() {
        let text_layer = extractor.page_text(page_number);
        let needs_ocr = config.ocr
            && (config.force_full_page_ocr || text_layer.as_ref().map(PageText::is_blank).unwrap_or(true));

        let page = if !needs_ocr {
            text_layer.map_err(ChunkwiseError::from)
        } else if let Some(backend) = ocr_backend {
            // OCR that finds nothing, or fails on a page that has text, keeps the text layer.
            match (ocr_page(&extractor, page_number, backend, accelerator), text_layer) {
                (Ok(recognized), Ok(layer)) if recognized.is_blank() => Ok(layer),
                (Err(err), Ok(layer)) if !layer.is_blank() => {
                    tracing::warn!(page_number, error = %err, "OCR failed; using the text layer");
                    Ok(layer)
                }
                (recognized, _) => recognized,
            }
        } else {
            if !warned_missing_backend {
                tracing::warn!("OCR is enabled but no OCR backend is registered; using the text layer");
                warned_missing_backend = true;
            }
            text_layer.map_err(ChunkwiseError::from)
        };

        match page {
            Ok(page) => pages.push(page),
            Err(err) => {
                tracing::warn!(page_number, error = %err, "Skipping unreadable PDF page");
                failed_pages.push(PageFailure {
                    page_number,
                    reason: err.to_string(),
                });
            }
        }
    }

    if config.remove_page_furniture {
        remove_page_furniture(&mut pages, config.furniture_min_repeats);
    }

    let segments = segment_pages(&pages, config.table_structure);
    tracing::debug!(
        pages = pages.len(),
        failed = failed_pages.len(),
        segments = segments.len(),
        "Extracted PDF"
    );

    Ok(Extraction {
        segments,
        attributes,
        failed_pages,
    })
}

fn ocr_page(
    extractor: &PdfTextExtractor,
    page_number: usize,
    backend: &dyn OcrBackend,
    accelerator: &AcceleratorConfig,
) -> Result<PageText> {
    let page_id = extractor.page_id(page_number)?;
    let images = ocr::page_images(extractor.document(), page_id, page_number)?;
    tracing::debug!(page_number, images = images.len(), backend = backend.name(), "Running OCR");
    let text = ocr::recognize_page(backend, &images, accelerator)?;
    Ok(PageText::from_text(page_number, &text))
}
