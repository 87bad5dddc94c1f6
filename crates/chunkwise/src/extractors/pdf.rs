//! Paginated-document strategy.

use super::{ExtractionContext, ExtractionStrategy, ensure_supported};
use crate::Result;
use crate::chunking::ChunkerType;
use crate::core::mime::PDF_MIME_TYPE;
use crate::pdf::extract_pdf;
use crate::types::Extraction;

/// PDF extraction with optional table recovery and OCR.
pub struct PaginatedDocumentStrategy;

impl ExtractionStrategy for PaginatedDocumentStrategy {
    fn name(&self) -> &str {
        "paginated-document"
    }

    fn description(&self) -> &str {
        "Extracts page text from PDF documents, with table recovery and optional OCR"
    }

    fn supported_mime_types(&self) -> &'static [&'static str] {
        &[PDF_MIME_TYPE]
    }

    fn chunker_type(&self) -> ChunkerType {
        ChunkerType::Text
    }

    #[tracing::instrument(skip_all, fields(strategy = self.name(), size_bytes = content.len()))]
    fn extract(&self, content: &[u8], mime_type: &str, ctx: &ExtractionContext<'_>) -> Result<Extraction> {
        ensure_supported(self, mime_type)?;
        extract_pdf(content, ctx.pdf, ctx.accelerator, ctx.ocr_backend)
    }
}
