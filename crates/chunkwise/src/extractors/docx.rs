//! Structured-office strategy for Word documents.
//!
//! `.docx` is read directly. `.doc` goes through LibreOffice first and is
//! then read the same way.

use super::{ExtractionContext, ExtractionStrategy, ensure_supported};
use crate::Result;
use crate::chunking::ChunkerType;
use crate::core::mime::{DOCX_MIME_TYPE, LEGACY_WORD_MIME_TYPE};
use crate::extraction::docx::extract_document;
use crate::extraction::libreoffice::{LegacyFormat, convert_legacy};
use crate::types::Extraction;

pub struct StructuredOfficeStrategy;

impl ExtractionStrategy for StructuredOfficeStrategy {
    fn name(&self) -> &str {
        "structured-office"
    }

    fn description(&self) -> &str {
        "Extracts heading-structured text and flattened tables from Word documents"
    }

    fn supported_mime_types(&self) -> &'static [&'static str] {
        &[DOCX_MIME_TYPE, LEGACY_WORD_MIME_TYPE]
    }

    fn chunker_type(&self) -> ChunkerType {
        ChunkerType::Text
    }

    #[tracing::instrument(skip_all, fields(strategy = self.name(), size_bytes = content.len()))]
    fn extract(&self, content: &[u8], mime_type: &str, ctx: &ExtractionContext<'_>) -> Result<Extraction> {
        ensure_supported(self, mime_type)?;

        if mime_type == LEGACY_WORD_MIME_TYPE {
            tracing::debug!(file = ctx.file_name, "Converting legacy Word document with LibreOffice");
            let converted = convert_legacy(content, LegacyFormat::Doc, ctx.libreoffice_timeout_secs)?;
            return extract_document(&converted);
        }

        extract_document(content)
    }
}
