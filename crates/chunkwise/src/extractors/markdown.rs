//! Markdown strategy with YAML front matter support.

use super::{ExtractionContext, ExtractionStrategy, ensure_supported};
use crate::Result;
use crate::chunking::ChunkerType;
use crate::core::mime::MARKDOWN_MIME_TYPE;
use crate::extraction::markdown::{DEFAULT_SPLIT_DEPTH, markdown_extraction};
use crate::extraction::text::decode_text;
use crate::types::Extraction;

/// Splits on `#` to `###` headings. Front matter scalars become document attributes.
pub struct MarkdownStrategy;

impl ExtractionStrategy for MarkdownStrategy {
    fn name(&self) -> &str {
        "markdown"
    }

    fn description(&self) -> &str {
        "Splits Markdown into heading sections and reads YAML front matter"
    }

    fn supported_mime_types(&self) -> &'static [&'static str] {
        &[MARKDOWN_MIME_TYPE]
    }

    fn chunker_type(&self) -> ChunkerType {
        ChunkerType::Markdown
    }

    #[tracing::instrument(skip_all, fields(strategy = self.name(), size_bytes = content.len()))]
    fn extract(&self, content: &[u8], mime_type: &str, ctx: &ExtractionContext<'_>) -> Result<Extraction> {
        ensure_supported(self, mime_type)?;
        let text = decode_text(content, ctx.file_name)?;
        Ok(markdown_extraction(&text, DEFAULT_SPLIT_DEPTH))
    }
}
