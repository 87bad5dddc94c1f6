//! Plain text strategy.

use super::{ExtractionContext, ExtractionStrategy, ensure_supported};
use crate::Result;
use crate::chunking::ChunkerType;
use crate::core::mime::PLAIN_TEXT_MIME_TYPE;
use crate::extraction::text::extract_plain_text;
use crate::types::Extraction;

/// Whole file as one untitled segment for the recursive character chunker.
pub struct PlainTextStrategy;

impl ExtractionStrategy for PlainTextStrategy {
    fn name(&self) -> &str {
        "plain-text"
    }

    fn description(&self) -> &str {
        "Decodes UTF-8 text for character-bounded chunking"
    }

    fn supported_mime_types(&self) -> &'static [&'static str] {
        &[PLAIN_TEXT_MIME_TYPE]
    }

    fn chunker_type(&self) -> ChunkerType {
        ChunkerType::Characters
    }

    #[tracing::instrument(skip_all, fields(strategy = self.name(), size_bytes = content.len()))]
    fn extract(&self, content: &[u8], mime_type: &str, ctx: &ExtractionContext<'_>) -> Result<Extraction> {
        ensure_supported(self, mime_type)?;
        extract_plain_text(content, ctx.file_name)
    }
}
