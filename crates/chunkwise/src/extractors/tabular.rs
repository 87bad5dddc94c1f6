//! Tabular-or-slide strategy: spreadsheets, slide decks and HTML.

use super::{ExtractionContext, ExtractionStrategy, ensure_supported};
use crate::chunking::ChunkerType;
use crate::core::mime::{
    EXCEL_BINARY_MIME_TYPE, EXCEL_MIME_TYPE, HTML_MIME_TYPE, LEGACY_POWERPOINT_MIME_TYPE, POWER_POINT_MIME_TYPE,
};
use crate::extraction::excel::extract_workbook;
use crate::extraction::html::extract_html;
use crate::extraction::libreoffice::{LegacyFormat, convert_legacy};
use crate::extraction::pptx::extract_presentation;
use crate::extraction::text::decode_text;
use crate::types::Extraction;
use crate::{ChunkwiseError, Result};

pub struct TabularOrSlideStrategy;

impl ExtractionStrategy for TabularOrSlideStrategy {
    fn name(&self) -> &str {
        "tabular-or-slide"
    }

    fn description(&self) -> &str {
        "Extracts sheets, slides and HTML pages as table, slide and section segments"
    }

    fn supported_mime_types(&self) -> &'static [&'static str] {
        &[
            EXCEL_MIME_TYPE,
            EXCEL_BINARY_MIME_TYPE,
            POWER_POINT_MIME_TYPE,
            LEGACY_POWERPOINT_MIME_TYPE,
            HTML_MIME_TYPE,
        ]
    }

    fn chunker_type(&self) -> ChunkerType {
        ChunkerType::Text
    }

    #[tracing::instrument(skip_all, fields(strategy = self.name(), mime = mime_type, size_bytes = content.len()))]
    fn extract(&self, content: &[u8], mime_type: &str, ctx: &ExtractionContext<'_>) -> Result<Extraction> {
        ensure_supported(self, mime_type)?;

        match mime_type {
            EXCEL_MIME_TYPE | EXCEL_BINARY_MIME_TYPE => extract_workbook(content, mime_type),
            POWER_POINT_MIME_TYPE => extract_presentation(content),
            LEGACY_POWERPOINT_MIME_TYPE => {
                tracing::debug!(file = ctx.file_name, "Converting legacy presentation with LibreOffice");
                let converted = convert_legacy(content, LegacyFormat::Ppt, ctx.libreoffice_timeout_secs)?;
                extract_presentation(&converted)
            }
            HTML_MIME_TYPE => {
                let html = decode_text(content, ctx.file_name)?;
                extract_html(&html)
            }
            other => Err(ChunkwiseError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::test_support::context;
    use crate::types::SegmentKind;

    #[test]
    fn test_html_dispatch() {
        let html = b"<h1>Guide</h1><p>Read me.</p>";
        let extraction = TabularOrSlideStrategy
            .extract(html, HTML_MIME_TYPE, &context())
            .unwrap();

        assert_eq!(extraction.segments.len(), 1);
        assert_eq!(extraction.segments[0].headings, vec!["Guide".to_string()]);
        assert_eq!(extraction.segments[0].kind, SegmentKind::Text);
    }

    #[test]
    fn test_html_must_be_utf8() {
        let err = TabularOrSlideStrategy
            .extract(b"<p>\xFF</p>", HTML_MIME_TYPE, &context())
            .unwrap_err();
        assert!(matches!(err, ChunkwiseError::Decode { .. }));
    }

    #[test]
    fn test_corrupt_workbook_is_error() {
        assert!(
            TabularOrSlideStrategy
                .extract(b"garbage", EXCEL_MIME_TYPE, &context())
                .is_err()
        );
    }
}
