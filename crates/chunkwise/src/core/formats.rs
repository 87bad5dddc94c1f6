//! Format families and the content-type registry.
//!
//! Every supported content type belongs to exactly one [`FormatFamily`], and
//! every family has exactly one extraction strategy (see
//! [`crate::extractors::strategy_for`]). [`verify_registry`] checks that the
//! two tables agree and runs whenever a loader is built.

use crate::core::mime::{
    DOCX_MIME_TYPE, EXCEL_BINARY_MIME_TYPE, EXCEL_MIME_TYPE, HTML_MIME_TYPE, LEGACY_POWERPOINT_MIME_TYPE,
    LEGACY_WORD_MIME_TYPE, MARKDOWN_MIME_TYPE, PDF_MIME_TYPE, PLAIN_TEXT_MIME_TYPE, POWER_POINT_MIME_TYPE,
    SUPPORTED_MIME_TYPES,
};
use crate::extractors::strategy_for;
use crate::{ChunkwiseError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatFamily {
    /// PDF-like documents with page flow.
    PaginatedDocument,
    /// Word-like flow-text documents.
    StructuredOffice,
    /// Spreadsheets, slide decks and HTML.
    TabularOrSlide,
    Markdown,
    PlainText,
}

impl FormatFamily {
    pub const ALL: [FormatFamily; 5] = [
        FormatFamily::PaginatedDocument,
        FormatFamily::StructuredOffice,
        FormatFamily::TabularOrSlide,
        FormatFamily::Markdown,
        FormatFamily::PlainText,
    ];

    /// Family of a supported content type, `None` for anything else.
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        match mime_type {
            PDF_MIME_TYPE => Some(FormatFamily::PaginatedDocument),
            DOCX_MIME_TYPE | LEGACY_WORD_MIME_TYPE => Some(FormatFamily::StructuredOffice),
            EXCEL_MIME_TYPE | EXCEL_BINARY_MIME_TYPE | POWER_POINT_MIME_TYPE | LEGACY_POWERPOINT_MIME_TYPE
            | HTML_MIME_TYPE => Some(FormatFamily::TabularOrSlide),
            MARKDOWN_MIME_TYPE => Some(FormatFamily::Markdown),
            PLAIN_TEXT_MIME_TYPE => Some(FormatFamily::PlainText),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FormatFamily::PaginatedDocument => "paginated_document",
            FormatFamily::StructuredOffice => "structured_office",
            FormatFamily::TabularOrSlide => "tabular_or_slide",
            FormatFamily::Markdown => "markdown",
            FormatFamily::PlainText => "plain_text",
        }
    }
}

impl fmt::Display for FormatFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check that the supported set and the strategy table are in sync.
///
/// # Errors
///
/// `ChunkwiseError::Validation` naming the first content type that has no
/// family, or whose strategy does not declare it.
pub fn verify_registry() -> Result<()> {
    let mut supported: Vec<&str> = SUPPORTED_MIME_TYPES.iter().copied().collect();
    supported.sort_unstable();

    for mime_type in supported {
        let family = FormatFamily::from_mime(mime_type).ok_or_else(|| {
            ChunkwiseError::validation(format!("Supported content type {} has no format family", mime_type))
        })?;

        let strategy = strategy_for(family);
        if !strategy.supported_mime_types().contains(&mime_type) {
            return Err(ChunkwiseError::validation(format!(
                "Strategy '{}' for {} does not handle {}",
                strategy.name(),
                family,
                mime_type
            )));
        }
    }

    for family in FormatFamily::ALL {
        for mime_type in strategy_for(family).supported_mime_types() {
            if FormatFamily::from_mime(mime_type) != Some(family) {
                return Err(ChunkwiseError::validation(format!(
                    "Strategy for {} declares {} which maps elsewhere",
                    family, mime_type
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_consistent() {
        verify_registry().unwrap();
    }

    #[test]
    fn test_every_supported_type_has_a_family() {
        for mime_type in SUPPORTED_MIME_TYPES.iter() {
            assert!(FormatFamily::from_mime(mime_type).is_some(), "{}", mime_type);
        }
    }

    #[test]
    fn test_unsupported_types_have_no_family() {
        assert_eq!(FormatFamily::from_mime("image/png"), None);
        assert_eq!(FormatFamily::from_mime("text/csv"), None);
    }

    #[test]
    fn test_family_mapping() {
        assert_eq!(
            FormatFamily::from_mime(PDF_MIME_TYPE),
            Some(FormatFamily::PaginatedDocument)
        );
        assert_eq!(
            FormatFamily::from_mime(LEGACY_WORD_MIME_TYPE),
            Some(FormatFamily::StructuredOffice)
        );
        assert_eq!(FormatFamily::from_mime(HTML_MIME_TYPE), Some(FormatFamily::TabularOrSlide));
        assert_eq!(FormatFamily::from_mime(MARKDOWN_MIME_TYPE), Some(FormatFamily::Markdown));
        assert_eq!(FormatFamily::from_mime(PLAIN_TEXT_MIME_TYPE), Some(FormatFamily::PlainText));
    }
}
