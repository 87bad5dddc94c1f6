//! Built-in extraction strategies.
//!
//! One strategy per [`FormatFamily`]. Each turns file bytes into ordered
//! segments and names the chunking algorithm its output is meant for. The
//! mapping is a closed `match`, so adding a family without a strategy does
//! not compile.

use crate::Result;
use crate::chunking::ChunkerType;
use crate::core::config::{AcceleratorConfig, LoaderConfig, PdfConfig};
use crate::core::formats::FormatFamily;
use crate::core::io::read_file;
use crate::pdf::OcrBackend;
use crate::types::Extraction;
use std::path::Path;

pub mod docx;
pub mod markdown;
pub mod pdf;
pub mod tabular;
pub mod text;

pub use docx::StructuredOfficeStrategy;
pub use markdown::MarkdownStrategy;
pub use pdf::PaginatedDocumentStrategy;
pub use tabular::TabularOrSlideStrategy;
pub use text::PlainTextStrategy;

/// Settings and collaborators a strategy may need for one file.
#[derive(Clone, Copy)]
pub struct ExtractionContext<'a> {
    pub pdf: &'a PdfConfig,
    pub accelerator: &'a AcceleratorConfig,
    pub ocr_backend: Option<&'a dyn OcrBackend>,
    pub libreoffice_timeout_secs: u64,
    /// Used in error messages only.
    pub file_name: &'a str,
}

impl<'a> ExtractionContext<'a> {
    pub fn from_config(config: &'a LoaderConfig, ocr_backend: Option<&'a dyn OcrBackend>, file_name: &'a str) -> Self {
        Self {
            pdf: &config.pdf,
            accelerator: &config.accelerator,
            ocr_backend,
            libreoffice_timeout_secs: config.libreoffice_timeout_secs,
            file_name,
        }
    }
}

/// Trait implemented by every format strategy.
///
/// # Thread Safety
///
/// Strategies are stateless unit structs shared as `&'static` references.
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Content types this strategy accepts.
    fn supported_mime_types(&self) -> &'static [&'static str];

    /// Chunking algorithm for this strategy's segments.
    fn chunker_type(&self) -> ChunkerType;

    /// Extract segments from in-memory bytes.
    ///
    /// # Errors
    ///
    /// `Parsing` when the document cannot be read, `Decode` for text that is
    /// not UTF-8, `UnsupportedFormat` when `mime_type` is not one of
    /// [`supported_mime_types`](Self::supported_mime_types).
    fn extract(&self, content: &[u8], mime_type: &str, ctx: &ExtractionContext<'_>) -> Result<Extraction>;

    /// Read `path` and extract it. IO errors bubble up unchanged.
    fn extract_file(&self, path: &Path, mime_type: &str, ctx: &ExtractionContext<'_>) -> Result<Extraction> {
        let bytes = read_file(path)?;
        self.extract(&bytes, mime_type, ctx)
    }
}

/// Strategy responsible for `family`.
pub fn strategy_for(family: FormatFamily) -> &'static dyn ExtractionStrategy {
    match family {
        FormatFamily::PaginatedDocument => &PaginatedDocumentStrategy,
        FormatFamily::StructuredOffice => &StructuredOfficeStrategy,
        FormatFamily::TabularOrSlide => &TabularOrSlideStrategy,
        FormatFamily::Markdown => &MarkdownStrategy,
        FormatFamily::PlainText => &PlainTextStrategy,
    }
}

pub(crate) fn ensure_supported(strategy: &dyn ExtractionStrategy, mime_type: &str) -> Result<()> {
    if strategy.supported_mime_types().contains(&mime_type) {
        Ok(())
    } else {
        Err(crate::ChunkwiseError::UnsupportedFormat(format!(
            "{} does not handle {}",
            strategy.name(),
            mime_type
        )))
    }
}
