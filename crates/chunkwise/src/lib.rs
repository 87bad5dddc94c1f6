//! Chunkwise - Format-Aware Document Chunking
//!
//! Chunkwise turns PDF, Word, PowerPoint, Excel, HTML, Markdown and plain-text
//! files into bounded, heading-tagged text chunks ready to be embedded into a
//! retrieval index.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use chunkwise::{DocumentLoader, LoaderConfig};
//!
//! # fn main() -> chunkwise::Result<()> {
//! let loader = DocumentLoader::from_path("docs/", LoaderConfig::default())?;
//! for chunk in loader.load()? {
//!     println!("{}: {}", chunk.heading(), chunk.content);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Core Module** (`core`): type resolution, format registry, loader, configuration
//! - **Extractors** (`extractors`): one extraction strategy per format family
//! - **Extraction** (`extraction`, `pdf`): the format readers the strategies build on
//! - **Chunking** (`chunking`): token-bounded and character-bounded chunkers, heading merge
//! - **Metadata** (`metadata`): flattening chunk metadata for vector stores
//!
//! # Features
//!
//! - Extension-based content type resolution with an explicit support set
//! - Token bounds measured with the embedding model's own tokenizer
//! - Page-level fault isolation for PDFs
//! - Pluggable OCR through [`pdf::OcrBackend`]

#![deny(unsafe_code)]

pub mod chunking;
pub mod core;
pub mod error;
pub mod extraction;
pub mod extractors;
pub mod metadata;
pub mod pdf;
pub mod types;

pub use error::{ChunkwiseError, Result};
pub use types::*;

pub use chunking::{ChunkerType, TokenCounter, merge_by_heading};
pub use core::config::{AcceleratorConfig, BatchMode, ChunkingConfig, LoaderConfig, PdfConfig, TokenizerConfig};
pub use core::formats::FormatFamily;
pub use core::io::collect_paths;
pub use core::loader::DocumentLoader;
pub use core::mime::{
    DOCX_MIME_TYPE, EXCEL_BINARY_MIME_TYPE, EXCEL_MIME_TYPE, HTML_MIME_TYPE, LEGACY_POWERPOINT_MIME_TYPE,
    LEGACY_WORD_MIME_TYPE, MARKDOWN_MIME_TYPE, PDF_MIME_TYPE, PLAIN_TEXT_MIME_TYPE, POWER_POINT_MIME_TYPE,
    is_supported, resolve, try_resolve,
};
pub use extractors::{ExtractionStrategy, strategy_for};
pub use metadata::sanitize_metadata;
pub use pdf::{OcrBackend, PageImage};
