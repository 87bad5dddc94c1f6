//! Single-file pipeline: extract, chunk, annotate, sanitize.

use crate::chunking::{TokenCounter, chunk_segments};
use crate::core::config::LoaderConfig;
use crate::core::formats::FormatFamily;
use crate::extractors::{ExtractionContext, strategy_for};
use crate::metadata::sanitize_chunk;
use crate::pdf::OcrBackend;
use crate::types::{Chunk, Extraction, PageFailure};
use crate::{ChunkwiseError, Result};
use serde_json::Value;
use std::path::Path;

/// Chunks of one file plus the pages that could not be read.
#[derive(Debug, Clone, Default)]
pub struct FileOutput {
    pub chunks: Vec<Chunk>,
    pub failed_pages: Vec<PageFailure>,
}

/// Run one file through its strategy and the matching chunker.
///
/// Every chunk gets `source`, `mime_type` and `chunk_index`, the document
/// attributes (chunk-level keys win), and `partial`/`failed_pages` when some
/// pages were skipped. Metadata is sanitized last.
///
/// # Errors
///
/// `UnsupportedFormat` for a content type with no family; otherwise whatever
/// the strategy or chunker reports.
#[tracing::instrument(skip_all, fields(path = %path.display(), mime_type = %mime_type))]
pub fn process_file(
    path: &Path,
    mime_type: &str,
    counter: &TokenCounter,
    config: &LoaderConfig,
    ocr_backend: Option<&dyn OcrBackend>,
) -> Result<FileOutput> {
    let family =
        FormatFamily::from_mime(mime_type).ok_or_else(|| ChunkwiseError::UnsupportedFormat(mime_type.to_string()))?;
    let strategy = strategy_for(family);

    let file_name = path.display().to_string();
    let ctx = ExtractionContext::from_config(config, ocr_backend, &file_name);
    let extraction = strategy.extract_file(path, mime_type, &ctx)?;

    let chunks = chunk_segments(&extraction.segments, strategy.chunker_type(), counter, &config.chunking)?;
    tracing::debug!(
        strategy = strategy.name(),
        segments = extraction.segments.len(),
        chunks = chunks.len(),
        "Processed file"
    );

    let chunks = annotate(chunks, &extraction, &file_name, mime_type);
    Ok(FileOutput {
        chunks,
        failed_pages: extraction.failed_pages,
    })
}

fn annotate(chunks: Vec<Chunk>, extraction: &Extraction, source: &str, mime_type: &str) -> Vec<Chunk> {
    let failed_pages = failed_page_list(&extraction.failed_pages);

    chunks
        .into_iter()
        .enumerate()
        .map(|(idx, mut chunk)| {
            let metadata = &mut chunk.metadata;
            metadata.insert("source".to_string(), Value::from(source));
            metadata.insert("mime_type".to_string(), Value::from(mime_type));
            metadata.insert("chunk_index".to_string(), Value::from(idx));
            for (key, value) in &extraction.attributes {
                metadata.entry(key.clone()).or_insert_with(|| value.clone());
            }
            if let Some(pages) = &failed_pages {
                metadata.insert("partial".to_string(), Value::Bool(true));
                metadata.insert("failed_pages".to_string(), Value::from(pages.as_str()));
            }
            sanitize_chunk(chunk)
        })
        .collect()
}

/// `"3,7"` for failures on pages 3 and 7; `None` when nothing failed.
fn failed_page_list(failures: &[PageFailure]) -> Option<String> {
    if failures.is_empty() {
        return None;
    }
    let pages: Vec<String> = failures.iter().map(|f| f.page_number.to_string()).collect();
    Some(pages.join(","))
}
