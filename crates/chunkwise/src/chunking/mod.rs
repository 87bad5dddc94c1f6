//! Chunking of extracted segments.
//!
//! Two algorithms bound chunk sizes:
//!
//! - **Token-bounded** ([`TokenChunker`]): structured, tabular and markdown
//!   formats. The bound is measured with the embedding model's tokenizer and
//!   oversized segments are split with `text-splitter`.
//! - **Character-bounded** ([`RecursiveSplitter`]): plain text, with a fixed
//!   character overlap between consecutive chunks.
//!
//! [`merge_by_heading`] is a separate pass the caller applies explicitly.
//!
//! # Example
//!
//! ```rust
//! use chunkwise::chunking::{chunk_segments, ChunkerType};
//! use chunkwise::chunking::tokenizer::TokenCounter;
//! use chunkwise::core::config::ChunkingConfig;
//! use chunkwise::types::Segment;
//!
//! # fn example() -> chunkwise::Result<()> {
//! let counter = TokenCounter::words();
//! let segments = vec![Segment::new("Some body text.", vec!["Intro".to_string()])];
//! let chunks = chunk_segments(&segments, ChunkerType::Text, &counter, &ChunkingConfig::default())?;
//! assert_eq!(chunks[0].heading().as_str(), "Intro");
//! # Ok(())
//! # }
//! ```
pub mod merge;
pub mod recursive;
pub mod token_chunker;
pub mod tokenizer;

pub use merge::merge_by_heading;
pub use recursive::RecursiveSplitter;
pub use token_chunker::TokenChunker;
pub use tokenizer::{ModelSources, TokenCounter};

use crate::Result;
use crate::core::config::ChunkingConfig;
use crate::types::{Chunk, Segment};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkerType {
    /// Token-bounded; oversized prose is split on sentence and word boundaries.
    Text,
    /// Token-bounded; oversized prose is split along markdown structure.
    Markdown,
    /// Character-bounded recursive splitting with overlap.
    Characters,
}

/// Chunk `segments` with the algorithm selected by `chunker_type`.
///
/// # Errors
///
/// Only configuration problems (zero bounds, overlap not below the
/// character bound) produce an error.
pub fn chunk_segments(
    segments: &[Segment],
    chunker_type: ChunkerType,
    counter: &TokenCounter,
    config: &ChunkingConfig,
) -> Result<Vec<Chunk>> {
    match chunker_type {
        ChunkerType::Text | ChunkerType::Markdown => {
            let chunker =
                TokenChunker::new(counter, config.max_tokens, config.merge_peers)?.with_splitter(chunker_type);
            Ok(chunker.chunk(segments))
        }
        ChunkerType::Characters => {
            let splitter = RecursiveSplitter::new(config.max_characters, config.overlap)?;
            Ok(chunk_characters(segments, &splitter))
        }
    }
}

fn chunk_characters(segments: &[Segment], splitter: &RecursiveSplitter) -> Vec<Chunk> {
    let mut chunks = Vec::new();

    for segment in segments {
        let heading = segment.heading();
        for text in splitter.split(&segment.text) {
            let mut chunk = Chunk::new(text, segment.headings.clone());
            chunk
                .metadata
                .insert("heading".to_string(), Value::from(heading.as_str()));
            if let Some(page) = segment.page_number {
                chunk.metadata.insert("page_number".to_string(), Value::from(page));
            }
            chunk
                .metadata
                .insert("segment_kind".to_string(), Value::from(segment.kind.as_str()));
            for (key, value) in &segment.attributes {
                chunk.metadata.entry(key.clone()).or_insert_with(|| value.clone());
            }
            chunks.push(chunk);
        }
    }

    chunks
}
