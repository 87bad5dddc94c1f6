//! Token-bounded chunking with peer merging.
//!
//! Segments that fit the bound are kept whole. Oversized segments are split:
//! tables row-wise with the header repeated, everything else through
//! `text-splitter` measured by the model tokenizer. With `merge_peers`,
//! adjacent pieces sharing a heading path are joined while the result still
//! fits.

use crate::chunking::ChunkerType;
use crate::chunking::tokenizer::{TokenCounter, TokenSizer};
use crate::types::{Chunk, Metadata, Segment, SegmentKind};
use crate::{ChunkwiseError, Result};
use serde_json::Value;
use text_splitter::{ChunkConfig, MarkdownSplitter, TextSplitter};

#[derive(Debug, Clone, PartialEq)]
struct Piece {
    text: String,
    headings: Vec<String>,
    kind: SegmentKind,
    first_page: Option<usize>,
    last_page: Option<usize>,
    attributes: Metadata,
}

impl Piece {
    fn from_segment(segment: &Segment, text: String) -> Self {
        Self {
            text,
            headings: segment.headings.clone(),
            kind: segment.kind,
            first_page: segment.page_number,
            last_page: segment.page_number,
            attributes: segment.attributes.clone(),
        }
    }
}

pub struct TokenChunker<'a> {
    counter: &'a TokenCounter,
    max_tokens: usize,
    merge_peers: bool,
    splitter_type: ChunkerType,
}

impl<'a> TokenChunker<'a> {
    pub fn new(counter: &'a TokenCounter, max_tokens: usize, merge_peers: bool) -> Result<Self> {
        if max_tokens == 0 {
            return Err(ChunkwiseError::validation("max_tokens must be greater than zero"));
        }
        Ok(Self {
            counter,
            max_tokens,
            merge_peers,
            splitter_type: ChunkerType::Text,
        })
    }

    /// Split oversized prose along markdown structure instead of sentences.
    pub fn with_splitter(mut self, splitter_type: ChunkerType) -> Self {
        self.splitter_type = splitter_type;
        self
    }

    pub fn chunk(&self, segments: &[Segment]) -> Vec<Chunk> {
        let mut pieces = Vec::with_capacity(segments.len());

        for segment in segments {
            let text = segment.text.trim();
            if text.is_empty() {
                continue;
            }

            if self.fits(text) {
                pieces.push(Piece::from_segment(segment, text.to_string()));
                continue;
            }

            let parts = match segment.kind {
                SegmentKind::Table | SegmentKind::Sheet => self.split_table(text),
                SegmentKind::Text | SegmentKind::Slide => self.split_text(text),
            };
            tracing::debug!(
                kind = segment.kind.as_str(),
                parts = parts.len(),
                "Split oversized segment"
            );
            pieces.extend(parts.into_iter().map(|part| Piece::from_segment(segment, part)));
        }

        let pieces = if self.merge_peers { self.merge(pieces) } else { pieces };
        pieces.into_iter().map(|piece| self.into_chunk(piece)).collect()
    }

    fn fits(&self, text: &str) -> bool {
        self.counter.count(text) <= self.max_tokens
    }

    fn split_text(&self, text: &str) -> Vec<String> {
        let config = ChunkConfig::new(self.max_tokens)
            .with_sizer(TokenSizer(self.counter))
            .with_trim(true);

        match self.splitter_type {
            ChunkerType::Markdown => MarkdownSplitter::new(config).chunks(text).map(str::to_string).collect(),
            ChunkerType::Text | ChunkerType::Characters => {
                TextSplitter::new(config).chunks(text).map(str::to_string).collect()
            }
        }
    }

    /// Row groups that each repeat the markdown header, when there is one.
    fn split_table(&self, text: &str) -> Vec<String> {
        let lines: Vec<&str> = text.lines().filter(|line| !line.trim().is_empty()).collect();
        let header_len = if lines.len() >= 2 && is_separator_row(lines[1]) { 2 } else { 0 };
        let header = lines[..header_len].join("\n");

        let with_header = |row: &str| {
            if header.is_empty() {
                row.to_string()
            } else {
                format!("{}\n{}", header, row)
            }
        };

        let mut parts = Vec::new();
        let mut current: Option<String> = None;

        for row in &lines[header_len..] {
            if let Some(group) = &current {
                let candidate = format!("{}\n{}", group, row);
                if self.fits(&candidate) {
                    current = Some(candidate);
                    continue;
                }
            }

            if let Some(group) = current.take() {
                parts.push(group);
            }

            let fresh = with_header(row);
            if self.fits(&fresh) {
                current = Some(fresh);
            } else {
                parts.extend(self.split_text(row));
            }
        }

        if let Some(group) = current {
            parts.push(group);
        }
        parts
    }

    fn merge(&self, pieces: Vec<Piece>) -> Vec<Piece> {
        let mut merged: Vec<Piece> = Vec::with_capacity(pieces.len());

        for piece in pieces {
            if let Some(last) = merged.last_mut()
                && last.headings == piece.headings
            {
                let joined = format!("{}\n{}", last.text, piece.text);
                if self.fits(&joined) {
                    last.text = joined;
                    last.last_page = piece.last_page.or(last.last_page);
                    if last.first_page.is_none() {
                        last.first_page = piece.first_page;
                    }
                    continue;
                }
            }
            merged.push(piece);
        }

        merged
    }

    fn into_chunk(&self, piece: Piece) -> Chunk {
        let token_count = self.counter.count(&piece.text);
        let mut chunk = Chunk::new(piece.text, piece.headings);
        let heading = chunk.heading();

        let metadata = &mut chunk.metadata;
        metadata.insert("heading".to_string(), Value::from(heading.as_str()));
        metadata.insert(
            "headings".to_string(),
            Value::Array(chunk.headings.iter().cloned().map(Value::String).collect()),
        );
        if let Some(page) = piece.first_page {
            metadata.insert("page_number".to_string(), Value::from(page));
        }
        if let (Some(first), Some(last)) = (piece.first_page, piece.last_page)
            && last != first
        {
            metadata.insert("page_end".to_string(), Value::from(last));
        }
        metadata.insert("segment_kind".to_string(), Value::from(piece.kind.as_str()));
        metadata.insert("token_count".to_string(), Value::from(token_count));
        for (key, value) in piece.attributes {
            metadata.entry(key).or_insert(value);
        }

        chunk
    }
}

fn is_separator_row(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with('|')
        && trimmed.contains('-')
        && trimmed.chars().all(|c| matches!(c, '|' | '-' | ':' | ' '))
}
