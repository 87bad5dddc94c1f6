//! Heading merge.
//!
//! Groups chunks by their leading heading and joins each group into one chunk.
//! Only the first heading path entry is the grouping key; sub-headings are
//! ignored. Callers invoke this explicitly, it is never chained by the loader.

use crate::types::{Chunk, Heading};
use indexmap::IndexMap;
use serde_json::Value;

/// One chunk per distinct leading heading, in first-seen order.
///
/// Contents are joined with `\n`. The merged chunk keeps the metadata of the
/// first member, with `heading` and `chunk_index` rewritten. Applying the
/// function to its own output returns the same chunks.
pub fn merge_by_heading(chunks: Vec<Chunk>) -> Vec<Chunk> {
    let mut groups: IndexMap<Heading, Chunk> = IndexMap::new();

    for chunk in chunks {
        let key = chunk.heading();
        match groups.get_mut(&key) {
            Some(merged) => {
                merged.content.push('\n');
                merged.content.push_str(&chunk.content);
            }
            None => {
                let mut first = chunk;
                first.headings = match &key {
                    Heading::Titled(title) => vec![title.clone()],
                    Heading::Untitled => Vec::new(),
                };
                groups.insert(key, first);
            }
        }
    }

    groups
        .into_iter()
        .enumerate()
        .map(|(index, (heading, mut chunk))| {
            chunk
                .metadata
                .insert("heading".to_string(), Value::String(heading.as_str().to_string()));
            chunk.metadata.insert("chunk_index".to_string(), Value::from(index));
            chunk
        })
        .collect()
}
