//! Metadata sanitizing.
//!
//! Vector stores accept flat scalar metadata only, so every chunk passes
//! through [`sanitize_metadata`] before it leaves the pipeline.

use crate::types::{Chunk, Metadata};
use serde_json::Value;

/// Keep entries whose values are strings, numbers or booleans.
///
/// Nulls, arrays and objects are dropped entirely, not flattened.
pub fn sanitize_metadata(metadata: &Metadata) -> Metadata {
    metadata
        .iter()
        .filter(|(_, value)| is_scalar(value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

pub fn sanitize_chunk(mut chunk: Chunk) -> Chunk {
    chunk.metadata.retain(|_, value| is_scalar(value));
    chunk
}

#[inline]
fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Metadata {
        let mut m = Metadata::new();
        m.insert("heading".into(), json!("Intro"));
        m.insert("page_number".into(), json!(3));
        m.insert("score".into(), json!(0.5));
        m.insert("partial".into(), json!(false));
        m.insert("headings".into(), json!(["Intro", "Scope"]));
        m.insert("doc_items".into(), json!({"ref": "#/texts/0"}));
        m.insert("caption".into(), Value::Null);
        m
    }

    #[test]
    fn test_keeps_only_scalars() {
        let clean = sanitize_metadata(&sample());
        let keys: Vec<&str> = clean.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["heading", "page_number", "score", "partial"]);
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let once = sanitize_metadata(&sample());
        let twice = sanitize_metadata(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_strings_survive() {
        let mut m = Metadata::new();
        m.insert("title".into(), json!(""));
        assert_eq!(sanitize_metadata(&m).len(), 1);
    }

    #[test]
    fn test_sanitize_chunk_matches_sanitize_metadata() {
        let mut chunk = Chunk::new("body", vec![]);
        chunk.metadata = sample();
        let expected = sanitize_metadata(&chunk.metadata);
        assert_eq!(sanitize_chunk(chunk).metadata, expected);
    }
}
