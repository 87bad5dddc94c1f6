//! Plain text decoding.
//!
//! Text files must be valid UTF-8; a leading byte order mark is dropped.
//! Invalid input is rejected rather than replaced, so callers never chunk
//! mojibake.
//!
//! ```rust
//! use chunkwise::extraction::text::decode_text;
//!
//! # fn example() -> chunkwise::Result<()> {
//! let text = decode_text(b"\xEF\xBB\xBFhello", "notes.txt")?;
//! assert_eq!(text, "hello");
//! # Ok(())
//! # }
//! ```
use crate::error::{ChunkwiseError, Result};
use crate::types::{Extraction, Segment};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decode `bytes` as strict UTF-8. `origin` names the input in the error.
pub fn decode_text(bytes: &[u8], origin: &str) -> Result<String> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    String::from_utf8(bytes.to_vec()).map_err(|e| {
        ChunkwiseError::decode_with_source(
            format!("{} is not valid UTF-8 (invalid byte at offset {})", origin, e.utf8_error().valid_up_to()),
            e,
        )
    })
}

/// The whole text as one untitled segment; blank text yields no segments.
pub fn extract_plain_text(bytes: &[u8], origin: &str) -> Result<Extraction> {
    let text = decode_text(bytes, origin)?;
    if text.trim().is_empty() {
        return Ok(Extraction::default());
    }
    Ok(Extraction::from_segments(vec![Segment::new(text, Vec::new())]))
}
