//! Character-bounded recursive splitting with exact overlap.
//!
//! Each chunk is cut at the end of the most preferred separator found inside
//! its admissible window, and the next chunk starts `overlap` characters
//! before that cut. Chunks are exact substrings of the input and every
//! boundary shares exactly `overlap` characters.

use crate::{ChunkwiseError, Result};

/// Separators in order of preference. A hard cut at a character boundary is
/// used when none of them occurs in the window.
pub const DEFAULT_SEPARATORS: &[&str] = &["\n\n", "\r", "\n", ". ", " "];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecursiveSplitter {
    max_characters: usize,
    overlap: usize,
    separators: Vec<Vec<char>>,
}

impl RecursiveSplitter {
    /// # Errors
    ///
    /// `ChunkwiseError::Validation` when `max_characters` is zero or
    /// `overlap >= max_characters`.
    pub fn new(max_characters: usize, overlap: usize) -> Result<Self> {
        Self::with_separators(max_characters, overlap, DEFAULT_SEPARATORS)
    }

    pub fn with_separators(max_characters: usize, overlap: usize, separators: &[&str]) -> Result<Self> {
        if max_characters == 0 {
            return Err(ChunkwiseError::validation("max_characters must be greater than zero"));
        }
        if overlap >= max_characters {
            return Err(ChunkwiseError::validation(format!(
                "Invalid chunking configuration: overlap ({}) must be smaller than max_characters ({})",
                overlap, max_characters
            )));
        }

        Ok(Self {
            max_characters,
            overlap,
            separators: separators
                .iter()
                .filter(|s| !s.is_empty())
                .map(|s| s.chars().collect())
                .collect(),
        })
    }

    pub fn max_characters(&self) -> usize {
        self.max_characters
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split `text` into overlapping chunks of at most `max_characters`.
    ///
    /// Whitespace-only input yields no chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();
        let mut chunks = Vec::new();
        let mut start = 0;

        loop {
            if total - start <= self.max_characters {
                chunks.push(chars[start..].iter().collect());
                break;
            }

            // The cut must leave more than `overlap` characters behind it so the
            // next chunk starts strictly later than this one.
            let earliest = start + self.overlap + 1;
            let latest = start + self.max_characters;
            let end = self.find_cut(&chars, earliest, latest);

            chunks.push(chars[start..end].iter().collect());
            start = end - self.overlap;
        }

        chunks
    }

    /// Exclusive end of the chunk, in `earliest..=latest`.
    fn find_cut(&self, chars: &[char], earliest: usize, latest: usize) -> usize {
        for separator in &self.separators {
            let len = separator.len();
            let mut end = latest;
            while end >= earliest && end >= len {
                if chars[end - len..end] == separator[..] {
                    return end;
                }
                end -= 1;
            }
        }
        latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_exact_overlap(chunks: &[String], overlap: usize) {
        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].chars().collect();
            let next: Vec<char> = pair[1].chars().collect();
            let tail: String = prev[prev.len() - overlap..].iter().collect();
            let head: String = next[..overlap].iter().collect();
            assert_eq!(tail, head);
        }
    }

    fn reassemble(chunks: &[String], overlap: usize) -> String {
        let mut out = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if i == 0 {
                out.push_str(chunk);
            } else {
                out.extend(chunk.chars().skip(overlap));
            }
        }
        out
    }

    #[test]
    fn test_empty_and_whitespace_text() {
        let splitter = RecursiveSplitter::new(100, 10).unwrap();
        assert!(splitter.split("").is_empty());
        assert!(splitter.split("  \n\n ").is_empty());
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let splitter = RecursiveSplitter::new(100, 10).unwrap();
        assert_eq!(splitter.split("Just a line."), vec!["Just a line.".to_string()]);
    }

    #[test]
    fn test_2500_characters_with_defaults() {
        let sentence = "The quick brown fox jumps over the lazy dog. ";
        let text: String = sentence.repeat(60).chars().take(2500).collect();
        assert_eq!(text.chars().count(), 2500);

        let splitter = RecursiveSplitter::new(1000, 200).unwrap();
        let chunks = splitter.split(&text);

        assert!(chunks.len() >= 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 1000));
        assert_exact_overlap(&chunks, 200);
        assert_eq!(reassemble(&chunks, 200), text);
    }

    #[test]
    fn test_no_separators_hard_cuts() {
        let text = "a".repeat(2500);
        let splitter = RecursiveSplitter::new(1000, 200).unwrap();
        let chunks = splitter.split(&text);

        let lengths: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
        assert_eq!(lengths, vec![1000, 1000, 900]);
        assert_exact_overlap(&chunks, 200);
    }

    #[test]
    fn test_prefers_paragraph_breaks() {
        let first = "word ".repeat(10);
        let text = format!("{}\n\n{}", first.trim_end(), "tail ".repeat(10));
        let splitter = RecursiveSplitter::new(60, 5).unwrap();
        let chunks = splitter.split(&text);

        assert!(chunks[0].ends_with("\n\n"));
        assert_exact_overlap(&chunks, 5);
    }

    #[test]
    fn test_sentence_boundary_before_space() {
        let text = "Alpha beta gamma. Delta epsilon zeta eta theta iota kappa lambda";
        let splitter = RecursiveSplitter::new(30, 0).unwrap();
        let chunks = splitter.split(text);
        assert_eq!(chunks[0], "Alpha beta gamma. ");
    }

    #[test]
    fn test_multibyte_characters() {
        let text = "日本語のテキスト。".repeat(50);
        let splitter = RecursiveSplitter::new(40, 8).unwrap();
        let chunks = splitter.split(&text);

        assert!(chunks.iter().all(|c| c.chars().count() <= 40));
        assert_exact_overlap(&chunks, 8);
        assert_eq!(reassemble(&chunks, 8), text);
    }

    #[test]
    fn test_invalid_overlap() {
        let err = RecursiveSplitter::new(100, 100).unwrap_err();
        assert!(matches!(err, ChunkwiseError::Validation { .. }));
        assert!(RecursiveSplitter::new(0, 0).is_err());
    }

    #[test]
    fn test_zero_overlap_partitions_text() {
        let text = "one two three four five six seven eight nine ten";
        let splitter = RecursiveSplitter::new(12, 0).unwrap();
        let chunks = splitter.split(text);
        assert_eq!(chunks.concat(), text);
        assert!(chunks.iter().all(|c| c.chars().count() <= 12));
    }
}
