use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Flat, insertion-ordered metadata attached to segments and chunks.
pub type Metadata = IndexMap<String, serde_json::Value>;

/// Rendering of [`Heading::Untitled`].
pub const NO_HEADING: &str = "no heading";

/// Leading heading of a chunk.
///
/// Content that appears before any heading, or in formats without headings,
/// is `Untitled`. It renders as [`NO_HEADING`] so downstream consumers always
/// see a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heading {
    Titled(String),
    Untitled,
}

impl Heading {
    /// First entry of a heading path, or `Untitled` for an empty path.
    pub fn from_path(path: &[String]) -> Self {
        match path.first() {
            Some(title) if !title.trim().is_empty() => Heading::Titled(title.clone()),
            _ => Heading::Untitled,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Heading::Titled(title) => title,
            Heading::Untitled => NO_HEADING,
        }
    }

    pub fn is_titled(&self) -> bool {
        matches!(self, Heading::Titled(_))
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of document structure a segment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Text,
    Table,
    Slide,
    Sheet,
}

impl SegmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentKind::Text => "text",
            SegmentKind::Table => "table",
            SegmentKind::Slide => "slide",
            SegmentKind::Sheet => "sheet",
        }
    }
}

/// An atomic unit of extracted content.
///
/// Produced by an extraction strategy and handed to the chunker by value.
/// `headings` is the heading path, outermost first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub kind: SegmentKind,
    pub headings: Vec<String>,
    /// 1-based page (or slide) number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<usize>,
    #[serde(default)]
    pub attributes: Metadata,
}

impl Segment {
    pub fn new(text: impl Into<String>, headings: Vec<String>) -> Self {
        Self {
            text: text.into(),
            kind: SegmentKind::Text,
            headings,
            page_number: None,
            attributes: Metadata::new(),
        }
    }

    pub fn with_kind(mut self, kind: SegmentKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_page(mut self, page_number: usize) -> Self {
        self.page_number = Some(page_number);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn heading(&self) -> Heading {
        Heading::from_path(&self.headings)
    }
}

/// A page, slide or sheet that could not be read while the rest of the file was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFailure {
    pub page_number: usize,
    pub reason: String,
}

/// Output of one extraction strategy run over one file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub segments: Vec<Segment>,
    /// Document-level attributes copied onto every chunk.
    #[serde(default)]
    pub attributes: Metadata,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_pages: Vec<PageFailure>,
}

impl Extraction {
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self {
            segments,
            ..Default::default()
        }
    }

    pub fn is_partial(&self) -> bool {
        !self.failed_pages.is_empty()
    }
}

/// A bounded text unit returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub content: String,
    /// Heading path of the content, outermost first.
    pub headings: Vec<String>,
    pub metadata: Metadata,
}

impl Chunk {
    pub fn new(content: impl Into<String>, headings: Vec<String>) -> Self {
        Self {
            content: content.into(),
            headings,
            metadata: Metadata::new(),
        }
    }

    /// Grouping key used by heading merge: the first heading path entry.
    pub fn heading(&self) -> Heading {
        Heading::from_path(&self.headings)
    }
}

/// Why a file was skipped or only partially processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    UnresolvedExtension,
    UnsupportedType,
    SkippedMixedFormat,
    PartialPageFailure,
}

/// Non-fatal notice recorded by the loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub path: PathBuf,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_from_empty_path_is_untitled() {
        let heading = Heading::from_path(&[]);
        assert_eq!(heading, Heading::Untitled);
        assert_eq!(heading.as_str(), NO_HEADING);
    }

    #[test]
    fn test_heading_uses_first_entry_only() {
        let path = vec!["Intro".to_string(), "Scope".to_string()];
        assert_eq!(Heading::from_path(&path), Heading::Titled("Intro".to_string()));
    }

    #[test]
    fn test_blank_heading_is_untitled() {
        let path = vec!["   ".to_string()];
        assert!(!Heading::from_path(&path).is_titled());
    }

    #[test]
    fn test_segment_builder() {
        let segment = Segment::new("| a | b |", vec!["Sheet1".to_string()])
            .with_kind(SegmentKind::Table)
            .with_page(2)
            .with_attribute("rows", 1);

        assert_eq!(segment.kind, SegmentKind::Table);
        assert_eq!(segment.page_number, Some(2));
        assert_eq!(segment.attributes["rows"], serde_json::json!(1));
        assert_eq!(segment.heading().as_str(), "Sheet1");
    }

    #[test]
    fn test_chunk_heading_sentinel() {
        let chunk = Chunk::new("body", vec![]);
        assert_eq!(chunk.heading().to_string(), "no heading");
    }
}
