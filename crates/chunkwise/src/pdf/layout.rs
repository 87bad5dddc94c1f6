//! Segmentation of PDF page text.
//!
//! PDF text carries no heading markup, so headings are guessed from the
//! line itself: numbered section titles (`2.1 Results`) nest by their number
//! depth, short all-caps lines open a top-level section. Prose lines are
//! grouped into paragraphs that never cross a page boundary.

use super::table::{Block, detect_tables};
use super::text::PageText;
use crate::extraction::table::cells_to_markdown;
use crate::types::{Segment, SegmentKind};
use once_cell::sync::Lazy;
use regex::Regex;

static NUMBERED_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}(?:\.\d{1,2}){0,4})\.?\s+(\p{Lu}.*)$")
        .expect("Numbered heading regex pattern is valid and should compile")
});

const MAX_HEADING_CHARS: usize = 80;
const MAX_CAPS_HEADING_WORDS: usize = 8;
const MIN_CAPS_HEADING_LETTERS: usize = 4;

/// Heading level of `line`, or `None` for prose.
pub fn heading_level(line: &str) -> Option<usize> {
    let line = line.trim();
    if line.is_empty() || line.chars().count() > MAX_HEADING_CHARS {
        return None;
    }
    if line.ends_with(['.', ',', ';', ':']) {
        return None;
    }

    if let Some(caps) = NUMBERED_HEADING.captures(line) {
        let depth = caps.get(1).map(|m| m.as_str().split('.').count()).unwrap_or(1);
        return Some(depth);
    }

    let letters: Vec<char> = line.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() >= MIN_CAPS_HEADING_LETTERS
        && letters.iter().all(|c| c.is_uppercase())
        && line.split_whitespace().count() <= MAX_CAPS_HEADING_WORDS
    {
        return Some(1);
    }

    None
}

struct Segmenter {
    path: Vec<(usize, String)>,
    paragraph: Vec<String>,
    segments: Vec<Segment>,
}

impl Segmenter {
    fn headings(&self) -> Vec<String> {
        self.path.iter().map(|(_, title)| title.clone()).collect()
    }

    fn flush(&mut self, page_number: usize) {
        if self.paragraph.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.paragraph).join("\n");
        let segment = Segment::new(text, self.headings()).with_page(page_number);
        self.segments.push(segment);
    }

    fn heading(&mut self, level: usize, title: &str, page_number: usize) {
        self.flush(page_number);
        while self.path.last().is_some_and(|(depth, _)| *depth >= level) {
            self.path.pop();
        }
        self.path.push((level, title.to_string()));
    }

    fn table(&mut self, rows: &[Vec<String>], page_number: usize) {
        self.flush(page_number);
        let markdown = cells_to_markdown(rows);
        if !markdown.is_empty() {
            let segment = Segment::new(markdown, self.headings())
                .with_kind(SegmentKind::Table)
                .with_page(page_number);
            self.segments.push(segment);
        }
    }
}

/// Turn page lines into text and table segments carrying heading paths.
///
/// The heading path continues across pages; paragraphs do not.
pub fn segment_pages(pages: &[PageText], table_structure: bool) -> Vec<Segment> {
    let mut segmenter = Segmenter {
        path: Vec::new(),
        paragraph: Vec::new(),
        segments: Vec::new(),
    };

    for page in pages {
        let blocks = if table_structure {
            detect_tables(&page.lines)
        } else {
            page.lines.iter().cloned().map(Block::Line).collect()
        };

        for block in blocks {
            match block {
                Block::Table(rows) => segmenter.table(&rows, page.page_number),
                Block::Line(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        segmenter.flush(page.page_number);
                    } else if let Some(level) = heading_level(trimmed) {
                        segmenter.heading(level, trimmed, page.page_number);
                    } else {
                        segmenter.paragraph.push(trimmed.to_string());
                    }
                }
            }
        }
        segmenter.flush(page.page_number);
    }

    segmenter.segments
}
