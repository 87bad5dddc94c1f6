//! PDF text extraction using `lopdf`.
//!
//! Text is pulled page by page so a single unreadable page does not sink the
//! document. Running headers and footers are removed afterwards by
//! [`remove_page_furniture`].

use super::error::{PdfError, Result};
use lopdf::{Document, ObjectId};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};

/// How many lines at the top and bottom of a page may be furniture.
const FURNITURE_WINDOW: usize = 2;

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("Digit regex pattern is valid and should compile"));

/// Lines of one page, right-trimmed. Blank lines are kept as paragraph breaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// 1-based.
    pub page_number: usize,
    pub lines: Vec<String>,
}

impl PageText {
    pub fn from_text(page_number: usize, text: &str) -> Self {
        Self {
            page_number,
            lines: text.lines().map(|line| line.trim_end().to_string()).collect(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }
}

pub struct PdfTextExtractor {
    document: Document,
    pages: BTreeMap<u32, ObjectId>,
}

impl PdfTextExtractor {
    pub fn load(pdf_bytes: &[u8]) -> Result<Self> {
        let document = Document::load_mem(pdf_bytes)?;
        let pages = document.get_pages();
        if pages.is_empty() {
            return Err(PdfError::EmptyDocument);
        }
        Ok(Self { document, pages })
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// 1-based page numbers in document order.
    pub fn page_numbers(&self) -> Vec<usize> {
        self.pages.keys().map(|n| *n as usize).collect()
    }

    pub fn page_id(&self, page_number: usize) -> Result<ObjectId> {
        u32::try_from(page_number)
            .ok()
            .and_then(|n| self.pages.get(&n).copied())
            .ok_or(PdfError::PageNotFound(page_number))
    }

    pub fn page_text(&self, page_number: usize) -> Result<PageText> {
        let number = u32::try_from(page_number).map_err(|_| PdfError::PageNotFound(page_number))?;
        if !self.pages.contains_key(&number) {
            return Err(PdfError::PageNotFound(page_number));
        }
        let text = self
            .document
            .extract_text(&[number])
            .map_err(|e| PdfError::TextExtractionFailed(format!("page {}: {}", page_number, e)))?;
        Ok(PageText::from_text(page_number, &text))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

fn furniture_key(line: &str) -> String {
    let normalized = DIGITS.replace_all(line.trim(), "#");
    normalized.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Indices of the first and last non-blank lines that may hold furniture.
fn edge_lines(page: &PageText) -> Vec<usize> {
    let content: Vec<usize> = page
        .lines
        .iter()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, _)| idx)
        .collect();

    let mut edges: Vec<usize> = content.iter().take(FURNITURE_WINDOW).copied().collect();
    for idx in content.iter().rev().take(FURNITURE_WINDOW) {
        if !edges.contains(idx) {
            edges.push(*idx);
        }
    }
    edges
}

/// Remove running headers and footers.
///
/// A line near the top or bottom of a page is furniture when the same line,
/// compared with digits masked (so `Page 3` matches `Page 4`), sits near the
/// edge of at least `min_repeats` pages. Returns the number of lines removed.
pub fn remove_page_furniture(pages: &mut [PageText], min_repeats: usize) -> usize {
    if min_repeats < 2 || pages.len() < min_repeats {
        return 0;
    }

    let mut page_counts: HashMap<String, usize> = HashMap::new();
    for page in pages.iter() {
        let keys: HashSet<String> = edge_lines(page)
            .into_iter()
            .map(|idx| furniture_key(&page.lines[idx]))
            .collect();
        for key in keys {
            *page_counts.entry(key).or_default() += 1;
        }
    }

    let mut removed = 0;
    for page in pages.iter_mut() {
        let doomed: HashSet<usize> = edge_lines(page)
            .into_iter()
            .filter(|idx| page_counts.get(&furniture_key(&page.lines[*idx])).copied().unwrap_or(0) >= min_repeats)
            .collect();
        if doomed.is_empty() {
            continue;
        }
        removed += doomed.len();
        page.lines = page
            .lines
            .iter()
            .enumerate()
            .filter(|(idx, _)| !doomed.contains(idx))
            .map(|(_, line)| line.clone())
            .collect();
    }

    if removed > 0 {
        tracing::debug!(removed, "Removed running headers and footers");
    }
    removed
}
