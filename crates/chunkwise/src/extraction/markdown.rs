//! Heading-aware markdown splitting.
//!
//! Markdown is cut into sections at headings up to a configurable depth. The
//! heading lines themselves are removed from section bodies and recorded as
//! the section's heading path (`header_1`, `header_2`, ...). Fenced code is
//! parsed with `pulldown-cmark`, so `#` lines inside code blocks never start a
//! section.

use crate::types::{Extraction, Metadata, Segment};
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use serde_json::Value;

/// Headings deeper than this stay inside the section body.
pub const DEFAULT_SPLIT_DEPTH: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownSection {
    /// Heading path, outermost first. Empty for text before the first heading.
    pub headings: Vec<String>,
    /// `(level, title)` pairs matching `headings`.
    pub levels: Vec<(usize, String)>,
    pub content: String,
}

/// Separate a leading YAML front matter block from the document.
///
/// Returns the parsed mapping (empty when absent or not a mapping) and the
/// remaining text. Malformed YAML leaves the text untouched.
pub fn split_front_matter(text: &str) -> (Metadata, &str) {
    let Some(rest) = text.strip_prefix("---\n").or_else(|| text.strip_prefix("---\r\n")) else {
        return (Metadata::new(), text);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let marker = line.trim_end();
        if marker == "---" || marker == "..." {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return match serde_yaml_ng::from_str::<Value>(yaml) {
                Ok(Value::Object(map)) => (map.into_iter().collect(), body),
                Ok(_) => (Metadata::new(), body),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring malformed front matter");
                    (Metadata::new(), text)
                }
            };
        }
        offset += line.len();
    }

    (Metadata::new(), text)
}

/// Split `text` at headings of level `1..=max_level`.
///
/// Sections whose body is blank are dropped.
pub fn split_by_headings(text: &str, max_level: usize) -> Vec<MarkdownSection> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);

    let mut path: Vec<Option<String>> = vec![None; max_level];
    let mut sections = Vec::new();
    let mut body_start = 0;
    let mut open_heading: Option<usize> = None;
    let mut title = String::new();

    for (event, range) in Parser::new_ext(text, options).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { level, .. }) if (level as usize) <= max_level => {
                push_section(&mut sections, &path, &text[body_start..range.start]);
                open_heading = Some(level as usize);
                title.clear();
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(level) = open_heading.take() {
                    path[level - 1] = Some(title.trim().to_string());
                    for deeper in path.iter_mut().skip(level) {
                        *deeper = None;
                    }
                    body_start = range.end;
                }
            }
            Event::Text(t) | Event::Code(t) if open_heading.is_some() => title.push_str(&t),
            Event::SoftBreak | Event::HardBreak if open_heading.is_some() => title.push(' '),
            _ => {}
        }
    }
    push_section(&mut sections, &path, &text[body_start..]);

    sections
}

fn push_section(sections: &mut Vec<MarkdownSection>, path: &[Option<String>], body: &str) {
    let content = body.trim();
    if content.is_empty() {
        return;
    }

    let levels: Vec<(usize, String)> = path
        .iter()
        .enumerate()
        .filter_map(|(idx, title)| title.as_ref().map(|t| (idx + 1, t.clone())))
        .collect();

    sections.push(MarkdownSection {
        headings: levels.iter().map(|(_, t)| t.clone()).collect(),
        levels,
        content: content.to_string(),
    });
}

/// Front matter plus heading sections as an [`Extraction`].
pub fn markdown_extraction(text: &str, max_level: usize) -> Extraction {
    let (attributes, body) = split_front_matter(text);

    let segments = split_by_headings(body, max_level)
        .into_iter()
        .map(|section| {
            let mut segment = Segment::new(section.content, section.headings);
            for (level, title) in section.levels {
                segment = segment.with_attribute(format!("header_{}", level), title);
            }
            segment
        })
        .collect();

    Extraction {
        segments,
        attributes,
        failed_pages: Vec::new(),
    }
}
