//! Word (DOCX) extraction by walking `word/document.xml`.
//!
//! Paragraph styles drive the heading path: `Title` sits above everything,
//! `Heading1`..`Heading9` (or any style or paragraph carrying
//! `w:outlineLvl`) nest below it. Body paragraphs between two headings form
//! one segment. Tables are flattened into ` | `-joined lines inside the
//! surrounding segment.
use crate::error::{ChunkwiseError, Result};
use crate::extraction::package::Package;
use crate::extraction::table::cells_to_lines;
use crate::types::{Extraction, Segment};
use once_cell::sync::Lazy;
use regex::Regex;
use roxmltree::{Document, Node};
use std::collections::HashMap;

const W_NAMESPACE: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";

/// Outline depth of the `Title` style.
const TITLE_LEVEL: u8 = 0;

static HEADING_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^heading\s?([1-9])$").expect("Heading style regex pattern is valid and should compile")
});

/// Outline levels keyed by style id, resolved from `word/styles.xml`.
#[derive(Debug, Default)]
struct StyleTable {
    levels: HashMap<String, u8>,
}

impl StyleTable {
    fn parse(xml: &str) -> Result<Self> {
        let doc = Document::parse(xml).map_err(|e| ChunkwiseError::parsing(format!("Failed to parse styles: {}", e)))?;

        let mut levels = HashMap::new();
        for style in doc.descendants().filter(|n| n.has_tag_name((W_NAMESPACE, "style"))) {
            let Some(id) = style.attribute((W_NAMESPACE, "styleId")) else {
                continue;
            };
            let name = child(&style, "name").and_then(|n| n.attribute((W_NAMESPACE, "val")));
            let outline = child(&style, "pPr")
                .and_then(|ppr| child(&ppr, "outlineLvl"))
                .and_then(|lvl| lvl.attribute((W_NAMESPACE, "val")))
                .and_then(|v| v.parse::<u8>().ok())
                .filter(|lvl| *lvl < 9);

            let level = outline
                .map(|lvl| lvl + 1)
                .or_else(|| name.and_then(style_name_level))
                .or_else(|| style_name_level(id));
            if let Some(level) = level {
                levels.insert(id.to_string(), level);
            }
        }
        Ok(Self { levels })
    }

    fn level_of(&self, style_id: &str) -> Option<u8> {
        self.levels.get(style_id).copied().or_else(|| style_name_level(style_id))
    }
}

fn style_name_level(name: &str) -> Option<u8> {
    if name.eq_ignore_ascii_case("title") {
        return Some(TITLE_LEVEL);
    }
    HEADING_STYLE
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u8>().ok())
}

#[derive(Default)]
struct SectionBuilder {
    path: Vec<(u8, String)>,
    body: Vec<String>,
    segments: Vec<Segment>,
}

impl SectionBuilder {
    fn heading(&mut self, level: u8, title: String) {
        self.flush();
        while self.path.last().is_some_and(|(depth, _)| *depth >= level) {
            self.path.pop();
        }
        self.path.push((level, title));
    }

    fn line(&mut self, text: String) {
        self.body.push(text);
    }

    fn flush(&mut self) {
        if self.body.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.body).join("\n");
        let headings = self.path.iter().map(|(_, title)| title.clone()).collect();
        self.segments.push(Segment::new(text, headings));
    }

    fn finish(mut self) -> Vec<Segment> {
        self.flush();
        self.segments
    }
}

/// Extract heading-scoped text segments from DOCX bytes.
pub fn extract_document(bytes: &[u8]) -> Result<Extraction> {
    let mut package = Package::open(bytes)?;
    let document_xml = package.require_part(DOCUMENT_PART)?;

    let styles = match package.read_part(STYLES_PART)? {
        Some(xml) => StyleTable::parse(&xml).unwrap_or_else(|e| {
            tracing::debug!("Ignoring unreadable styles part: {}", e);
            StyleTable::default()
        }),
        None => StyleTable::default(),
    };

    let doc = Document::parse(&document_xml)
        .map_err(|e| ChunkwiseError::parsing(format!("Failed to parse document.xml: {}", e)))?;
    let body = doc
        .descendants()
        .find(|n| n.has_tag_name((W_NAMESPACE, "body")))
        .ok_or_else(|| ChunkwiseError::parsing("No <w:body> element in document.xml"))?;

    let mut builder = SectionBuilder::default();
    walk_blocks(&body, &styles, &mut builder);

    Ok(Extraction {
        segments: builder.finish(),
        attributes: package.core_properties(),
        failed_pages: Vec::new(),
    })
}

fn walk_blocks(parent: &Node, styles: &StyleTable, builder: &mut SectionBuilder) {
    for node in parent.children().filter(|n| n.is_element()) {
        if node.tag_name().namespace() != Some(W_NAMESPACE) {
            continue;
        }
        match node.tag_name().name() {
            "p" => {
                let text = paragraph_text(&node);
                if text.is_empty() {
                    continue;
                }
                match paragraph_level(&node, styles) {
                    Some(level) => builder.heading(level, text),
                    None => builder.line(text),
                }
            }
            "tbl" => {
                let lines = cells_to_lines(&table_cells(&node));
                if !lines.is_empty() {
                    builder.line(lines);
                }
            }
            "sdt" => {
                if let Some(content) = child(&node, "sdtContent") {
                    walk_blocks(&content, styles, builder);
                }
            }
            _ => {}
        }
    }
}

fn paragraph_level(p: &Node, styles: &StyleTable) -> Option<u8> {
    let ppr = child(p, "pPr")?;

    if let Some(level) = child(&ppr, "outlineLvl")
        .and_then(|lvl| lvl.attribute((W_NAMESPACE, "val")))
        .and_then(|v| v.parse::<u8>().ok())
        .filter(|lvl| *lvl < 9)
    {
        return Some(level + 1);
    }

    child(&ppr, "pStyle")
        .and_then(|style| style.attribute((W_NAMESPACE, "val")))
        .and_then(|id| styles.level_of(id))
}

fn paragraph_text(p: &Node) -> String {
    let mut text = String::new();
    for node in p.descendants().filter(|n| n.is_element()) {
        if node.tag_name().namespace() != Some(W_NAMESPACE) {
            continue;
        }
        match node.tag_name().name() {
            "t" => {
                if let Some(t) = node.text() {
                    text.push_str(t);
                }
            }
            "tab" => text.push('\t'),
            "br" | "cr" => text.push('\n'),
            _ => {}
        }
    }
    text.trim().to_string()
}

fn table_cells(tbl: &Node) -> Vec<Vec<String>> {
    tbl.children()
        .filter(|n| n.has_tag_name((W_NAMESPACE, "tr")))
        .map(|tr| {
            tr.children()
                .filter(|n| n.has_tag_name((W_NAMESPACE, "tc")))
                .map(|tc| {
                    tc.children()
                        .filter(|n| n.has_tag_name((W_NAMESPACE, "p")))
                        .map(|p| paragraph_text(&p))
                        .filter(|t| !t.is_empty())
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect()
        })
        .collect()
}

fn child<'a, 'input>(node: &Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name((W_NAMESPACE, name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    fn para(style: Option<&str>, text: &str) -> String {
        let ppr = style
            .map(|s| format!(r#"<w:pPr><w:pStyle w:val="{}"/></w:pPr>"#, s))
            .unwrap_or_default();
        format!("<w:p>{}<w:r><w:t>{}</w:t></w:r></w:p>", ppr, text)
    }

    fn build_docx(body: &str, styles: Option<&str>) -> Vec<u8> {
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="{}"><w:body>{}</w:body></w:document>"#,
            W_NAMESPACE, body
        );
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut cursor);
            zip.start_file(DOCUMENT_PART, SimpleFileOptions::default()).unwrap();
            zip.write_all(document.as_bytes()).unwrap();
            if let Some(styles) = styles {
                zip.start_file(STYLES_PART, SimpleFileOptions::default()).unwrap();
                zip.write_all(styles.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_heading_styles_build_path() {
        let body = [
            para(Some("Title"), "Handbook"),
            para(None, "Preface text."),
            para(Some("Heading1"), "Policies"),
            para(None, "Be kind."),
            para(Some("Heading2"), "Leave"),
            para(None, "Twenty days."),
            para(Some("Heading1"), "Tools"),
            para(None, "Use the wiki."),
        ]
        .concat();

        let extraction = extract_document(&build_docx(&body, None)).unwrap();
        let paths: Vec<Vec<String>> = extraction.segments.iter().map(|s| s.headings.clone()).collect();
        assert_eq!(
            paths,
            vec![
                vec!["Handbook".to_string()],
                vec!["Handbook".to_string(), "Policies".to_string()],
                vec!["Handbook".to_string(), "Policies".to_string(), "Leave".to_string()],
                vec!["Handbook".to_string(), "Tools".to_string()],
            ]
        );
        assert_eq!(extraction.segments[2].text, "Twenty days.");
    }

    #[test]
    fn test_custom_style_ids_resolve_through_styles_part() {
        let styles = format!(
            r#"<w:styles xmlns:w="{}">
                <w:style w:type="paragraph" w:styleId="berschrift1"><w:name w:val="heading 1"/></w:style>
                <w:style w:type="paragraph" w:styleId="Chapter"><w:name w:val="Chapter"/><w:pPr><w:outlineLvl w:val="0"/></w:pPr></w:style>
            </w:styles>"#,
            W_NAMESPACE
        );
        let body = [
            para(Some("berschrift1"), "Einleitung"),
            para(None, "Text eins."),
            para(Some("Chapter"), "Anhang"),
            para(None, "Text zwei."),
        ]
        .concat();

        let extraction = extract_document(&build_docx(&body, Some(&styles))).unwrap();
        assert_eq!(extraction.segments[0].headings, vec!["Einleitung".to_string()]);
        assert_eq!(extraction.segments[1].headings, vec!["Anhang".to_string()]);
    }

    #[test]
    fn test_out_of_range_outline_level_is_ignored() {
        let styles = format!(
            r#"<w:styles xmlns:w="{}">
                <w:style w:type="paragraph" w:styleId="Odd"><w:name w:val="Odd"/><w:pPr><w:outlineLvl w:val="255"/></w:pPr></w:style>
                <w:style w:type="paragraph" w:styleId="Sub"><w:name w:val="heading 2"/><w:pPr><w:outlineLvl w:val="200"/></w:pPr></w:style>
            </w:styles>"#,
            W_NAMESPACE
        );
        let body = [
            para(Some("Heading1"), "Policy"),
            para(Some("Odd"), "Still body text."),
            para(Some("Sub"), "Details"),
            para(None, "Nested text."),
        ]
        .concat();

        let table = StyleTable::parse(&styles).unwrap();
        assert_eq!(table.level_of("Odd"), None);
        assert_eq!(table.level_of("Sub"), Some(2));

        let extraction = extract_document(&build_docx(&body, Some(&styles))).unwrap();
        assert_eq!(extraction.segments[0].headings, vec!["Policy".to_string()]);
        assert_eq!(extraction.segments[0].text, "Still body text.");
        assert_eq!(
            extraction.segments[1].headings,
            vec!["Policy".to_string(), "Details".to_string()]
        );
    }

    #[test]
    fn test_table_rows_are_flattened() {
        let table = r#"<w:tbl>
            <w:tr><w:tc><w:p><w:r><w:t>Name</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>Role</w:t></w:r></w:p></w:tc></w:tr>
            <w:tr><w:tc><w:p><w:r><w:t>Ada</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>Engineer</w:t></w:r></w:p></w:tc></w:tr>
        </w:tbl>"#;
        let body = format!("{}{}{}", para(Some("Heading1"), "Team"), table, para(None, "After."));

        let extraction = extract_document(&build_docx(&body, None)).unwrap();
        assert_eq!(extraction.segments.len(), 1);
        assert_eq!(extraction.segments[0].text, "Name | Role\nAda | Engineer\nAfter.");
    }

    #[test]
    fn test_untitled_content() {
        let extraction = extract_document(&build_docx(&para(None, "Just text."), None)).unwrap();
        assert!(extraction.segments[0].headings.is_empty());
    }

    #[test]
    fn test_missing_document_part() {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut cursor);
            zip.start_file("other.xml", SimpleFileOptions::default()).unwrap();
            zip.finish().unwrap();
        }
        let err = extract_document(&cursor.into_inner()).unwrap_err();
        assert!(matches!(err, ChunkwiseError::Parsing { .. }));
    }

    #[test]
    fn test_style_name_level() {
        assert_eq!(style_name_level("Title"), Some(0));
        assert_eq!(style_name_level("Heading3"), Some(3));
        assert_eq!(style_name_level("heading 2"), Some(2));
        assert_eq!(style_name_level("Normal"), None);
    }
}
