//! PowerPoint (PPTX) extraction by reading the Office Open XML parts directly.
//!
//! Slides are visited in presentation order (the `sldIdLst` of
//! `ppt/presentation.xml`, resolved through its relationships). Each slide
//! yields a slide segment whose heading is the slide title and whose page
//! number is the slide number. Tables inside graphic frames become separate
//! table segments under the same heading.
//!
//! A slide whose XML cannot be read is recorded as a failed page; the other
//! slides are still returned.
use crate::error::{ChunkwiseError, Result};
use crate::extraction::package::{Package, resolve_target};
use crate::extraction::table::cells_to_markdown;
use crate::types::{Extraction, PageFailure, Segment, SegmentKind};
use roxmltree::{Document, Node};
use std::collections::HashMap;

const P_NAMESPACE: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const A_NAMESPACE: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const RELS_NAMESPACE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const TABLE_URI: &str = "http://schemas.openxmlformats.org/drawingml/2006/table";

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PART: &str = "ppt/_rels/presentation.xml.rels";

#[derive(Debug, Default)]
struct Slide {
    title: Option<String>,
    paragraphs: Vec<String>,
    tables: Vec<Vec<Vec<String>>>,
}

impl Slide {
    fn into_segments(self, slide_number: usize) -> Vec<Segment> {
        let title = self.title.or_else(|| self.paragraphs.first().cloned());
        let headings: Vec<String> = title.iter().cloned().collect();

        let mut segments = Vec::with_capacity(1 + self.tables.len());

        let body = if self.paragraphs.is_empty() {
            title.clone().unwrap_or_default()
        } else {
            self.paragraphs.join("\n")
        };
        if !body.trim().is_empty() {
            segments.push(
                Segment::new(body, headings.clone())
                    .with_kind(SegmentKind::Slide)
                    .with_page(slide_number)
                    .with_attribute("slide_number", slide_number),
            );
        }

        for rows in self.tables {
            let markdown = cells_to_markdown(&rows);
            if markdown.is_empty() {
                continue;
            }
            segments.push(
                Segment::new(markdown, headings.clone())
                    .with_kind(SegmentKind::Table)
                    .with_page(slide_number)
                    .with_attribute("slide_number", slide_number),
            );
        }

        segments
    }
}

/// Extract slide and table segments from PPTX bytes.
pub fn extract_presentation(bytes: &[u8]) -> Result<Extraction> {
    let mut package = Package::open(bytes)?;
    let slide_paths = slide_order(&mut package)?;

    if slide_paths.is_empty() {
        return Err(ChunkwiseError::parsing("Presentation contains no slides"));
    }

    let mut extraction = Extraction {
        attributes: package.core_properties(),
        ..Default::default()
    };
    for (index, path) in slide_paths.iter().enumerate() {
        let slide_number = index + 1;
        let parsed = package.require_part(path).and_then(|xml| parse_slide(&xml));

        match parsed {
            Ok(slide) => extraction.segments.extend(slide.into_segments(slide_number)),
            Err(e) => {
                tracing::warn!(slide = slide_number, error = %e, "Skipping unreadable slide");
                extraction.failed_pages.push(PageFailure {
                    page_number: slide_number,
                    reason: e.to_string(),
                });
            }
        }
    }

    extraction
        .attributes
        .insert("slide_count".to_string(), serde_json::Value::from(slide_paths.len()));
    Ok(extraction)
}

fn slide_order(package: &mut Package<'_>) -> Result<Vec<String>> {
    let presentation = package.read_part(PRESENTATION_PART)?;
    let rels = package.read_part(PRESENTATION_RELS_PART)?;

    if let (Some(presentation), Some(rels)) = (presentation, rels)
        && let Ok(paths) = ordered_slide_paths(&presentation, &rels)
        && !paths.is_empty()
    {
        return Ok(paths);
    }

    let mut numbered: Vec<(usize, String)> = package
        .part_names()
        .into_iter()
        .filter_map(|name| {
            let number = name
                .strip_prefix("ppt/slides/slide")?
                .strip_suffix(".xml")?
                .parse::<usize>()
                .ok()?;
            Some((number, name))
        })
        .collect();
    numbered.sort();
    Ok(numbered.into_iter().map(|(_, name)| name).collect())
}

fn ordered_slide_paths(presentation_xml: &str, rels_xml: &str) -> Result<Vec<String>> {
    let rels_doc = Document::parse(rels_xml)
        .map_err(|e| ChunkwiseError::parsing(format!("Failed to parse presentation rels: {}", e)))?;

    let targets: HashMap<&str, &str> = rels_doc
        .descendants()
        .filter(|n| n.has_tag_name("Relationship"))
        .filter(|n| n.attribute("Type").is_some_and(|t| t.ends_with("/slide")))
        .filter_map(|n| Some((n.attribute("Id")?, n.attribute("Target")?)))
        .collect();

    let doc = Document::parse(presentation_xml)
        .map_err(|e| ChunkwiseError::parsing(format!("Failed to parse presentation: {}", e)))?;

    Ok(doc
        .descendants()
        .filter(|n| n.has_tag_name((P_NAMESPACE, "sldId")))
        .filter_map(|n| n.attribute((RELS_NAMESPACE, "id")))
        .filter_map(|id| targets.get(id))
        .map(|target| resolve_target(PRESENTATION_PART, target))
        .collect())
}

fn parse_slide(xml: &str) -> Result<Slide> {
    let doc = Document::parse(xml).map_err(|e| ChunkwiseError::parsing(format!("Failed to parse slide XML: {}", e)))?;

    let sp_tree = doc
        .descendants()
        .find(|n| n.has_tag_name((P_NAMESPACE, "spTree")))
        .ok_or_else(|| ChunkwiseError::parsing("No <p:spTree> tag found"))?;

    let mut slide = Slide::default();
    collect_shapes(&sp_tree, &mut slide);
    Ok(slide)
}

fn collect_shapes(parent: &Node, slide: &mut Slide) {
    for node in parent.children().filter(|n| n.is_element()) {
        if node.tag_name().namespace() != Some(P_NAMESPACE) {
            continue;
        }

        match node.tag_name().name() {
            "sp" => {
                let Some(tx_body) = child(&node, P_NAMESPACE, "txBody") else {
                    continue;
                };
                let paragraphs = paragraphs(&tx_body);
                if paragraphs.is_empty() {
                    continue;
                }
                if slide.title.is_none() && is_title_placeholder(&node) {
                    slide.title = Some(paragraphs.join(" "));
                } else {
                    slide.paragraphs.extend(paragraphs);
                }
            }
            "graphicFrame" => {
                if let Some(rows) = parse_table(&node) {
                    slide.tables.push(rows);
                }
            }
            "grpSp" => collect_shapes(&node, slide),
            _ => {}
        }
    }
}

fn is_title_placeholder(sp: &Node) -> bool {
    sp.descendants()
        .find(|n| n.has_tag_name((P_NAMESPACE, "ph")))
        .and_then(|ph| ph.attribute("type"))
        .is_some_and(|kind| kind == "title" || kind == "ctrTitle")
}

fn parse_table(frame: &Node) -> Option<Vec<Vec<String>>> {
    let graphic_data = frame
        .descendants()
        .find(|n| n.has_tag_name((A_NAMESPACE, "graphicData")) && n.attribute("uri") == Some(TABLE_URI))?;
    let tbl = child(&graphic_data, A_NAMESPACE, "tbl")?;

    let rows: Vec<Vec<String>> = tbl
        .children()
        .filter(|n| n.has_tag_name((A_NAMESPACE, "tr")))
        .map(|tr| {
            tr.children()
                .filter(|n| n.has_tag_name((A_NAMESPACE, "tc")))
                .map(|tc| {
                    child(&tc, A_NAMESPACE, "txBody")
                        .map(|body| paragraphs(&body).join(" "))
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    if rows.is_empty() { None } else { Some(rows) }
}

/// Non-blank paragraph texts of a text body, runs and fields concatenated.
fn paragraphs(tx_body: &Node) -> Vec<String> {
    tx_body
        .children()
        .filter(|n| n.has_tag_name((A_NAMESPACE, "p")))
        .map(|p| {
            let mut text = String::new();
            for piece in p.children().filter(|n| n.is_element()) {
                match piece.tag_name().name() {
                    "r" | "fld" => {
                        if let Some(t) = child(&piece, A_NAMESPACE, "t").and_then(|t| t.text()) {
                            text.push_str(t);
                        }
                    }
                    "br" => text.push(' '),
                    _ => {}
                }
            }
            text.trim().to_string()
        })
        .filter(|text| !text.is_empty())
        .collect()
}

fn child<'a, 'input>(node: &Node<'a, 'input>, namespace: &str, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name((namespace, name)))
}
