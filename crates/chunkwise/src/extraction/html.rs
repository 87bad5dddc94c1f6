//! HTML extraction through `html-to-markdown-rs`.
//!
//! The page is converted to markdown (with document metadata emitted as YAML
//! front matter) and then segmented like any markdown document. All six
//! heading levels feed the heading path.
use crate::error::{ChunkwiseError, Result};
use crate::extraction::markdown::markdown_extraction;
use crate::types::{Extraction, Metadata};
use html_to_markdown_rs::{ConversionOptions, PreprocessingOptions, convert as convert_html};
use std::{any::Any, thread};

const LARGE_HTML_STACK_THRESHOLD_BYTES: usize = 512 * 1024;
const HTML_CONVERSION_STACK_SIZE_BYTES: usize = 16 * 1024 * 1024;

const HTML_HEADING_DEPTH: usize = 6;

/// Front matter keys emitted by the converter and the attribute they map to.
const METADATA_KEYS: &[(&str, &str)] = &[
    ("title", "title"),
    ("meta-description", "description"),
    ("meta-author", "author"),
    ("meta-keywords", "keywords"),
    ("canonical", "canonical_url"),
    ("language", "language"),
];

fn conversion_options() -> ConversionOptions {
    ConversionOptions {
        extract_metadata: true,
        hocr_spatial_tables: false,
        preprocessing: PreprocessingOptions {
            enabled: false,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn html_requires_large_stack(len: usize) -> bool {
    len >= LARGE_HTML_STACK_THRESHOLD_BYTES
}

fn convert_html_with_options(html: &str, options: ConversionOptions) -> Result<String> {
    convert_html(html, Some(options))
        .map_err(|e| ChunkwiseError::parsing(format!("Failed to convert HTML to Markdown: {}", e)))
}

fn run_on_dedicated_stack<T, F>(job: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let handle = thread::Builder::new()
        .name("chunkwise-html-conversion".to_string())
        .stack_size(HTML_CONVERSION_STACK_SIZE_BYTES)
        .spawn(job)
        .map_err(|err| ChunkwiseError::Other(format!("Failed to spawn HTML conversion thread: {}", err)))?;

    match handle.join() {
        Ok(result) => result,
        Err(panic) => Err(ChunkwiseError::Other(format!(
            "HTML conversion panicked: {}",
            panic_reason(&panic)
        ))),
    }
}

fn panic_reason(panic: &Box<dyn Any + Send + 'static>) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Convert HTML to markdown. Deeply nested documents are converted on a
/// thread with a larger stack.
pub fn convert_html_to_markdown(html: &str) -> Result<String> {
    let options = conversion_options();
    if html_requires_large_stack(html.len()) {
        let owned = html.to_string();
        run_on_dedicated_stack(move || convert_html_with_options(&owned, options))
    } else {
        convert_html_with_options(html, options)
    }
}

/// Convert and segment an HTML page.
pub fn extract_html(html: &str) -> Result<Extraction> {
    let markdown = convert_html_to_markdown(html)?;
    let mut extraction = markdown_extraction(&markdown, HTML_HEADING_DEPTH);
    extraction.attributes = normalize_metadata(extraction.attributes);
    Ok(extraction)
}

fn normalize_metadata(front_matter: Metadata) -> Metadata {
    let mut attributes = Metadata::new();
    for (source, target) in METADATA_KEYS {
        if let Some(value) = front_matter.get(*source) {
            attributes.insert((*target).to_string(), value.clone());
        }
    }
    attributes
}
