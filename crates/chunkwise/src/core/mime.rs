//! Content type resolution from file names.
//!
//! Resolution is purely extension based and case-insensitive. No content
//! sniffing happens here, so a mislabeled file resolves to the type its
//! extension claims.

use crate::{ChunkwiseError, Result};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::path::Path;

pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const DOCX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const LEGACY_WORD_MIME_TYPE: &str = "application/msword";
pub const POWER_POINT_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";
pub const LEGACY_POWERPOINT_MIME_TYPE: &str = "application/vnd.ms-powerpoint";
pub const EXCEL_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const EXCEL_BINARY_MIME_TYPE: &str = "application/vnd.ms-excel";
pub const HTML_MIME_TYPE: &str = "text/html";
pub const MARKDOWN_MIME_TYPE: &str = "text/markdown";
pub const PLAIN_TEXT_MIME_TYPE: &str = "text/plain";

static EXT_TO_MIME: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();

    m.insert("txt", PLAIN_TEXT_MIME_TYPE);
    m.insert("md", MARKDOWN_MIME_TYPE);
    m.insert("markdown", MARKDOWN_MIME_TYPE);
    m.insert("htm", HTML_MIME_TYPE);
    m.insert("html", HTML_MIME_TYPE);
    m.insert("xhtml", "application/xhtml+xml");
    m.insert("xml", "application/xml");
    m.insert("jsonld", "application/ld+json");
    m.insert("css", "text/css");
    m.insert("js", "text/javascript");
    m.insert("sh", "application/x-sh");
    m.insert("url", "text/x-uri");
    m.insert("text_embedding", "float[]");
    m.insert("json", "application/json");
    m.insert("csv", "text/csv");
    m.insert("rtf", "application/rtf");

    m.insert("bmp", "image/bmp");
    m.insert("gif", "image/gif");
    m.insert("jpeg", "image/jpeg");
    m.insert("jpg", "image/jpeg");
    m.insert("png", "image/png");
    m.insert("tiff", "image/tiff");
    m.insert("tif", "image/tiff");
    m.insert("webp", "image/webp");
    m.insert("svg", "image/svg+xml");

    m.insert("pdf", PDF_MIME_TYPE);
    m.insert("doc", LEGACY_WORD_MIME_TYPE);
    m.insert("docx", DOCX_MIME_TYPE);
    m.insert("ppt", LEGACY_POWERPOINT_MIME_TYPE);
    m.insert("pptx", POWER_POINT_MIME_TYPE);
    m.insert("xls", EXCEL_BINARY_MIME_TYPE);
    m.insert("xlsx", EXCEL_MIME_TYPE);
    m.insert("odt", "application/vnd.oasis.opendocument.text");
    m.insert("ods", "application/vnd.oasis.opendocument.spreadsheet");
    m.insert("odp", "application/vnd.oasis.opendocument.presentation");
    m.insert("epub", "application/epub+zip");

    m.insert("aac", "audio/aac");
    m.insert("mp3", "audio/mpeg");
    m.insert("wav", "audio/wav");
    m.insert("oga", "audio/ogg");
    m.insert("opus", "audio/opus");
    m.insert("weba", "audio/webm");
    m.insert("mp4", "video/mp4");
    m.insert("mpeg", "video/mpeg");
    m.insert("ogv", "video/ogg");
    m.insert("ogx", "application/ogg");
    m.insert("webm", "video/webm");

    m.insert("tar", "application/x-tar");
    m.insert("gz", "application/gzip");
    m.insert("zip", "application/zip");
    m.insert("rar", "application/vnd.rar");
    m.insert("7z", "application/x-7z-compressed");

    m
});

/// Content types the pipeline processes. Each one must map to a format family.
pub static SUPPORTED_MIME_TYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    let mut set = HashSet::new();

    set.insert(PDF_MIME_TYPE);
    set.insert(POWER_POINT_MIME_TYPE);
    set.insert(LEGACY_POWERPOINT_MIME_TYPE);
    set.insert(DOCX_MIME_TYPE);
    set.insert(LEGACY_WORD_MIME_TYPE);
    set.insert(MARKDOWN_MIME_TYPE);
    set.insert(EXCEL_MIME_TYPE);
    set.insert(EXCEL_BINARY_MIME_TYPE);
    set.insert(HTML_MIME_TYPE);
    set.insert(PLAIN_TEXT_MIME_TYPE);

    set
});

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension().and_then(|ext| ext.to_str()).map(|s| s.to_lowercase())
}

/// Resolve the content type of `path` from its extension.
///
/// # Errors
///
/// Returns `ChunkwiseError::UnresolvedExtension` when the path has no
/// extension or the extension is unknown.
pub fn resolve(path: impl AsRef<Path>) -> Result<&'static str> {
    let path = path.as_ref();
    try_resolve(path).ok_or_else(|| {
        ChunkwiseError::UnresolvedExtension(match lowercase_extension(path) {
            Some(ext) => format!("Unknown extension .{} for {}", ext, path.display()),
            None => format!("No file extension on {}", path.display()),
        })
    })
}

/// Same lookup as [`resolve`], returning `None` instead of an error.
pub fn try_resolve(path: impl AsRef<Path>) -> Option<&'static str> {
    let ext = lowercase_extension(path.as_ref())?;
    EXT_TO_MIME.get(ext.as_str()).copied()
}

/// Whether the file at `path` would be processed. Never fails.
pub fn is_supported(path: impl AsRef<Path>) -> bool {
    try_resolve(path).is_some_and(is_supported_mime)
}

pub fn is_supported_mime(mime_type: &str) -> bool {
    SUPPORTED_MIME_TYPES.contains(mime_type)
}

/// Resolve `path` and require the result to be supported.
///
/// # Errors
///
/// `UnresolvedExtension` for unknown extensions, `UnsupportedFormat` for
/// known content types outside the supported set.
pub fn resolve_supported(path: impl AsRef<Path>) -> Result<&'static str> {
    let mime_type = resolve(path)?;
    if is_supported_mime(mime_type) {
        Ok(mime_type)
    } else {
        Err(ChunkwiseError::UnsupportedFormat(mime_type.to_string()))
    }
}
