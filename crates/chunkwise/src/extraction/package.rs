//! Read access to Office Open XML packages (`.docx`, `.pptx`).
//!
//! A package is a zip archive of XML parts. Only in-memory packages are
//! supported; callers read the file once and hand the bytes over.

use crate::error::{ChunkwiseError, Result};
use crate::types::Metadata;
use std::io::{Cursor, Read};
use zip::ZipArchive;

const CORE_PROPERTIES_PART: &str = "docProps/core.xml";

/// Core properties copied into document attributes, as `(element, attribute)`.
const CORE_PROPERTY_KEYS: &[(&str, &str)] = &[
    ("title", "title"),
    ("subject", "subject"),
    ("creator", "author"),
    ("keywords", "keywords"),
    ("created", "created"),
    ("modified", "modified"),
    ("language", "language"),
];

pub struct Package<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> Package<'a> {
    pub fn open(bytes: &'a [u8]) -> Result<Self> {
        let archive = match ZipArchive::new(Cursor::new(bytes)) {
            Ok(archive) => archive,
            Err(zip::result::ZipError::Io(io_err)) => return Err(io_err.into()),
            Err(e) => {
                return Err(ChunkwiseError::parsing(format!(
                    "Failed to read Office package (invalid format): {}",
                    e
                )));
            }
        };
        Ok(Self { archive })
    }

    /// UTF-8 contents of a part, `None` when the package has no such part.
    pub fn read_part(&mut self, name: &str) -> Result<Option<String>> {
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut contents = String::new();
        file.read_to_string(&mut contents).map_err(|e| {
            if e.kind() == std::io::ErrorKind::InvalidData {
                ChunkwiseError::parsing(format!("Part {} is not valid UTF-8", name))
            } else {
                ChunkwiseError::Io(e)
            }
        })?;
        Ok(Some(contents))
    }

    /// Like [`read_part`](Self::read_part), but a missing part is an error.
    pub fn require_part(&mut self, name: &str) -> Result<String> {
        self.read_part(name)?
            .ok_or_else(|| ChunkwiseError::parsing(format!("Missing part {} in Office package", name)))
    }

    pub fn part_names(&self) -> Vec<String> {
        self.archive.file_names().map(str::to_string).collect()
    }

    /// Selected `docProps/core.xml` fields. Missing or malformed properties
    /// yield an empty map.
    pub fn core_properties(&mut self) -> Metadata {
        let mut attributes = Metadata::new();

        let xml = match self.read_part(CORE_PROPERTIES_PART) {
            Ok(Some(xml)) => xml,
            Ok(None) => return attributes,
            Err(e) => {
                tracing::debug!("Core properties unreadable: {}", e);
                return attributes;
            }
        };
        let Ok(doc) = roxmltree::Document::parse(&xml) else {
            tracing::debug!("Core properties are not well-formed XML");
            return attributes;
        };

        for (element, key) in CORE_PROPERTY_KEYS {
            if let Some(value) = doc
                .root_element()
                .children()
                .find(|n| n.tag_name().name() == *element)
                .and_then(|n| n.text())
                .map(str::trim)
                .filter(|v| !v.is_empty())
            {
                attributes.insert((*key).to_string(), serde_json::Value::from(value));
            }
        }
        attributes
    }
}

/// Resolve a relationship target against the directory of its source part.
///
/// `("ppt/presentation.xml", "slides/slide1.xml")` gives `ppt/slides/slide1.xml`;
/// absolute targets (`/ppt/...`) are taken from the package root.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut parts: Vec<&str> = source_part.split('/').collect();
    parts.pop();
    for piece in target.split('/') {
        match piece {
            ".." => {
                parts.pop();
            }
            "." | "" => {}
            other => parts.push(other),
        }
    }
    parts.join("/")
}
