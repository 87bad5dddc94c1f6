//! Document information dictionary of a PDF.

use crate::types::Metadata;
use lopdf::{Dictionary, Document, Object};
use serde_json::Value;

/// Info dictionary keys and the attribute names they are stored under.
const INFO_FIELDS: &[(&[u8], &str)] = &[
    (b"Title", "title"),
    (b"Subject", "subject"),
    (b"Author", "author"),
    (b"Keywords", "keywords"),
    (b"Creator", "created_by"),
    (b"Producer", "producer"),
];

const DATE_FIELDS: &[(&[u8], &str)] = &[(b"CreationDate", "created"), (b"ModDate", "modified")];

/// Document-level attributes: info dictionary fields, PDF version and page count.
///
/// Missing or unreadable fields are left out.
pub fn document_attributes(document: &Document) -> Metadata {
    let mut attributes = Metadata::new();

    if let Some(info) = info_dictionary(document) {
        for (key, name) in INFO_FIELDS {
            if let Some(value) = info.get(key).ok().and_then(decode_text) {
                attributes.insert(name.to_string(), Value::from(value));
            }
        }
        for (key, name) in DATE_FIELDS {
            if let Some(value) = info.get(key).ok().and_then(decode_text) {
                attributes.insert(name.to_string(), Value::from(normalize_date(&value)));
            }
        }
    }

    attributes.insert("pdf_version".to_string(), Value::from(document.version.clone()));
    attributes.insert("page_count".to_string(), Value::from(document.get_pages().len()));
    attributes
}

fn info_dictionary(document: &Document) -> Option<&Dictionary> {
    let info = document.trailer.get(b"Info").ok()?;
    match info {
        Object::Reference(id) => document.get_dictionary(*id).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

/// Decode a PDF text string: UTF-16BE with a byte order mark, else single-byte.
fn decode_text(object: &Object) -> Option<String> {
    let Object::String(bytes, _) = object else {
        return None;
    };

    let text = if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => bytes.iter().map(|b| *b as char).collect(),
        }
    };

    let text = text.trim().trim_matches('\0').to_string();
    if text.is_empty() { None } else { Some(text) }
}

/// `D:YYYYMMDDHHmmSS...` to `YYYY-MM-DDTHH:mm:SS`. Anything else is returned as is.
fn normalize_date(raw: &str) -> String {
    let digits = raw.strip_prefix("D:").unwrap_or(raw);
    let digits: String = digits.chars().take_while(|c| c.is_ascii_digit()).collect();

    if digits.len() < 8 {
        return raw.to_string();
    }
    let part = |range: std::ops::Range<usize>, default: &'static str| -> String {
        digits.get(range).unwrap_or(default).to_string()
    };

    format!(
        "{}-{}-{}T{}:{}:{}",
        part(0..4, "0000"),
        part(4..6, "01"),
        part(6..8, "01"),
        part(8..10, "00"),
        part(10..12, "00"),
        part(12..14, "00")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::test_support::build_pdf_with_info;

    #[test]
    fn test_document_attributes() {
        let pdf = build_pdf_with_info(&[&["Body"]], &[("Title", "Quarterly Report"), ("Author", "Finance")]);
        let document = Document::load_mem(&pdf).unwrap();

        let attributes = document_attributes(&document);
        assert_eq!(attributes["title"], Value::from("Quarterly Report"));
        assert_eq!(attributes["author"], Value::from("Finance"));
        assert_eq!(attributes["page_count"], Value::from(1));
        assert_eq!(attributes["pdf_version"], Value::from("1.5"));
        assert!(!attributes.contains_key("subject"));
    }

    #[test]
    fn test_decode_utf16_text() {
        let object = Object::string_literal(vec![0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69]);
        assert_eq!(decode_text(&object), Some("Hi".to_string()));
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("D:20230115093000+01'00'"), "2023-01-15T09:30:00");
        assert_eq!(normalize_date("D:20230115"), "2023-01-15T00:00:00");
        assert_eq!(normalize_date("yesterday"), "yesterday");
    }
}
