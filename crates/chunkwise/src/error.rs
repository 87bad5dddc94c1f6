//! Error types for chunkwise.
//!
//! Every fallible operation in the crate returns [`ChunkwiseError`]. The enum
//! is built with `thiserror` and keeps source chains through `#[source]`.
//!
//! # Error Handling Philosophy
//!
//! **System errors bubble up unchanged:**
//! - `ChunkwiseError::Io` (from `std::io::Error`) covers unreadable files,
//!   permission problems and vanished paths. These are never wrapped.
//!
//! **Application errors carry context:**
//! - `UnresolvedExtension` - no content type is known for the file name
//! - `UnsupportedFormat` - the content type is known but not processed
//! - `Decode` - text content is not valid UTF-8
//! - `Parsing` - the format pipeline could not read the document
//! - `Ocr` - the OCR backend failed
//! - `Validation` - invalid configuration or arguments
//! - `Tokenizer` - the tokenizer could not be loaded or applied
//!
//! # Example
//!
//! ```rust
//! use chunkwise::{ChunkwiseError, Result};
//!
//! fn read_notes(path: &str) -> Result<String> {
//!     let bytes = std::fs::read(path)?;
//!     String::from_utf8(bytes).map_err(|e| ChunkwiseError::decode_with_source(path, e))
//! }
//! ```
use thiserror::Error;

/// Result type alias using `ChunkwiseError`.
pub type Result<T> = std::result::Result<T, ChunkwiseError>;

/// Main error type for all chunkwise operations.
#[derive(Debug, Error)]
pub enum ChunkwiseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unresolved extension: {0}")]
    UnresolvedExtension(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Decode error: {message}")]
    Decode {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Parsing error: {message}")]
    Parsing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("OCR error: {message}")]
    Ocr {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Tokenizer error: {message}")]
    Tokenizer {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("{0}")]
    Other(String),
}

impl From<calamine::Error> for ChunkwiseError {
    fn from(err: calamine::Error) -> Self {
        match err {
            calamine::Error::Io(io_err) => ChunkwiseError::Io(io_err),
            other => ChunkwiseError::Parsing {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }
}

impl From<serde_json::Error> for ChunkwiseError {
    fn from(err: serde_json::Error) -> Self {
        ChunkwiseError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<zip::result::ZipError> for ChunkwiseError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            // Real IO error - bubble up unchanged
            zip::result::ZipError::Io(io_err) => ChunkwiseError::Io(io_err),
            other => ChunkwiseError::Parsing {
                message: format!("Invalid archive: {}", other),
                source: Some(Box::new(other)),
            },
        }
    }
}

impl From<crate::pdf::error::PdfError> for ChunkwiseError {
    fn from(err: crate::pdf::error::PdfError) -> Self {
        ChunkwiseError::Parsing {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        paste::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl ChunkwiseError {
    error_constructor!(decode, Decode);
    error_constructor!(parsing, Parsing);
    error_constructor!(ocr, Ocr);
    error_constructor!(validation, Validation);
    error_constructor!(tokenizer, Tokenizer);
    error_constructor!(serialization, Serialization);
}
