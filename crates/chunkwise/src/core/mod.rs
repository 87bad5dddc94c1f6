//! Core orchestration module.
//!
//! # Architecture
//!
//! - **Type resolution** ([`mime`]): file name to content type, support gate
//! - **Registry** ([`formats`]): content type to format family to strategy
//! - **Pipeline** ([`pipeline`]): one file through extraction, chunking and sanitizing
//! - **Loader** ([`loader`]): path filtering, diagnostics and batch semantics
//! - **Configuration** ([`config`]): every knob, loadable from TOML, YAML or JSON
//! - **I/O** ([`io`]): file reading and directory expansion

pub mod config;
pub mod formats;
pub mod io;
pub mod loader;
pub mod mime;
pub mod pipeline;

pub use config::{AcceleratorConfig, BatchMode, ChunkingConfig, LoaderConfig, PdfConfig, TokenizerConfig};
pub use formats::{FormatFamily, verify_registry};
pub use io::collect_paths;
pub use loader::DocumentLoader;
pub use pipeline::{FileOutput, process_file};
