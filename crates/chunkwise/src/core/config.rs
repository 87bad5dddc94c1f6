//! Configuration loading and management.
//!
//! [`LoaderConfig`] holds every recognized knob of the pipeline. It can be
//! built programmatically, loaded from TOML, YAML or JSON, or discovered as a
//! `chunkwise.toml` in the current directory or one of its parents.

use crate::chunking::tokenizer::ModelSources;
use crate::{ChunkwiseError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
pub const CONFIG_FILE_NAME: &str = "chunkwise.toml";

/// Main loader configuration.
///
/// # Example
///
/// ```rust
/// use chunkwise::core::config::LoaderConfig;
///
/// let config = LoaderConfig::default();
/// assert_eq!(config.chunking.max_tokens, 1000);
/// assert_eq!(config.chunking.overlap, 200);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    #[serde(default)]
    pub tokenizer: TokenizerConfig,

    #[serde(default)]
    pub chunking: ChunkingConfig,

    #[serde(default)]
    pub pdf: PdfConfig,

    #[serde(default)]
    pub accelerator: AcceleratorConfig,

    /// How a batch mixing several format families is processed.
    #[serde(default)]
    pub batch_mode: BatchMode,

    /// Upper bound for one LibreOffice conversion of a legacy `.doc`/`.ppt`.
    #[serde(default = "default_libreoffice_timeout")]
    pub libreoffice_timeout_secs: u64,
}

/// Tokenizer selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenizerConfig {
    /// Embedding model identifier whose tokenizer bounds chunk sizes.
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Fall back to word counting when the tokenizer cannot be loaded.
    #[serde(default = "default_true")]
    pub allow_fallback: bool,

    /// Model identifier to local directory (or `tokenizer.json`) overrides.
    #[serde(default)]
    pub sources: BTreeMap<String, PathBuf>,

    /// Hugging Face hub cache to search for downloaded models.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

/// Chunk size bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Token bound for structured, tabular and markdown formats.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Merge adjacent pieces that share a heading path while they fit.
    #[serde(default = "default_true")]
    pub merge_peers: bool,

    /// Character bound for plain text.
    #[serde(default = "default_max_characters")]
    pub max_characters: usize,

    /// Characters shared by consecutive plain-text chunks.
    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

/// PDF pipeline options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfConfig {
    /// Detect column-aligned runs of lines and emit them as tables.
    #[serde(default = "default_true")]
    pub table_structure: bool,

    /// Run OCR on pages without a text layer.
    #[serde(default)]
    pub ocr: bool,

    /// OCR every page, ignoring any text layer.
    #[serde(default)]
    pub force_full_page_ocr: bool,

    /// Drop running headers and footers repeated across pages.
    #[serde(default = "default_true")]
    pub remove_page_furniture: bool,

    /// Pages a first/last line must repeat on to count as a header or footer.
    #[serde(default = "default_furniture_min_repeats")]
    pub furniture_min_repeats: usize,
}

/// Resource hints forwarded to the OCR backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceleratorConfig {
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,

    #[serde(default)]
    pub device: AcceleratorDevice,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcceleratorDevice {
    #[default]
    Auto,
    Cpu,
    Cuda,
    Mps,
}

/// Batch semantics of [`crate::DocumentLoader::load`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchMode {
    /// One strategy per call, chosen by the first resolvable file. Files of
    /// other families are skipped with a diagnostic.
    #[default]
    FirstFormat,
    /// Every file is processed with its own strategy.
    PerFile,
}

fn default_true() -> bool {
    true
}

fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_max_tokens() -> usize {
    1000
}

fn default_max_characters() -> usize {
    1000
}

fn default_overlap() -> usize {
    200
}

fn default_furniture_min_repeats() -> usize {
    3
}

fn default_num_threads() -> usize {
    8
}

fn default_libreoffice_timeout() -> u64 {
    300
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            tokenizer: TokenizerConfig::default(),
            chunking: ChunkingConfig::default(),
            pdf: PdfConfig::default(),
            accelerator: AcceleratorConfig::default(),
            batch_mode: BatchMode::default(),
            libreoffice_timeout_secs: default_libreoffice_timeout(),
        }
    }
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            allow_fallback: true,
            sources: BTreeMap::new(),
            cache_dir: None,
        }
    }
}

impl TokenizerConfig {
    pub fn model_sources(&self) -> ModelSources {
        let mut sources = ModelSources::new();
        for (model, path) in &self.sources {
            sources = sources.with_source(model.clone(), path.clone());
        }
        if let Some(cache_dir) = &self.cache_dir {
            sources = sources.with_cache_dir(cache_dir.clone());
        }
        sources
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            merge_peers: true,
            max_characters: default_max_characters(),
            overlap: default_overlap(),
        }
    }
}

impl ChunkingConfig {
    /// # Errors
    ///
    /// `ChunkwiseError::Validation` for zero bounds or an overlap that is not
    /// smaller than `max_characters`.
    pub fn validate(&self) -> Result<()> {
        if self.max_tokens == 0 {
            return Err(ChunkwiseError::validation("max_tokens must be greater than zero"));
        }
        if self.max_characters == 0 {
            return Err(ChunkwiseError::validation("max_characters must be greater than zero"));
        }
        if self.overlap >= self.max_characters {
            return Err(ChunkwiseError::validation(format!(
                "overlap ({}) must be smaller than max_characters ({})",
                self.overlap, self.max_characters
            )));
        }
        Ok(())
    }
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            table_structure: true,
            ocr: false,
            force_full_page_ocr: false,
            remove_page_furniture: true,
            furniture_min_repeats: default_furniture_min_repeats(),
        }
    }
}

impl Default for AcceleratorConfig {
    fn default() -> Self {
        Self {
            num_threads: default_num_threads(),
            device: AcceleratorDevice::default(),
        }
    }
}

impl LoaderConfig {
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        if self.accelerator.num_threads == 0 {
            return Err(ChunkwiseError::validation("accelerator.num_threads must be greater than zero"));
        }
        if self.pdf.furniture_min_repeats < 2 {
            return Err(ChunkwiseError::validation("pdf.furniture_min_repeats must be at least 2"));
        }
        Ok(())
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ChunkwiseError::Validation` if the file cannot be read or is invalid TOML.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        toml::from_str(&content)
            .map_err(|e| ChunkwiseError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        serde_yaml_ng::from_str(&content)
            .map_err(|e| ChunkwiseError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        serde_json::from_str(&content)
            .map_err(|e| ChunkwiseError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))
    }

    /// Load by file extension: `.toml`, `.yaml`/`.yml` or `.json`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()).map(|e| e.to_lowercase()).as_deref() {
            Some("toml") => Self::from_toml_file(path),
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(ChunkwiseError::validation(format!(
                "Unrecognized config file format: {}",
                path.display()
            ))),
        }
    }

    /// Search for `chunkwise.toml` in the current directory and its parents.
    pub fn discover() -> Result<Option<Self>> {
        let current = std::env::current_dir().map_err(ChunkwiseError::Io)?;
        Self::discover_from(&current)
    }

    pub fn discover_from(start: &Path) -> Result<Option<Self>> {
        let mut current = Some(start);

        while let Some(dir) = current {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Ok(Some(Self::from_toml_file(candidate)?));
            }
            current = dir.parent();
        }

        Ok(None)
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| ChunkwiseError::validation(format!("Failed to read config file {}: {}", path.display(), e)))
}
