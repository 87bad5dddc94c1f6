//! Token counting for the token-bounded chunker.
//!
//! The tokenizer of the configured embedding model is located through
//! [`ModelSources`], an explicit map from model identifiers to local paths
//! that callers build once and pass to [`TokenCounter::for_model`]. Without a
//! usable tokenizer the counter can fall back to a word/punctuation count.

use crate::{ChunkwiseError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use text_splitter::ChunkSizer;

const TOKENIZER_FILE: &str = "tokenizer.json";

static WORD_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+|[^\w\s]").expect("Word token regex pattern is valid and should compile"));

/// Where tokenizers for model identifiers live on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelSources {
    sources: BTreeMap<String, PathBuf>,
    cache_dir: Option<PathBuf>,
}

impl ModelSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `model` to a model directory or a `tokenizer.json` file.
    pub fn with_source(mut self, model: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.sources.insert(model.into(), path.into());
        self
    }

    /// Hugging Face hub cache (`.../huggingface/hub`) to search.
    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }

    pub fn source_for(&self, model: &str) -> Option<&Path> {
        self.sources.get(model).map(PathBuf::as_path)
    }

    /// Locate `tokenizer.json` for `model`.
    ///
    /// Lookup order: explicit source, the identifier itself as a path, then
    /// the hub cache (`models--org--name/snapshots/*`).
    pub fn resolve_tokenizer_file(&self, model: &str) -> Option<PathBuf> {
        if let Some(path) = self.source_for(model) {
            return tokenizer_file_in(path);
        }

        if let Some(found) = tokenizer_file_in(Path::new(model)) {
            return Some(found);
        }

        let cache_dir = self.cache_dir.clone().or_else(default_hub_cache)?;
        find_in_hub_cache(&cache_dir, model)
    }
}

fn tokenizer_file_in(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    let candidate = path.join(TOKENIZER_FILE);
    candidate.is_file().then_some(candidate)
}

fn default_hub_cache() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("HF_HUB_CACHE").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    if let Some(home) = std::env::var_os("HF_HOME").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(home).join("hub"));
    }
    dirs::home_dir().map(|home| home.join(".cache").join("huggingface").join("hub"))
}

fn find_in_hub_cache(cache_dir: &Path, model: &str) -> Option<PathBuf> {
    let repo_dir = cache_dir.join(format!("models--{}", model.replace('/', "--")));
    let snapshots = repo_dir.join("snapshots");

    if let Ok(main_ref) = std::fs::read_to_string(repo_dir.join("refs").join("main"))
        && let Some(found) = tokenizer_file_in(&snapshots.join(main_ref.trim()))
    {
        return Some(found);
    }

    let mut entries: Vec<PathBuf> = std::fs::read_dir(&snapshots)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();
    entries.iter().find_map(|dir| tokenizer_file_in(dir))
}

/// Counts tokens the way the target embedding model would.
pub enum TokenCounter {
    #[cfg(feature = "hf-tokenizer")]
    HuggingFace {
        model: String,
        tokenizer: Box<tokenizers::Tokenizer>,
    },
    /// Words and punctuation marks, one token each.
    Words,
}

impl fmt::Debug for TokenCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "hf-tokenizer")]
            TokenCounter::HuggingFace { model, .. } => f.debug_struct("HuggingFace").field("model", model).finish(),
            TokenCounter::Words => f.write_str("Words"),
        }
    }
}

impl TokenCounter {
    pub fn words() -> Self {
        TokenCounter::Words
    }

    /// Load a tokenizer from a `tokenizer.json` file.
    ///
    /// Truncation and padding baked into the file are disabled so counts
    /// reflect the full text.
    #[cfg(feature = "hf-tokenizer")]
    pub fn from_file(model: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut tokenizer = tokenizers::Tokenizer::from_file(path).map_err(|e| ChunkwiseError::Tokenizer {
            message: format!("Failed to load tokenizer from {}", path.display()),
            source: Some(e),
        })?;
        tokenizer.with_truncation(None).map_err(|e| ChunkwiseError::Tokenizer {
            message: "Failed to disable tokenizer truncation".to_string(),
            source: Some(e),
        })?;
        tokenizer.with_padding(None);

        Ok(TokenCounter::HuggingFace {
            model: model.into(),
            tokenizer: Box::new(tokenizer),
        })
    }

    /// Build the counter for `model`.
    ///
    /// # Errors
    ///
    /// `ChunkwiseError::MissingDependency` when no tokenizer can be found and
    /// `allow_fallback` is false. A tokenizer file that exists but fails to
    /// load is reported as `ChunkwiseError::Tokenizer` unless falling back.
    pub fn for_model(model: &str, sources: &ModelSources, allow_fallback: bool) -> Result<Self> {
        match Self::load_model(model, sources) {
            Ok(counter) => Ok(counter),
            Err(err) if allow_fallback => {
                tracing::warn!(model, error = %err, "Tokenizer unavailable, counting words instead");
                Ok(TokenCounter::Words)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(feature = "hf-tokenizer")]
    fn load_model(model: &str, sources: &ModelSources) -> Result<Self> {
        let path = sources.resolve_tokenizer_file(model).ok_or_else(|| {
            ChunkwiseError::MissingDependency(format!(
                "No {} found for model '{}'. Map it to a local directory in the tokenizer sources.",
                TOKENIZER_FILE, model
            ))
        })?;
        tracing::debug!(model, path = %path.display(), "Loading tokenizer");
        Self::from_file(model, path)
    }

    #[cfg(not(feature = "hf-tokenizer"))]
    fn load_model(model: &str, _sources: &ModelSources) -> Result<Self> {
        Err(ChunkwiseError::MissingDependency(format!(
            "Tokenizer for '{}' requires the hf-tokenizer feature",
            model
        )))
    }

    pub fn count(&self, text: &str) -> usize {
        match self {
            #[cfg(feature = "hf-tokenizer")]
            TokenCounter::HuggingFace { tokenizer, .. } => match tokenizer.encode(text, false) {
                Ok(encoding) => encoding.len(),
                Err(_) => count_words(text),
            },
            TokenCounter::Words => count_words(text),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            #[cfg(feature = "hf-tokenizer")]
            TokenCounter::HuggingFace { model, .. } => model,
            TokenCounter::Words => "words",
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, TokenCounter::Words)
    }
}

fn count_words(text: &str) -> usize {
    WORD_TOKEN.find_iter(text).count()
}

/// Adapter so `text-splitter` measures chunks with a [`TokenCounter`].
#[derive(Debug, Clone, Copy)]
pub struct TokenSizer<'a>(pub &'a TokenCounter);

impl ChunkSizer for TokenSizer<'_> {
    fn size(&self, chunk: &str) -> usize {
        self.0.count(chunk)
    }
}
