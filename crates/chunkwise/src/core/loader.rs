//! The loader facade.
//!
//! [`DocumentLoader`] is the single entry point callers need: give it paths
//! and a configuration, get back sanitized chunks in input order.
//!
//! # Example
//!
//! ```rust,no_run
//! use chunkwise::{DocumentLoader, LoaderConfig};
//!
//! # fn example() -> chunkwise::Result<()> {
//! let loader = DocumentLoader::new(vec!["report.pdf".into(), "notes.md".into()], LoaderConfig::default())?;
//! for chunk in loader.load()? {
//!     println!("[{}] {}", chunk.heading(), chunk.content);
//! }
//! for diagnostic in loader.diagnostics() {
//!     eprintln!("skipped {}", diagnostic);
//! }
//! # Ok(())
//! # }
//! ```

use crate::chunking::TokenCounter;
use crate::core::config::{BatchMode, LoaderConfig};
use crate::core::formats::{FormatFamily, verify_registry};
use crate::core::mime;
use crate::core::pipeline::process_file;
use crate::pdf::OcrBackend;
use crate::types::{Chunk, Diagnostic, DiagnosticKind};
use crate::{ChunkwiseError, Result};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
struct LoadableFile {
    path: PathBuf,
    mime_type: &'static str,
    family: FormatFamily,
}

/// Loads a set of files into chunks.
///
/// Construction resolves every path once, records a [`Diagnostic`] for each
/// file it will not process, and loads the tokenizer. Loading is synchronous
/// and can be repeated; each call reprocesses the files from disk.
pub struct DocumentLoader {
    files: Vec<LoadableFile>,
    config: LoaderConfig,
    counter: TokenCounter,
    ocr_backend: Option<Arc<dyn OcrBackend>>,
    construction_diagnostics: Vec<Diagnostic>,
    load_diagnostics: Mutex<Vec<Diagnostic>>,
}

impl DocumentLoader {
    /// # Errors
    ///
    /// `Validation` for an invalid configuration or an inconsistent format
    /// registry; `Tokenizer`/`MissingDependency` when the tokenizer cannot be
    /// loaded and fallback is disabled. Unsupported files are never an error.
    #[tracing::instrument(skip_all, fields(paths = paths.len()))]
    pub fn new(paths: Vec<PathBuf>, config: LoaderConfig) -> Result<Self> {
        config.validate()?;
        verify_registry()?;

        let counter = TokenCounter::for_model(
            &config.tokenizer.model,
            &config.tokenizer.model_sources(),
            config.tokenizer.allow_fallback,
        )?;

        let mut files = Vec::with_capacity(paths.len());
        let mut diagnostics = Vec::new();

        for path in paths {
            match classify(&path) {
                Ok(file) => files.push(file),
                Err(diagnostic) => {
                    tracing::warn!(path = %diagnostic.path.display(), "{}", diagnostic.message);
                    diagnostics.push(diagnostic);
                }
            }
        }

        if config.batch_mode == BatchMode::FirstFormat {
            files = keep_first_family(files, &mut diagnostics);
        }

        tracing::debug!(
            files = files.len(),
            skipped = diagnostics.len(),
            tokenizer = counter.name(),
            "Document loader ready"
        );

        Ok(Self {
            files,
            config,
            counter,
            ocr_backend: None,
            construction_diagnostics: diagnostics,
            load_diagnostics: Mutex::new(Vec::new()),
        })
    }

    /// Loader over `path`: a single file, or the immediate files of a directory.
    pub fn from_path(path: impl AsRef<Path>, config: LoaderConfig) -> Result<Self> {
        let paths = crate::core::io::collect_paths(path)?;
        Self::new(paths, config)
    }

    /// Use `backend` for PDF pages that need OCR.
    pub fn with_ocr_backend(mut self, backend: Arc<dyn OcrBackend>) -> Self {
        self.ocr_backend = Some(backend);
        self
    }

    /// Process every accepted file and return all chunks in input order.
    ///
    /// Pages that fail inside an otherwise readable PDF are recorded as
    /// diagnostics and annotated on that file's chunks.
    ///
    /// # Errors
    ///
    /// The first file that fails as a whole aborts the load with its error.
    #[tracing::instrument(skip_all, fields(files = self.files.len()))]
    pub fn load(&self) -> Result<Vec<Chunk>> {
        self.load_diagnostics.lock().clear();

        let mut chunks = Vec::new();
        for file in &self.files {
            let output = process_file(
                &file.path,
                file.mime_type,
                &self.counter,
                &self.config,
                self.ocr_backend.as_deref(),
            )?;

            if !output.failed_pages.is_empty() {
                let pages: Vec<String> = output.failed_pages.iter().map(|f| f.page_number.to_string()).collect();
                let diagnostic = Diagnostic {
                    path: file.path.clone(),
                    kind: DiagnosticKind::PartialPageFailure,
                    message: format!("Skipped unreadable pages {}", pages.join(", ")),
                };
                tracing::warn!(path = %file.path.display(), "{}", diagnostic.message);
                self.load_diagnostics.lock().push(diagnostic);
            }

            chunks.extend(output.chunks);
        }

        Ok(chunks)
    }

    /// Same as [`load`](Self::load), keeping only chunk contents.
    pub fn load_texts(&self) -> Result<Vec<String>> {
        Ok(self.load()?.into_iter().map(|chunk| chunk.content).collect())
    }

    /// Construction-time diagnostics followed by those of the latest load.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut all = self.construction_diagnostics.clone();
        all.extend(self.load_diagnostics.lock().iter().cloned());
        all
    }

    /// Files that will be processed, in order.
    pub fn files(&self) -> Vec<&Path> {
        self.files.iter().map(|f| f.path.as_path()).collect()
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn token_counter(&self) -> &TokenCounter {
        &self.counter
    }
}

fn classify(path: &Path) -> std::result::Result<LoadableFile, Diagnostic> {
    let diagnostic = |kind, message: String| Diagnostic {
        path: path.to_path_buf(),
        kind,
        message,
    };

    let mime_type = match mime::resolve(path) {
        Ok(mime_type) => mime_type,
        Err(ChunkwiseError::UnresolvedExtension(message)) => {
            return Err(diagnostic(DiagnosticKind::UnresolvedExtension, message));
        }
        Err(other) => return Err(diagnostic(DiagnosticKind::UnresolvedExtension, other.to_string())),
    };

    match FormatFamily::from_mime(mime_type) {
        Some(family) if mime::is_supported_mime(mime_type) => Ok(LoadableFile {
            path: path.to_path_buf(),
            mime_type,
            family,
        }),
        _ => Err(diagnostic(
            DiagnosticKind::UnsupportedType,
            format!("Unsupported content type {}", mime_type),
        )),
    }
}

/// The first file's family decides the batch; the rest are skipped.
fn keep_first_family(files: Vec<LoadableFile>, diagnostics: &mut Vec<Diagnostic>) -> Vec<LoadableFile> {
    let Some(family) = files.first().map(|f| f.family) else {
        return files;
    };

    let (kept, skipped): (Vec<_>, Vec<_>) = files.into_iter().partition(|f| f.family == family);
    for file in skipped {
        let diagnostic = Diagnostic {
            path: file.path,
            kind: DiagnosticKind::SkippedMixedFormat,
            message: format!(
                "Skipped {} file in a {} batch; use batch_mode = \"per_file\" to process mixed formats",
                file.family, family
            ),
        };
        tracing::warn!(path = %diagnostic.path.display(), "{}", diagnostic.message);
        diagnostics.push(diagnostic);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn config(batch_mode: BatchMode) -> LoaderConfig {
        let mut config = LoaderConfig {
            batch_mode,
            ..Default::default()
        };
        config.tokenizer.cache_dir = Some(PathBuf::from("/nonexistent/hub-cache"));
        config
    }

    #[test]
    fn test_filters_unsupported_files() {
        let dir = tempdir().unwrap();
        let txt = dir.path().join("a.txt");
        let exe = dir.path().join("setup.exe");
        let png = dir.path().join("photo.png");
        fs::write(&txt, "hello").unwrap();
        fs::write(&exe, "MZ").unwrap();
        fs::write(&png, "png").unwrap();

        let loader = DocumentLoader::new(vec![txt.clone(), exe, png], config(BatchMode::PerFile)).unwrap();

        assert_eq!(loader.files(), vec![txt.as_path()]);
        let kinds: Vec<DiagnosticKind> = loader.diagnostics().iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![DiagnosticKind::UnresolvedExtension, DiagnosticKind::UnsupportedType]
        );
    }

    #[test]
    fn test_empty_set_loads_nothing() {
        let loader = DocumentLoader::new(vec![], config(BatchMode::FirstFormat)).unwrap();
        assert!(loader.load().unwrap().is_empty());
        assert!(loader.load_texts().unwrap().is_empty());
    }

    #[test]
    fn test_first_format_skips_other_families() {
        let dir = tempdir().unwrap();
        let md = dir.path().join("a.md");
        let txt = dir.path().join("b.txt");
        let md2 = dir.path().join("c.md");
        fs::write(&md, "# A\nalpha").unwrap();
        fs::write(&txt, "plain").unwrap();
        fs::write(&md2, "# C\ngamma").unwrap();

        let loader = DocumentLoader::new(vec![md.clone(), txt, md2.clone()], config(BatchMode::FirstFormat)).unwrap();
        assert_eq!(loader.files(), vec![md.as_path(), md2.as_path()]);
        assert_eq!(loader.diagnostics()[0].kind, DiagnosticKind::SkippedMixedFormat);

        let texts = loader.load_texts().unwrap();
        assert_eq!(texts, vec!["alpha".to_string(), "gamma".to_string()]);
    }

    #[test]
    fn test_per_file_keeps_input_order() {
        let dir = tempdir().unwrap();
        let txt = dir.path().join("b.txt");
        let md = dir.path().join("a.md");
        fs::write(&txt, "plain words").unwrap();
        fs::write(&md, "# A\nalpha").unwrap();

        let loader = DocumentLoader::new(vec![txt, md], config(BatchMode::PerFile)).unwrap();
        let chunks = loader.load().unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, "plain words");
        assert_eq!(chunks[0].heading().as_str(), "no heading");
        assert_eq!(chunks[1].heading().as_str(), "A");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut bad = config(BatchMode::PerFile);
        bad.chunking.overlap = bad.chunking.max_characters;
        assert!(matches!(
            DocumentLoader::new(vec![], bad),
            Err(ChunkwiseError::Validation { .. })
        ));
    }

    #[test]
    fn test_file_failure_aborts_load() {
        let dir = tempdir().unwrap();
        let bad = dir.path().join("bad.txt");
        fs::write(&bad, [0xC3, 0x28]).unwrap();

        let loader = DocumentLoader::new(vec![bad], config(BatchMode::PerFile)).unwrap();
        assert!(matches!(loader.load(), Err(ChunkwiseError::Decode { .. })));
    }
}
