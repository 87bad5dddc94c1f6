//! Legacy Office conversion through headless LibreOffice.
//!
//! `.doc` and `.ppt` files are converted to `.docx` / `.pptx` with
//! `soffice --headless --convert-to` and then read by the regular OOXML paths.
//!
//! LibreOffice must be installed. Set `CHUNKWISE_LIBREOFFICE_PATH` when
//! `soffice` lives outside `PATH`:
//! - **macOS**: `brew install --cask libreoffice`
//! - **Linux**: `apt install libreoffice` or `dnf install libreoffice`
//! - **Windows**: `winget install LibreOffice.LibreOffice`

use crate::error::{ChunkwiseError, Result};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Default timeout for one conversion.
pub const DEFAULT_CONVERSION_TIMEOUT: u64 = 300;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A legacy format LibreOffice can upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyFormat {
    Doc,
    Ppt,
}

impl LegacyFormat {
    fn source_extension(&self) -> &'static str {
        match self {
            LegacyFormat::Doc => "doc",
            LegacyFormat::Ppt => "ppt",
        }
    }

    fn target_extension(&self) -> &'static str {
        match self {
            LegacyFormat::Doc => "docx",
            LegacyFormat::Ppt => "pptx",
        }
    }
}

fn libreoffice_install_message() -> String {
    "LibreOffice (soffice/libreoffice) is required for legacy MS Office format support (.doc, .ppt). \
Install: macOS: 'brew install --cask libreoffice', \
Linux: 'apt install libreoffice', \
Windows: 'winget install LibreOffice.LibreOffice'. \
If LibreOffice is installed in a custom location, set the CHUNKWISE_LIBREOFFICE_PATH environment variable to the soffice executable."
        .to_string()
}

fn soffice_candidates() -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    let mut push_candidate = |path: PathBuf| {
        if seen.insert(path.clone()) {
            candidates.push(path);
        }
    };

    for var in ["CHUNKWISE_LIBREOFFICE_PATH", "SOFFICE_PATH", "LIBREOFFICE_PATH"] {
        if let Some(value) = env::var_os(var).filter(|v| !v.is_empty()) {
            push_candidate(PathBuf::from(value));
        }
    }

    if cfg!(target_os = "macos") {
        push_candidate(PathBuf::from("/Applications/LibreOffice.app/Contents/MacOS/soffice"));
    }

    if cfg!(target_os = "windows") {
        push_candidate(PathBuf::from("C:\\Program Files\\LibreOffice\\program\\soffice.exe"));
    }

    if let Some(path_env) = env::var_os("PATH") {
        for dir in env::split_paths(&path_env) {
            push_candidate(dir.join("soffice"));
            push_candidate(dir.join("libreoffice"));
            push_candidate(dir.join("soffice.exe"));
        }
    }

    candidates
}

/// Path of the first usable `soffice` binary.
pub fn locate_soffice_binary() -> Result<PathBuf> {
    soffice_candidates()
        .into_iter()
        .find(|candidate| fs::metadata(candidate).is_ok_and(|m| m.is_file()))
        .ok_or_else(|| ChunkwiseError::MissingDependency(libreoffice_install_message()))
}

/// Convert legacy Office bytes to their OOXML successor.
///
/// Runs in a private temporary directory (removed afterwards) with its own
/// LibreOffice profile, so concurrent conversions do not contend for the
/// user profile lock. The process is killed once `timeout_secs` elapses.
pub fn convert_legacy(bytes: &[u8], format: LegacyFormat, timeout_secs: u64) -> Result<Vec<u8>> {
    let soffice = locate_soffice_binary()?;

    let workdir = tempfile::Builder::new().prefix("chunkwise-soffice-").tempdir()?;
    let input_path = workdir.path().join(format!("input.{}", format.source_extension()));
    let output_dir = workdir.path().join("out");
    fs::write(&input_path, bytes)?;
    fs::create_dir_all(&output_dir)?;

    let log_path = workdir.path().join("soffice.log");
    let log = fs::File::create(&log_path)?;

    tracing::debug!(
        soffice = %soffice.display(),
        target = format.target_extension(),
        "Converting legacy Office document"
    );

    let mut child = Command::new(&soffice)
        .arg(format!("-env:UserInstallation={}", profile_url(&workdir.path().join("profile"))))
        .arg("--headless")
        .arg("--convert-to")
        .arg(format.target_extension())
        .arg("--outdir")
        .arg(&output_dir)
        .arg(&input_path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::from(log))
        .spawn()
        .map_err(|e| {
            ChunkwiseError::MissingDependency(format!(
                "LibreOffice executable '{}' could not be executed: {}. {}",
                soffice.display(),
                e,
                libreoffice_install_message()
            ))
        })?;

    let deadline = Instant::now() + Duration::from_secs(timeout_secs);
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ChunkwiseError::parsing(format!(
                "LibreOffice conversion timed out after {} seconds",
                timeout_secs
            )));
        }
        std::thread::sleep(POLL_INTERVAL);
    };

    if !status.success() {
        let stderr = fs::read_to_string(&log_path).unwrap_or_default();
        return Err(ChunkwiseError::parsing(format!(
            "LibreOffice conversion failed with return code {}: {}",
            status.code().unwrap_or(-1),
            stderr.trim()
        )));
    }

    let expected_output = output_dir.join(format!("input.{}", format.target_extension()));
    let converted = fs::read(&expected_output).map_err(|e| {
        ChunkwiseError::parsing(format!(
            "LibreOffice conversion completed but output file not found: {}",
            e
        ))
    })?;

    if converted.is_empty() {
        return Err(ChunkwiseError::parsing("LibreOffice conversion produced empty file"));
    }

    Ok(converted)
}

fn profile_url(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    if raw.starts_with('/') {
        format!("file://{}", raw)
    } else {
        format!("file:///{}", raw)
    }
}
