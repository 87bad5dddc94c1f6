//! File I/O utilities.

use crate::{ChunkwiseError, Result};
use std::path::{Path, PathBuf};

/// Read a file.
///
/// # Errors
///
/// Returns `ChunkwiseError::Io` for I/O errors (these always bubble up).
pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    std::fs::read(path.as_ref()).map_err(ChunkwiseError::Io)
}

/// Validate that a file exists.
///
/// # Errors
///
/// Returns `ChunkwiseError::Validation` if the path doesn't exist.
pub fn validate_file_exists(path: impl AsRef<Path>) -> Result<()> {
    if !path.as_ref().exists() {
        return Err(ChunkwiseError::validation(format!(
            "File does not exist: {}",
            path.as_ref().display()
        )));
    }
    Ok(())
}

/// Expand `path` into the files to load.
///
/// A file is returned as is. A directory yields its immediate regular files
/// sorted by name; subdirectories are not entered.
///
/// # Errors
///
/// `ChunkwiseError::Validation` if `path` does not exist, `Io` if the
/// directory cannot be listed.
pub fn collect_paths(path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    validate_file_exists(path)?;

    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_read_file_missing_is_io() {
        let err = read_file("/nonexistent/file.txt").unwrap_err();
        assert!(matches!(err, ChunkwiseError::Io(_)));
    }

    #[test]
    fn test_collect_paths_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.pdf"), "a").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.txt"), "c").unwrap();

        let paths = collect_paths(dir.path()).unwrap();
        let names: Vec<String> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.pdf", "b.txt"]);
    }

    #[test]
    fn test_collect_paths_single_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("notes.md");
        fs::write(&file, "# Notes").unwrap();
        assert_eq!(collect_paths(&file).unwrap(), vec![file]);
    }

    #[test]
    fn test_collect_paths_missing() {
        let err = collect_paths("/nonexistent/dir").unwrap_err();
        assert!(matches!(err, ChunkwiseError::Validation { .. }));
    }
}
