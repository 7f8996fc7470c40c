//! Output writing.

use crate::error::{IoError, Result};
use std::path::Path;

/// Creates the parent directory of `path`, recursively, if it is missing.
///
/// A bare file name has no parent to create. A directory that already exists,
/// including one created concurrently by another process, counts as success.
///
/// # Errors
///
/// Returns [`IoError::DirectoryFailed`] if the directory cannot be created.
pub fn ensure_parent_dir<P: AsRef<Path>>(path: P) -> Result<()> {
    let Some(parent) = path.as_ref().parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }

    std::fs::create_dir_all(parent).map_err(|e| IoError::DirectoryFailed {
        path: parent.to_string_lossy().to_string(),
        reason: e.to_string(),
    })?;

    Ok(())
}

/// Writes bytes to a file verbatim, creating parent directories if needed.
///
/// # Errors
///
/// Returns an error if directory creation or file writing fails.
pub fn write_bytes<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path_ref = path.as_ref();
    ensure_parent_dir(path_ref)?;

    std::fs::write(path_ref, content).map_err(|e| IoError::WriteFailed {
        path: path_ref.to_string_lossy().to_string(),
        reason: e.to_string(),
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_parent_dir_creates_nested() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("a/b/c/result.png");

        ensure_parent_dir(&file_path).unwrap();
        assert!(temp_dir.path().join("a/b/c").is_dir());
        assert!(!file_path.exists());
    }

    #[test]
    fn test_ensure_parent_dir_existing_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("out/result.png");

        ensure_parent_dir(&file_path).unwrap();
        ensure_parent_dir(&file_path).unwrap();
        assert!(temp_dir.path().join("out").is_dir());
    }

    #[test]
    fn test_ensure_parent_dir_bare_file_name() {
        assert!(ensure_parent_dir("result.png").is_ok());
    }

    #[test]
    fn test_ensure_parent_dir_blocked_by_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("out");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let result = ensure_parent_dir(blocker.join("result.png"));
        assert!(result.is_err());
    }

    #[test]
    fn test_write_bytes_creates_parent() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("out/result.png");

        write_bytes(&file_path, b"payload").unwrap();
        assert_eq!(std::fs::read(&file_path).unwrap(), b"payload");
    }

    #[test]
    fn test_write_bytes_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("result.png");

        write_bytes(&file_path, b"first").unwrap();
        write_bytes(&file_path, b"second").unwrap();
        assert_eq!(std::fs::read(&file_path).unwrap(), b"second");
    }
}
