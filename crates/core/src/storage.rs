//! Folder naming and path-safety helpers for the download/upload roots.

use chrono::Utc;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors from folder resolution.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Requested folder does not resolve under the configured root.
    #[error("folder escapes the download root: {0}")]
    OutsideRoot(String),

    /// Filesystem error while resolving.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Strip everything outside alphanumerics, spaces, hyphens and
/// underscores; returns None if nothing safe remains.
pub fn sanitize_folder_name(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let cleaned = cleaned.trim().to_string();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Unique fallback folder name derived from submission time.
pub fn generated_folder_name() -> String {
    format!("batch_{}", Utc::now().format("%Y%m%d_%H%M%S%3f"))
}

/// Resolve `folder` to an absolute path under `root`, rejecting anything
/// that would escape it.
///
/// The folder must be a single path component; separators and `..` are
/// refused outright, and the canonicalized result is verified to stay
/// under the canonicalized root.
pub fn resolve_under_root(root: &Path, folder: &str) -> Result<PathBuf, StorageError> {
    if folder.is_empty()
        || folder.contains('/')
        || folder.contains('\\')
        || folder.contains("..")
    {
        return Err(StorageError::OutsideRoot(folder.to_string()));
    }

    std::fs::create_dir_all(root)?;
    let canonical_root = std::fs::canonicalize(root)?;
    let candidate = canonical_root.join(folder);

    // If the folder already exists, check its real location too in case
    // a symlink points elsewhere.
    if candidate.exists() {
        let canonical = std::fs::canonicalize(&candidate)?;
        if !canonical.starts_with(&canonical_root) {
            return Err(StorageError::OutsideRoot(folder.to_string()));
        }
        return Ok(canonical);
    }

    Ok(candidate)
}

/// A single-use uploaded credential file, deleted when the last task
/// referencing it finishes.
///
/// Shared across a batch as `Arc<CookieFile>`; the drop of the final
/// clone removes the file, so no task can observe it missing while still
/// in flight.
#[derive(Debug)]
pub struct CookieFile {
    path: PathBuf,
}

impl CookieFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CookieFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            debug!("Could not remove cookie file {:?}: {}", self.path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_keeps_safe_characters() {
        assert_eq!(
            sanitize_folder_name("My Batch_2024-01"),
            Some("My Batch_2024-01".to_string())
        );
    }

    #[test]
    fn test_sanitize_strips_unsafe_characters() {
        assert_eq!(
            sanitize_folder_name("../etc/passwd"),
            Some("etcpasswd".to_string())
        );
        assert_eq!(sanitize_folder_name("a/b\\c"), Some("abc".to_string()));
    }

    #[test]
    fn test_sanitize_empty_result_is_none() {
        assert_eq!(sanitize_folder_name("../../"), None);
        assert_eq!(sanitize_folder_name("   "), None);
        assert_eq!(sanitize_folder_name(""), None);
    }

    #[test]
    fn test_generated_folder_name_is_sanitary() {
        let name = generated_folder_name();
        assert!(name.starts_with("batch_"));
        assert_eq!(sanitize_folder_name(&name), Some(name.clone()));
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            resolve_under_root(temp.path(), "../etc"),
            Err(StorageError::OutsideRoot(_))
        ));
        assert!(matches!(
            resolve_under_root(temp.path(), "a/b"),
            Err(StorageError::OutsideRoot(_))
        ));
        assert!(matches!(
            resolve_under_root(temp.path(), ".."),
            Err(StorageError::OutsideRoot(_))
        ));
    }

    #[test]
    fn test_resolve_accepts_plain_folder() {
        let temp = TempDir::new().unwrap();
        let resolved = resolve_under_root(temp.path(), "my-batch").unwrap();
        assert!(resolved.ends_with("my-batch"));
    }

    #[test]
    fn test_cookie_file_deleted_on_last_drop() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cookies.txt");
        std::fs::write(&path, b"session=abc").unwrap();

        let shared = Arc::new(CookieFile::new(path.clone()));
        let clone = Arc::clone(&shared);
        drop(shared);
        assert!(path.exists(), "file must survive while references remain");
        drop(clone);
        assert!(!path.exists(), "last drop removes the file");
    }
}
