use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while archiving a batch folder.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Source directory does not exist.
    #[error("folder not found: {0}")]
    MissingFolder(PathBuf),

    /// Filesystem error while reading sources or writing the archive.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Zip encoding error.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The blocking archive task was cancelled or panicked.
    #[error("archive task failed: {0}")]
    TaskFailed(String),
}
