//! Archiver collaborator: compresses a batch folder into a single file.

mod error;
mod traits;
mod zip_archiver;

pub use error::ArchiveError;
pub use traits::Archiver;
pub use zip_archiver::ZipArchiver;

use std::path::PathBuf;

/// Successful archive outcome.
#[derive(Debug, Clone)]
pub struct ArchiveResult {
    pub path: PathBuf,
    pub bytes: u64,
    pub files: usize,
}
