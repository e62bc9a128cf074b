//! Trait definition for the archiver collaborator.

use async_trait::async_trait;
use std::path::Path;

use super::error::ArchiveError;
use super::ArchiveResult;

/// An archiver that compresses a directory into a single archive file.
#[async_trait]
pub trait Archiver: Send + Sync {
    /// Returns the name of this archiver implementation.
    fn name(&self) -> &str;

    /// Archives the contents of `dir` into `dest`, replacing any partial
    /// output on failure.
    async fn archive(&self, dir: &Path, dest: &Path) -> Result<ArchiveResult, ArchiveError>;
}
