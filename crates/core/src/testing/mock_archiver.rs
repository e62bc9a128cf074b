//! Mock archiver for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::archiver::{ArchiveError, ArchiveResult, Archiver};

/// A recorded archive call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedArchive {
    pub dir: PathBuf,
    pub dest: PathBuf,
    pub success: bool,
}

/// Mock implementation of the Archiver trait.
///
/// Records every call, writes a placeholder archive file on success, and
/// can be told to fail.
#[derive(Debug, Default)]
pub struct MockArchiver {
    calls: Arc<RwLock<Vec<RecordedArchive>>>,
    fail: Arc<RwLock<bool>>,
}

impl MockArchiver {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn recorded_archives(&self) -> Vec<RecordedArchive> {
        self.calls.read().await.clone()
    }

    pub async fn archive_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Make every subsequent archive call fail.
    pub async fn set_fail(&self, fail: bool) {
        *self.fail.write().await = fail;
    }
}

#[async_trait]
impl Archiver for MockArchiver {
    fn name(&self) -> &str {
        "mock"
    }

    async fn archive(&self, dir: &Path, dest: &Path) -> Result<ArchiveResult, ArchiveError> {
        let fail = *self.fail.read().await;
        self.calls.write().await.push(RecordedArchive {
            dir: dir.to_path_buf(),
            dest: dest.to_path_buf(),
            success: !fail,
        });

        if fail {
            return Err(ArchiveError::MissingFolder(dir.to_path_buf()));
        }

        let payload: &[u8] = b"mock-archive";
        tokio::fs::write(dest, payload).await?;
        Ok(ArchiveResult {
            path: dest.to_path_buf(),
            bytes: payload.len() as u64,
            files: 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_archive_writes_placeholder() {
        let temp = TempDir::new().unwrap();
        let archiver = MockArchiver::new();

        let dest = temp.path().join("batch.zip");
        let result = archiver.archive(temp.path(), &dest).await.unwrap();
        assert!(result.path.exists());
        assert_eq!(archiver.archive_count().await, 1);
        assert!(archiver.recorded_archives().await[0].success);
    }

    #[tokio::test]
    async fn test_failure_is_recorded() {
        let temp = TempDir::new().unwrap();
        let archiver = MockArchiver::new();
        archiver.set_fail(true).await;

        let dest = temp.path().join("batch.zip");
        let result = archiver.archive(temp.path(), &dest).await;
        assert!(result.is_err());
        assert!(!dest.exists());
        assert!(!archiver.recorded_archives().await[0].success);
    }
}
