use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Terminal event kind recorded in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryKind {
    Completed,
    Error,
    Skipped,
    Archived,
}

/// One immutable ledger record.
///
/// `url` is None for system-generated entries such as archive creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub url: Option<String>,
    pub file_path: Option<PathBuf>,
    pub timestamp: DateTime<Utc>,
    pub kind: HistoryKind,
    pub detail: Option<String>,
}

impl HistoryEntry {
    pub fn completed(url: &str, file_path: &Path) -> Self {
        Self {
            url: Some(url.to_string()),
            file_path: Some(file_path.to_path_buf()),
            timestamp: Utc::now(),
            kind: HistoryKind::Completed,
            detail: None,
        }
    }

    pub fn failed(url: &str, detail: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            file_path: None,
            timestamp: Utc::now(),
            kind: HistoryKind::Error,
            detail: Some(detail.to_string()),
        }
    }

    pub fn skipped(url: &str, reason: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            file_path: None,
            timestamp: Utc::now(),
            kind: HistoryKind::Skipped,
            detail: Some(reason.to_string()),
        }
    }

    pub fn archived(archive_path: &Path) -> Self {
        Self {
            url: None,
            file_path: Some(archive_path.to_path_buf()),
            timestamp: Utc::now(),
            kind: HistoryKind::Archived,
            detail: None,
        }
    }

    pub fn archive_failed(folder: &str, detail: &str) -> Self {
        Self {
            url: None,
            file_path: None,
            timestamp: Utc::now(),
            kind: HistoryKind::Error,
            detail: Some(format!("Failed to archive folder {}: {}", folder, detail)),
        }
    }
}
