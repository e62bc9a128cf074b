//! Types for the batch orchestrator.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::archiver::ArchiveError;
use crate::storage::StorageError;
use crate::task::{Task, TaskId};

/// Errors that can occur during batch orchestration.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Submission contained no usable URLs.
    #[error("no valid URLs provided")]
    EmptyBatch,

    /// Submission rejected because of a malformed URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A URL requires authenticated access but no cookie file was given.
    #[error("a cookie file is required for {0} URLs")]
    CookieRequired(String),

    /// Requested worker count is outside the configured bounds.
    #[error("worker count {requested} outside 1..={max}")]
    WorkerCount { requested: usize, max: usize },

    /// Folder-scoped operation targeted a folder that does not exist.
    #[error("folder not found: {0}")]
    FolderNotFound(String),

    /// Path resolution failure, including traversal attempts.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Archiver collaborator failure.
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),
}

/// Lifecycle phase of the current batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPhase {
    /// Tasks still pending or running.
    Active,
    /// Every task is terminal; archive not yet attempted.
    Draining,
    Archived,
    ArchiveFailed,
}

/// A validated batch submission.
#[derive(Debug, Clone, Default)]
pub struct SubmitRequest {
    pub urls: Vec<String>,
    pub folder: Option<String>,
    pub filename_template: Option<String>,
    /// Requested pool size; None uses the configured default.
    pub workers: Option<usize>,
    pub auto_archive: bool,
    pub skip_invalid: bool,
    /// Uploaded single-use credential file, already persisted to disk.
    pub cookie_file: Option<PathBuf>,
}

/// Result of a successful submission.
#[derive(Debug, Clone, Serialize)]
pub struct BatchHandle {
    pub folder: String,
    pub task_ids: Vec<TaskId>,
}

/// Pull-based aggregate view over the current batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchStats {
    pub total: usize,
    pub completed: usize,
    pub errors: usize,
    /// URLs skipped at submission time; they never became tasks.
    pub skipped: usize,
    /// Tasks not yet terminal (pending or running).
    pub pending: usize,
    /// Tasks currently held by a worker.
    pub active: usize,
    /// Aggregate instantaneous throughput over active tasks, MiB/s.
    pub download_speed: f64,
    pub folder: Option<String>,
    pub phase: Option<BatchPhase>,
    pub tasks: Vec<Task>,
}
