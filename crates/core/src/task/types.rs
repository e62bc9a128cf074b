//! Task record and status machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Opaque unique task identifier.
pub type TaskId = String;

/// Lifecycle status of a task.
///
/// A task is created `Pending`, marked `Active` by the worker that owns
/// it, and ends in exactly one of the terminal states. Terminal tasks are
/// never mutated again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Active,
    Completed,
    Error,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Error)
    }
}

/// One fetch unit of work and its progress record.
///
/// The identity and input fields are immutable after creation. The
/// progress fields are written only by the single worker that owns the
/// task; readers take cloned snapshots through the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub url: String,
    pub folder: String,
    pub filename_template: String,
    pub status: TaskStatus,
    /// Progress percentage in [0, 100].
    pub progress: f64,
    pub downloaded_bytes: u64,
    pub total_bytes: u64,
    /// Server-provided estimate used when the exact total is unknown.
    pub total_bytes_estimate: u64,
    pub started_at: Option<DateTime<Utc>>,
    /// Set only on success.
    pub file_path: Option<PathBuf>,
    /// Set only on failure.
    pub error: Option<String>,
}

impl Task {
    pub fn new(url: &str, folder: &str, filename_template: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            url: url.to_string(),
            folder: folder.to_string(),
            filename_template: filename_template.to_string(),
            status: TaskStatus::Pending,
            progress: 0.0,
            downloaded_bytes: 0,
            total_bytes: 0,
            total_bytes_estimate: 0,
            started_at: None,
            file_path: None,
            error: None,
        }
    }

    /// Mark the task picked up by its worker.
    pub fn mark_active(&mut self) {
        self.status = TaskStatus::Active;
        self.started_at = Some(Utc::now());
    }

    /// Apply a progress update from the fetcher.
    ///
    /// Prefers the exact total, falls back to the estimate, and holds the
    /// last known percentage when neither is available. Never divides by
    /// zero.
    pub fn update_progress(&mut self, downloaded: u64, total: u64, estimate: u64) {
        self.downloaded_bytes = downloaded;
        if total > 0 {
            self.total_bytes = total;
        }
        if estimate > 0 {
            self.total_bytes_estimate = estimate;
        }

        let denominator = if self.total_bytes > 0 {
            self.total_bytes
        } else {
            self.total_bytes_estimate
        };
        if denominator > 0 {
            // 100 is reserved for completed tasks; a final in-flight chunk
            // reports just below it until mark_completed.
            self.progress = (downloaded as f64 / denominator as f64 * 100.0).min(99.9);
        }
    }

    pub fn mark_completed(&mut self, file_path: PathBuf) {
        self.status = TaskStatus::Completed;
        self.progress = 100.0;
        self.file_path = Some(file_path);
    }

    pub fn mark_failed(&mut self, error: String) {
        self.status = TaskStatus::Error;
        self.error = Some(error);
    }

    /// Seconds since the task started, zero if it has not.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> f64 {
        match self.started_at {
            Some(started) => {
                let millis = now.signed_duration_since(started).num_milliseconds();
                (millis.max(0) as f64) / 1000.0
            }
            None => 0.0,
        }
    }
}
