//! Aggregate progress endpoint.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use batchdl_core::{BatchPhase, BatchStats, Task, TaskStatus};

use crate::state::AppState;

/// One task as shown to the UI.
#[derive(Debug, Serialize)]
pub struct TaskView {
    pub id: String,
    pub url: String,
    pub status: TaskStatus,
    /// Percentage in [0, 100].
    pub progress: f64,
    pub downloaded_bytes: u64,
    pub total_bytes: u64,
    pub filename: Option<String>,
    pub error: Option<String>,
}

impl From<Task> for TaskView {
    fn from(task: Task) -> Self {
        let filename = task
            .file_path
            .as_deref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string());
        Self {
            id: task.id,
            url: task.url,
            status: task.status,
            progress: task.progress,
            downloaded_bytes: task.downloaded_bytes,
            total_bytes: task.total_bytes,
            filename,
            error: task.error,
        }
    }
}

/// Aggregate progress over the current batch.
#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub total: usize,
    pub completed: usize,
    pub errors: usize,
    pub skipped: usize,
    pub pending: usize,
    pub active: usize,
    /// MiB per second, summed over active tasks.
    pub download_speed: f64,
    pub folder: Option<String>,
    pub phase: Option<BatchPhase>,
    pub tasks: Vec<TaskView>,
}

impl From<BatchStats> for ProgressResponse {
    fn from(stats: BatchStats) -> Self {
        Self {
            total: stats.total,
            completed: stats.completed,
            errors: stats.errors,
            skipped: stats.skipped,
            pending: stats.pending,
            active: stats.active,
            download_speed: stats.download_speed,
            folder: stats.folder,
            phase: stats.phase,
            tasks: stats.tasks.into_iter().map(TaskView::from).collect(),
        }
    }
}

/// Snapshot the current batch. Read-only; safe to poll aggressively.
pub async fn get_progress(State(state): State<Arc<AppState>>) -> Json<ProgressResponse> {
    let stats = state.orchestrator().snapshot().await;
    Json(ProgressResponse::from(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_task_view_extracts_filename() {
        let mut task = Task::new("http://example.com/a.bin", "batch", "{name}.{ext}");
        task.mark_completed(PathBuf::from("/downloads/batch/a.bin"));
        let view = TaskView::from(task);
        assert_eq!(view.filename.as_deref(), Some("a.bin"));
        assert_eq!(view.progress, 100.0);
    }

    #[test]
    fn test_progress_response_from_empty_stats() {
        let response = ProgressResponse::from(BatchStats::default());
        assert_eq!(response.total, 0);
        assert!(response.tasks.is_empty());
        assert!(response.folder.is_none());
    }
}
