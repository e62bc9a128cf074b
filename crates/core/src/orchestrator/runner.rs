//! Batch orchestrator implementation.
//!
//! Submission flow: validate URLs and policy, reset the live task view,
//! size the pool, spawn one worker per task. Each worker owns its task
//! exclusively from pickup to terminal state; the completion watcher run
//! by finishing workers drives the draining/auto-archive state machine.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

use crate::archiver::{ArchiveResult, Archiver};
use crate::fetcher::{FetchProgress, FetchRequest, Fetcher};
use crate::history::{HistoryEntry, HistoryLedger};
use crate::metrics;
use crate::storage::{
    generated_folder_name, resolve_under_root, sanitize_folder_name, CookieFile, StorageError,
};
use crate::task::{Task, TaskRegistry, TaskStatus};

use super::config::OrchestratorConfig;
use super::pool::FetchPool;
use super::types::{BatchHandle, BatchPhase, BatchStats, OrchestratorError, SubmitRequest};

/// Generic `scheme://host/...` shape check.
static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[A-Za-z0-9][A-Za-z0-9.-]*(:\d+)?(/\S*)?$").unwrap());

/// Mutable state of the one current batch.
struct BatchState {
    folder: String,
    auto_archive: bool,
    /// Number of created tasks. Skipped URLs never become tasks and are
    /// counted separately.
    total: usize,
    skipped: usize,
    phase: BatchPhase,
    /// At-most-once guard for auto-archiving.
    archive_attempted: Arc<AtomicBool>,
}

/// The batch orchestrator - owns the current batch, the live task view,
/// the history ledger, and the worker pool.
pub struct BatchOrchestrator {
    config: OrchestratorConfig,
    download_root: PathBuf,
    fetcher: Arc<dyn Fetcher>,
    archiver: Arc<dyn Archiver>,
    registry: Arc<TaskRegistry>,
    history: Arc<HistoryLedger>,
    pool: RwLock<Arc<FetchPool>>,
    batch: RwLock<Option<BatchState>>,
}

impl BatchOrchestrator {
    pub fn new(
        config: OrchestratorConfig,
        download_root: PathBuf,
        fetcher: Arc<dyn Fetcher>,
        archiver: Arc<dyn Archiver>,
    ) -> Self {
        let pool = Arc::new(FetchPool::new(config.default_workers));
        Self {
            config,
            download_root,
            fetcher,
            archiver,
            registry: Arc::new(TaskRegistry::new()),
            history: Arc::new(HistoryLedger::new()),
            pool: RwLock::new(pool),
            batch: RwLock::new(None),
        }
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn history(&self) -> &HistoryLedger {
        &self.history
    }

    pub fn download_root(&self) -> &std::path::Path {
        &self.download_root
    }

    /// Validate a submission and start its tasks.
    ///
    /// All-or-nothing: any rejection happens before a single task is
    /// created. On success the previous batch's live view is replaced.
    pub async fn start_batch(
        self: &Arc<Self>,
        mut request: SubmitRequest,
    ) -> Result<BatchHandle, OrchestratorError> {
        // The uploaded credential is single-use: take ownership before any
        // validation so a rejected submission still deletes it on drop.
        let cookie = request
            .cookie_file
            .take()
            .map(|p| Arc::new(CookieFile::new(p)));

        let workers = request.workers.unwrap_or(self.config.default_workers);
        if workers == 0 || workers > self.config.max_workers {
            return Err(OrchestratorError::WorkerCount {
                requested: workers,
                max: self.config.max_workers,
            });
        }

        let urls: Vec<String> = request
            .urls
            .iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect();

        // Credential policy is checked before any task exists.
        if cookie.is_none() {
            if let Some(domain) = urls.iter().find_map(|u| self.cookie_domain(u)) {
                return Err(OrchestratorError::CookieRequired(domain));
            }
        }

        let mut valid = Vec::new();
        let mut skipped_entries = Vec::new();
        for url in urls {
            if URL_RE.is_match(&url) {
                valid.push(url);
            } else if request.skip_invalid {
                skipped_entries.push(HistoryEntry::skipped(&url, "Invalid URL"));
            } else {
                return Err(OrchestratorError::InvalidUrl(url));
            }
        }
        if valid.is_empty() {
            return Err(OrchestratorError::EmptyBatch);
        }

        let folder = request
            .folder
            .as_deref()
            .and_then(sanitize_folder_name)
            .unwrap_or_else(generated_folder_name);
        let dest_dir = resolve_under_root(&self.download_root, &folder)?;
        tokio::fs::create_dir_all(&dest_dir)
            .await
            .map_err(StorageError::Io)?;

        // Replace the previous batch's live view. History is cumulative.
        self.registry.clear().await;
        let skipped = skipped_entries.len();
        for entry in skipped_entries {
            self.history.append(entry).await;
        }

        let pool = self.rebuild_pool_if_needed(workers).await;

        let template = request
            .filename_template
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "{name}.{ext}".to_string());

        let mut task_ids = Vec::with_capacity(valid.len());
        let mut handles = Vec::with_capacity(valid.len());
        for url in &valid {
            let task = Task::new(url, &folder, &template);
            task_ids.push(task.id.clone());
            handles.push(self.registry.insert(task).await);
        }

        *self.batch.write().await = Some(BatchState {
            folder: folder.clone(),
            auto_archive: request.auto_archive,
            total: valid.len(),
            skipped,
            phase: BatchPhase::Active,
            archive_attempted: Arc::new(AtomicBool::new(false)),
        });

        metrics::BATCHES_STARTED.inc();
        info!(
            "Started batch '{}': {} tasks, {} skipped, {} workers",
            folder,
            valid.len(),
            skipped,
            workers
        );

        for handle in handles {
            self.spawn_worker(handle, Arc::clone(&pool), dest_dir.clone(), cookie.clone());
        }

        Ok(BatchHandle { folder, task_ids })
    }

    /// Returns the cookie-requiring domain matched by `url`, if any.
    fn cookie_domain(&self, url: &str) -> Option<String> {
        let lower = url.to_lowercase();
        self.config
            .cookie_required_domains
            .iter()
            .find(|d| lower.contains(d.as_str()))
            .cloned()
    }

    /// Swap in a new pool when the requested size differs.
    ///
    /// The old pool is closed, not awaited: in-flight tasks from a prior
    /// batch finish on their own, queued ones are refused. Best-effort
    /// drain, never blocks the submission.
    async fn rebuild_pool_if_needed(&self, workers: usize) -> Arc<FetchPool> {
        let mut guard = self.pool.write().await;
        if guard.size() != workers || guard.is_closed() {
            guard.close();
            *guard = Arc::new(FetchPool::new(workers));
            debug!("Rebuilt fetch pool with {} workers", workers);
        }
        Arc::clone(&guard)
    }

    fn spawn_worker(
        self: &Arc<Self>,
        task: Arc<RwLock<Task>>,
        pool: Arc<FetchPool>,
        dest_dir: PathBuf,
        cookie: Option<Arc<CookieFile>>,
    ) {
        let orchestrator = Arc::clone(self);
        tokio::spawn(async move {
            // A refused permit means the pool was torn down under us; the
            // batch that owned this task is gone from the live view.
            let Some(_permit) = pool.acquire().await else {
                return;
            };
            orchestrator.run_task(task, dest_dir, cookie).await;
        });
    }

    /// Execute one task to a terminal state. The worker owns the task for
    /// its whole lifetime; nobody else writes it.
    async fn run_task(
        &self,
        task: Arc<RwLock<Task>>,
        dest_dir: PathBuf,
        cookie: Option<Arc<CookieFile>>,
    ) {
        let (id, url, template) = {
            let t = task.read().await;
            (t.id.clone(), t.url.clone(), t.filename_template.clone())
        };

        self.registry.mark_active(&id).await;
        task.write().await.mark_active();
        metrics::ACTIVE_TASKS.inc();

        // Forward fetcher progress onto the task's mutable fields. The
        // sender is dropped by the fetcher when it returns, which ends
        // the forwarder.
        let (progress_tx, mut progress_rx) = mpsc::channel::<FetchProgress>(32);
        let progress_task = Arc::clone(&task);
        let forwarder = tokio::spawn(async move {
            while let Some(p) = progress_rx.recv().await {
                progress_task.write().await.update_progress(
                    p.downloaded_bytes,
                    p.total_bytes,
                    p.total_bytes_estimate,
                );
            }
        });

        let fetch_request = FetchRequest {
            url: url.clone(),
            dest_dir,
            filename_template: template,
            cookie_file: cookie.as_ref().map(|c| c.path().to_path_buf()),
        };
        let result = self.fetcher.fetch(fetch_request, progress_tx).await;
        let _ = forwarder.await;

        match result {
            Ok(file) => {
                task.write().await.mark_completed(file.path.clone());
                self.history
                    .append(HistoryEntry::completed(&url, &file.path))
                    .await;
                metrics::FETCH_RESULTS.with_label_values(&["completed"]).inc();
                info!("Task {} completed: {:?}", id, file.path);
            }
            Err(e) => {
                let detail = e.to_string();
                task.write().await.mark_failed(detail.clone());
                self.history.append(HistoryEntry::failed(&url, &detail)).await;
                metrics::FETCH_RESULTS.with_label_values(&["error"]).inc();
                warn!("Task {} failed for {}: {}", id, url, detail);
            }
        }

        // Release discipline: active-set removal and the cookie-file
        // reference drop happen on every outcome.
        metrics::ACTIVE_TASKS.dec();
        self.registry.mark_inactive(&id).await;
        drop(cookie);

        self.finish_batch_if_done().await;
    }

    /// Completion watcher, run by each finishing worker.
    ///
    /// Moves the batch to `draining` once every task is terminal and,
    /// when auto-archive was requested, archives the batch folder at most
    /// once.
    async fn finish_batch_if_done(&self) {
        let (folder, auto_archive, attempted, total) = {
            let guard = self.batch.read().await;
            let Some(batch) = guard.as_ref() else {
                return;
            };
            (
                batch.folder.clone(),
                batch.auto_archive,
                Arc::clone(&batch.archive_attempted),
                batch.total,
            )
        };
        if total == 0 {
            return;
        }

        let completed = self.registry.count_status(TaskStatus::Completed).await;
        let errors = self.registry.count_status(TaskStatus::Error).await;
        if completed + errors < total {
            return;
        }

        {
            let mut guard = self.batch.write().await;
            if let Some(batch) = guard.as_mut() {
                if batch.folder == folder && batch.phase == BatchPhase::Active {
                    batch.phase = BatchPhase::Draining;
                    info!("Batch '{}' fully terminal, draining", folder);
                }
            }
        }

        if !auto_archive {
            return;
        }
        if attempted.swap(true, Ordering::SeqCst) {
            return;
        }

        let phase = match self.archive_into_ledger(&folder).await {
            Ok(_) => BatchPhase::Archived,
            Err(_) => BatchPhase::ArchiveFailed,
        };
        let mut guard = self.batch.write().await;
        if let Some(batch) = guard.as_mut() {
            if batch.folder == folder {
                batch.phase = phase;
            }
        }
    }

    /// Archive a folder under the download root, recording the outcome in
    /// the ledger. An already-existing archive is returned as-is without
    /// a new ledger entry (filesystem idempotence guard).
    async fn archive_into_ledger(
        &self,
        folder: &str,
    ) -> Result<ArchiveResult, OrchestratorError> {
        let dir = resolve_under_root(&self.download_root, folder)?;
        let dest = dir.with_extension("zip");

        if dest.exists() {
            let bytes = tokio::fs::metadata(&dest)
                .await
                .map(|m| m.len())
                .unwrap_or(0);
            debug!("Archive for '{}' already exists, reusing {:?}", folder, dest);
            return Ok(ArchiveResult {
                path: dest,
                bytes,
                files: 0,
            });
        }

        match self.archiver.archive(&dir, &dest).await {
            Ok(result) => {
                self.history
                    .append(HistoryEntry::archived(&result.path))
                    .await;
                metrics::ARCHIVES_CREATED.inc();
                info!(
                    "Archived batch '{}' into {:?} ({} bytes)",
                    folder, result.path, result.bytes
                );
                Ok(result)
            }
            Err(e) => {
                self.history
                    .append(HistoryEntry::archive_failed(folder, &e.to_string()))
                    .await;
                warn!("Failed to archive batch '{}': {}", folder, e);
                Err(e.into())
            }
        }
    }

    /// On-demand archive request for any folder under the download root.
    pub async fn archive_folder(
        &self,
        folder: &str,
    ) -> Result<ArchiveResult, OrchestratorError> {
        let dir = resolve_under_root(&self.download_root, folder)?;
        if !dir.is_dir() {
            return Err(OrchestratorError::FolderNotFound(folder.to_string()));
        }

        let result = self.archive_into_ledger(folder).await?;

        // A manual archive of the current batch settles its phase.
        let mut guard = self.batch.write().await;
        if let Some(batch) = guard.as_mut() {
            if batch.folder == folder
                && matches!(batch.phase, BatchPhase::Draining | BatchPhase::ArchiveFailed)
            {
                batch.phase = BatchPhase::Archived;
            }
        }
        Ok(result)
    }

    /// Resolve an existing folder for folder-scoped operations.
    pub async fn resolve_folder(&self, folder: &str) -> Result<PathBuf, OrchestratorError> {
        let dir = resolve_under_root(&self.download_root, folder)?;
        if !dir.is_dir() {
            return Err(OrchestratorError::FolderNotFound(folder.to_string()));
        }
        Ok(dir)
    }

    /// Pull-based aggregate snapshot. Read-only; tolerates concurrent
    /// task mutation by reading per-task cloned snapshots.
    pub async fn snapshot(&self) -> BatchStats {
        let tasks = self.registry.all().await;
        let total = tasks.len();
        let completed = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count();
        let errors = tasks.iter().filter(|t| t.status == TaskStatus::Error).count();
        let pending = total - completed - errors;

        let now = Utc::now();
        let active_tasks = self.registry.active_snapshots().await;
        let active = active_tasks.len();
        let bytes_per_sec: f64 = active_tasks
            .iter()
            .map(|t| {
                let elapsed = t.elapsed_secs(now);
                if elapsed > 0.0 {
                    t.downloaded_bytes as f64 / elapsed
                } else {
                    0.0
                }
            })
            .sum();
        let download_speed = bytes_per_sec / (1024.0 * 1024.0);

        let (folder, phase, skipped) = {
            let guard = self.batch.read().await;
            match guard.as_ref() {
                Some(batch) => (
                    Some(batch.folder.clone()),
                    Some(batch.phase),
                    batch.skipped,
                ),
                None => (None, None, 0),
            }
        };

        BatchStats {
            total,
            completed,
            errors,
            skipped,
            pending,
            active,
            download_speed,
            folder,
            phase,
            tasks,
        }
    }

    /// Reset the live task set, history, and current batch.
    pub async fn clear(&self) {
        self.registry.clear().await;
        self.history.clear().await;
        *self.batch.write().await = None;
        info!("Cleared live task view and history");
    }

    /// Refuse new work on shutdown; in-flight fetches finish on their own.
    pub async fn shutdown(&self) {
        self.pool.read().await.close();
        info!("Orchestrator shut down");
    }
}
