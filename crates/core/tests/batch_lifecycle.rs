//! Batch lifecycle integration tests.
//!
//! These tests drive the full batch state machine through the orchestrator
//! with mock collaborators: active -> draining -> archived/archive_failed.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use batchdl_core::{
    testing::{MockArchiver, MockFetcher},
    BatchOrchestrator, BatchPhase, BatchStats, HistoryKind, OrchestratorConfig,
    OrchestratorError, SubmitRequest, TaskStatus,
};

/// Test helper wiring the orchestrator to mock collaborators.
struct TestHarness {
    orchestrator: Arc<BatchOrchestrator>,
    fetcher: Arc<MockFetcher>,
    archiver: Arc<MockArchiver>,
    temp_dir: TempDir,
}

impl TestHarness {
    async fn new() -> Self {
        Self::with_config(OrchestratorConfig::default()).await
    }

    async fn with_config(config: OrchestratorConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let fetcher = Arc::new(MockFetcher::new());
        let archiver = Arc::new(MockArchiver::new());

        // Fast fetches for testing
        fetcher.set_fetch_duration(Duration::from_millis(10)).await;

        let orchestrator = Arc::new(BatchOrchestrator::new(
            config,
            temp_dir.path().to_path_buf(),
            Arc::clone(&fetcher) as Arc<dyn batchdl_core::Fetcher>,
            Arc::clone(&archiver) as Arc<dyn batchdl_core::Archiver>,
        ));

        Self {
            orchestrator,
            fetcher,
            archiver,
            temp_dir,
        }
    }

    /// Poll the aggregate snapshot until `pred` holds or the deadline hits.
    async fn wait_for<F>(&self, pred: F) -> BatchStats
    where
        F: Fn(&BatchStats) -> bool,
    {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let stats = self.orchestrator.snapshot().await;
            if pred(&stats) {
                return stats;
            }
            if tokio::time::Instant::now() > deadline {
                panic!("timed out waiting for batch state, last: {:?}", stats);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    fn urls(n: usize) -> Vec<String> {
        (0..n)
            .map(|i| format!("http://files.example/item-{}.bin", i))
            .collect()
    }
}

#[tokio::test]
async fn test_full_lifecycle_with_auto_archive() {
    let harness = TestHarness::new().await;

    let handle = harness
        .orchestrator
        .start_batch(SubmitRequest {
            urls: TestHarness::urls(3),
            folder: Some("my batch".into()),
            auto_archive: true,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(handle.folder, "my batch");
    assert_eq!(handle.task_ids.len(), 3);

    let stats = harness
        .wait_for(|s| s.phase == Some(BatchPhase::Archived))
        .await;
    assert_eq!(stats.total, 3);
    assert_eq!(stats.completed, 3);
    assert_eq!(stats.errors, 0);
    assert_eq!(stats.pending, 0);

    // All fetched files landed inside the batch folder.
    for task in &stats.tasks {
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.progress, 100.0);
        let path = task.file_path.as_ref().unwrap();
        assert!(path.starts_with(harness.temp_dir.path().join("my batch")));
        assert!(path.exists());
    }

    // Exactly one archive call, with ledger entries for every event.
    assert_eq!(harness.archiver.archive_count().await, 1);
    let history = harness.orchestrator.history().all().await;
    assert_eq!(
        history
            .iter()
            .filter(|e| e.kind == HistoryKind::Completed)
            .count(),
        3
    );
    assert_eq!(
        history
            .iter()
            .filter(|e| e.kind == HistoryKind::Archived)
            .count(),
        1
    );
}

#[tokio::test]
async fn test_archive_happens_at_most_once_under_polling() {
    let harness = TestHarness::new().await;

    harness
        .orchestrator
        .start_batch(SubmitRequest {
            urls: TestHarness::urls(5),
            folder: Some("polled".into()),
            auto_archive: true,
            ..Default::default()
        })
        .await
        .unwrap();

    // Hammer the snapshot while the batch runs; aggregation is read-only
    // and must never trigger a second archive.
    harness
        .wait_for(|s| s.phase == Some(BatchPhase::Archived))
        .await;
    for _ in 0..50 {
        harness.orchestrator.snapshot().await;
    }
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(harness.archiver.archive_count().await, 1);
}

#[tokio::test]
async fn test_fetch_failure_is_isolated() {
    let harness = TestHarness::new().await;
    harness.fetcher.fail_url("http://files.example/item-1.bin").await;

    harness
        .orchestrator
        .start_batch(SubmitRequest {
            urls: TestHarness::urls(3),
            folder: Some("mixed".into()),
            auto_archive: true,
            ..Default::default()
        })
        .await
        .unwrap();

    let stats = harness
        .wait_for(|s| s.phase == Some(BatchPhase::Archived))
        .await;
    assert_eq!(stats.completed, 2);
    assert_eq!(stats.errors, 1);

    let failed: Vec<_> = stats
        .tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Error)
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].url, "http://files.example/item-1.bin");
    assert!(failed[0].error.is_some());
    assert!(failed[0].file_path.is_none());

    // The failure is in the ledger, and did not block archiving.
    let history = harness.orchestrator.history().all().await;
    assert_eq!(
        history
            .iter()
            .filter(|e| e.kind == HistoryKind::Error)
            .count(),
        1
    );
    assert_eq!(harness.archiver.archive_count().await, 1);
}

#[tokio::test]
async fn test_no_archive_without_auto_archive() {
    let harness = TestHarness::new().await;

    harness
        .orchestrator
        .start_batch(SubmitRequest {
            urls: TestHarness::urls(2),
            folder: Some("plain".into()),
            auto_archive: false,
            ..Default::default()
        })
        .await
        .unwrap();

    let stats = harness
        .wait_for(|s| s.phase == Some(BatchPhase::Draining))
        .await;
    assert_eq!(stats.completed, 2);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(harness.archiver.archive_count().await, 0);
    assert_eq!(
        harness.orchestrator.snapshot().await.phase,
        Some(BatchPhase::Draining)
    );
}

#[tokio::test]
async fn test_archive_failure_is_recorded() {
    let harness = TestHarness::new().await;
    harness.archiver.set_fail(true).await;

    harness
        .orchestrator
        .start_batch(SubmitRequest {
            urls: TestHarness::urls(2),
            folder: Some("doomed".into()),
            auto_archive: true,
            ..Default::default()
        })
        .await
        .unwrap();

    let stats = harness
        .wait_for(|s| s.phase == Some(BatchPhase::ArchiveFailed))
        .await;
    // Tasks themselves succeeded; only the archive step failed.
    assert_eq!(stats.completed, 2);
    assert_eq!(stats.errors, 0);

    let history = harness.orchestrator.history().all().await;
    let archive_errors: Vec<_> = history
        .iter()
        .filter(|e| {
            e.kind == HistoryKind::Error
                && e.detail
                    .as_deref()
                    .is_some_and(|d| d.starts_with("Failed to archive folder"))
        })
        .collect();
    assert_eq!(archive_errors.len(), 1);

    // The failed attempt is not retried by later polling.
    for _ in 0..20 {
        harness.orchestrator.snapshot().await;
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(harness.archiver.archive_count().await, 1);
}

#[tokio::test]
async fn test_manual_archive_recovers_failed_batch() {
    let harness = TestHarness::new().await;
    harness.archiver.set_fail(true).await;

    harness
        .orchestrator
        .start_batch(SubmitRequest {
            urls: TestHarness::urls(1),
            folder: Some("retry".into()),
            auto_archive: true,
            ..Default::default()
        })
        .await
        .unwrap();
    harness
        .wait_for(|s| s.phase == Some(BatchPhase::ArchiveFailed))
        .await;

    harness.archiver.set_fail(false).await;
    let result = harness.orchestrator.archive_folder("retry").await.unwrap();
    assert!(result.path.exists());
    assert_eq!(
        harness.orchestrator.snapshot().await.phase,
        Some(BatchPhase::Archived)
    );
}

#[tokio::test]
async fn test_manual_archive_of_missing_folder() {
    let harness = TestHarness::new().await;
    let result = harness.orchestrator.archive_folder("never-existed").await;
    assert!(matches!(result, Err(OrchestratorError::FolderNotFound(_))));
}

#[tokio::test]
async fn test_existing_archive_is_not_rebuilt() {
    let harness = TestHarness::new().await;

    tokio::fs::create_dir_all(harness.temp_dir.path().join("done"))
        .await
        .unwrap();
    tokio::fs::write(harness.temp_dir.path().join("done.zip"), b"already here")
        .await
        .unwrap();

    let result = harness.orchestrator.archive_folder("done").await.unwrap();
    assert_eq!(result.bytes, 12);
    assert_eq!(harness.archiver.archive_count().await, 0);
}

#[tokio::test]
async fn test_pool_bounds_concurrent_fetches() {
    let harness = TestHarness::new().await;
    harness
        .fetcher
        .set_fetch_duration(Duration::from_millis(40))
        .await;

    harness
        .orchestrator
        .start_batch(SubmitRequest {
            urls: TestHarness::urls(6),
            folder: Some("bounded".into()),
            workers: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();

    harness.wait_for(|s| s.completed == 6).await;
    assert!(
        harness.fetcher.max_concurrent() <= 2,
        "saw {} concurrent fetches with a pool of 2",
        harness.fetcher.max_concurrent()
    );
}

#[tokio::test]
async fn test_second_batch_replaces_view_history_accumulates() {
    let harness = TestHarness::new().await;

    harness
        .orchestrator
        .start_batch(SubmitRequest {
            urls: TestHarness::urls(2),
            folder: Some("first".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    harness.wait_for(|s| s.completed == 2).await;

    harness
        .orchestrator
        .start_batch(SubmitRequest {
            urls: vec!["http://files.example/second.bin".into()],
            folder: Some("second".into()),
            workers: Some(3),
            ..Default::default()
        })
        .await
        .unwrap();
    let stats = harness.wait_for(|s| s.completed == 1).await;

    // Live view only shows the new batch; the ledger keeps both.
    assert_eq!(stats.total, 1);
    assert_eq!(stats.folder.as_deref(), Some("second"));
    let history = harness.orchestrator.history().all().await;
    assert_eq!(
        history
            .iter()
            .filter(|e| e.kind == HistoryKind::Completed)
            .count(),
        3
    );
}

#[tokio::test]
async fn test_skipped_urls_counted_but_never_run() {
    let harness = TestHarness::new().await;

    harness
        .orchestrator
        .start_batch(SubmitRequest {
            urls: vec![
                "http://files.example/good.bin".into(),
                "definitely not a url".into(),
                "http://files.example/also-good.bin".into(),
            ],
            folder: Some("partial".into()),
            skip_invalid: true,
            ..Default::default()
        })
        .await
        .unwrap();

    let stats = harness.wait_for(|s| s.completed == 2).await;
    assert_eq!(stats.total, 2);
    assert_eq!(stats.skipped, 1);

    // The invalid URL never reached the fetcher.
    assert_eq!(harness.fetcher.fetch_count().await, 2);
    let history = harness.orchestrator.history().all().await;
    assert_eq!(
        history
            .iter()
            .filter(|e| e.kind == HistoryKind::Skipped)
            .count(),
        1
    );
}

#[tokio::test]
async fn test_clear_resets_view_and_history() {
    let harness = TestHarness::new().await;

    harness
        .orchestrator
        .start_batch(SubmitRequest {
            urls: TestHarness::urls(2),
            folder: Some("cleared".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    harness.wait_for(|s| s.completed == 2).await;

    harness.orchestrator.clear().await;
    let stats = harness.orchestrator.snapshot().await;
    assert_eq!(stats.total, 0);
    assert!(stats.tasks.is_empty());
    assert!(stats.folder.is_none());
    assert!(stats.phase.is_none());
    assert!(harness.orchestrator.history().all().await.is_empty());
}

#[tokio::test]
async fn test_progress_holds_without_content_length() {
    let harness = TestHarness::new().await;
    harness.fetcher.set_send_progress(false).await;

    harness
        .orchestrator
        .start_batch(SubmitRequest {
            urls: TestHarness::urls(1),
            folder: Some("quiet".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    // No progress updates at all: the snapshot must stay well-formed and
    // the task still completes at 100%.
    let stats = harness.wait_for(|s| s.completed == 1).await;
    assert!(stats.download_speed.is_finite());
    assert_eq!(stats.tasks[0].progress, 100.0);
}

#[tokio::test]
async fn test_shutdown_refuses_queued_work() {
    let harness = TestHarness::new().await;
    harness
        .fetcher
        .set_fetch_duration(Duration::from_millis(60))
        .await;

    harness
        .orchestrator
        .start_batch(SubmitRequest {
            urls: TestHarness::urls(8),
            folder: Some("stopping".into()),
            workers: Some(1),
            ..Default::default()
        })
        .await
        .unwrap();

    // Let the first task get picked up, then close the pool.
    tokio::time::sleep(Duration::from_millis(20)).await;
    harness.orchestrator.shutdown().await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    // Queued tasks were refused a permit and never reached the fetcher.
    assert!(harness.fetcher.fetch_count().await < 8);
}
