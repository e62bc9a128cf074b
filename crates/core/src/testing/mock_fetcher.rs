//! Mock fetcher for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};

use crate::fetcher::{FetchError, FetchProgress, FetchRequest, FetchedFile, Fetcher};

/// Mock implementation of the Fetcher trait.
///
/// Provides controllable behavior for testing:
/// - Records every fetch request for assertions
/// - Writes a real small file to the destination directory
/// - Simulates progress updates and fetch duration
/// - Fails specific URLs or the next fetch on demand
/// - Tracks the concurrency high-water mark for pool-bound assertions
#[derive(Debug)]
pub struct MockFetcher {
    /// Recorded fetch requests, in pickup order.
    requests: Arc<RwLock<Vec<FetchRequest>>>,
    /// If set, the next fetch fails with this error.
    next_error: Arc<RwLock<Option<FetchError>>>,
    /// URLs that always fail.
    failing_urls: Arc<RwLock<HashSet<String>>>,
    /// Simulated fetch duration in milliseconds.
    fetch_duration_ms: Arc<RwLock<u64>>,
    /// Whether to send progress updates during the fetch.
    send_progress: Arc<RwLock<bool>>,
    /// Payload size reported and written, in bytes.
    payload_bytes: Arc<RwLock<u64>>,
    current: Arc<AtomicUsize>,
    max_concurrent: Arc<AtomicUsize>,
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            requests: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            failing_urls: Arc::new(RwLock::new(HashSet::new())),
            fetch_duration_ms: Arc::new(RwLock::new(10)),
            send_progress: Arc::new(RwLock::new(true)),
            payload_bytes: Arc::new(RwLock::new(1024)),
            current: Arc::new(AtomicUsize::new(0)),
            max_concurrent: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get all recorded fetch requests.
    pub async fn recorded_requests(&self) -> Vec<FetchRequest> {
        self.requests.read().await.clone()
    }

    /// Get the number of fetches performed.
    pub async fn fetch_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Configure the next fetch to fail with the given error.
    pub async fn set_next_error(&self, error: FetchError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every fetch of the given URL fail.
    pub async fn fail_url(&self, url: &str) {
        self.failing_urls.write().await.insert(url.to_string());
    }

    /// Set the simulated fetch duration.
    pub async fn set_fetch_duration(&self, duration: Duration) {
        *self.fetch_duration_ms.write().await = duration.as_millis() as u64;
    }

    /// Enable or disable progress updates during fetches.
    pub async fn set_send_progress(&self, send: bool) {
        *self.send_progress.write().await = send;
    }

    /// Set the payload size written and reported.
    pub async fn set_payload_bytes(&self, bytes: u64) {
        *self.payload_bytes.write().await = bytes;
    }

    /// Highest number of fetches observed running at once.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent.load(Ordering::SeqCst)
    }

    async fn take_error(&self) -> Option<FetchError> {
        self.next_error.write().await.take()
    }

    fn filename_for(url: &str) -> String {
        let tail = url
            .rsplit('/')
            .next()
            .filter(|t| !t.is_empty())
            .unwrap_or("download.bin");
        tail.to_string()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(
        &self,
        request: FetchRequest,
        progress_tx: mpsc::Sender<FetchProgress>,
    ) -> Result<FetchedFile, FetchError> {
        self.requests.write().await.push(request.clone());

        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent.fetch_max(now, Ordering::SeqCst);

        let result = self.run_fetch(&request, &progress_tx).await;

        self.current.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

impl MockFetcher {
    async fn run_fetch(
        &self,
        request: &FetchRequest,
        progress_tx: &mpsc::Sender<FetchProgress>,
    ) -> Result<FetchedFile, FetchError> {
        let duration_ms = *self.fetch_duration_ms.read().await;
        let send_progress = *self.send_progress.read().await;
        let total = *self.payload_bytes.read().await;

        let fails = self.failing_urls.read().await.contains(&request.url);

        if send_progress {
            let steps = 4u64;
            for i in 1..=steps {
                let _ = progress_tx
                    .send(FetchProgress {
                        downloaded_bytes: total * i / steps,
                        total_bytes: total,
                        total_bytes_estimate: 0,
                    })
                    .await;
                if duration_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(duration_ms / steps)).await;
                }
            }
        } else if duration_ms > 0 {
            tokio::time::sleep(Duration::from_millis(duration_ms)).await;
        }

        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        if fails {
            return Err(FetchError::RetriesExhausted {
                url: request.url.clone(),
                attempts: 1,
                last_error: "simulated fetch failure".to_string(),
            });
        }

        tokio::fs::create_dir_all(&request.dest_dir).await?;
        let path = request.dest_dir.join(Self::filename_for(&request.url));
        tokio::fs::write(&path, vec![0u8; total as usize]).await?;

        Ok(FetchedFile { path, bytes: total })
    }
}
