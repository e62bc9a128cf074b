//! Bounded-concurrency worker pool.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

/// A fixed-size pool of fetch slots.
///
/// Each submitted task runs on its own tokio task but holds one permit
/// while fetching, so at most `size` fetches execute concurrently.
/// Closing the pool is a non-blocking drain: in-flight work keeps its
/// permits and finishes, while tasks still waiting for a permit are
/// refused.
pub struct FetchPool {
    size: usize,
    semaphore: Arc<Semaphore>,
    closed: AtomicBool,
}

impl FetchPool {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            semaphore: Arc::new(Semaphore::new(size)),
            closed: AtomicBool::new(false),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Wait for a slot. Returns None once the pool has been closed.
    pub async fn acquire(&self) -> Option<OwnedSemaphorePermit> {
        if self.closed.load(Ordering::Acquire) {
            return None;
        }
        match Arc::clone(&self.semaphore).acquire_owned().await {
            Ok(permit) => {
                // A close may have raced the acquisition.
                if self.closed.load(Ordering::Acquire) {
                    return None;
                }
                Some(permit)
            }
            Err(_) => None,
        }
    }

    /// Refuse new work and wake waiting acquirers with a refusal.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.semaphore.close();
            debug!("Fetch pool of size {} closed", self.size);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
