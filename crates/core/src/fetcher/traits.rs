//! Trait definition for the fetcher collaborator.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::FetchError;
use super::types::{FetchProgress, FetchRequest, FetchedFile};

/// A fetcher that retrieves one remote resource to a local file.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Returns the name of this fetcher implementation.
    fn name(&self) -> &str;

    /// Fetches the resource described by `request`, sending incremental
    /// byte progress on `progress_tx`.
    ///
    /// If the receiver is dropped, fetching continues without progress
    /// reporting.
    async fn fetch(
        &self,
        request: FetchRequest,
        progress_tx: mpsc::Sender<FetchProgress>,
    ) -> Result<FetchedFile, FetchError>;
}
