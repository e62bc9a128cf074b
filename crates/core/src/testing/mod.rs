//! Testing utilities and mock implementations for E2E tests.
//!
//! This module provides mock implementations of the fetcher and archiver
//! collaborators, allowing full lifecycle testing without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use batchdl_core::testing::{MockArchiver, MockFetcher};
//!
//! let fetcher = MockFetcher::new();
//! fetcher.fail_url("http://example.com/broken").await;
//!
//! let archiver = MockArchiver::new();
//!
//! // Use in BatchOrchestrator::new(...)
//! ```

mod mock_archiver;
mod mock_fetcher;

pub use mock_archiver::{MockArchiver, RecordedArchive};
pub use mock_fetcher::MockFetcher;
