//! Batch orchestration engine.
//!
//! Owns the current batch, validates submissions, runs tasks through the
//! bounded worker pool against the fetcher collaborator, aggregates
//! progress on demand, and drives the completion/auto-archive state
//! machine exactly once per batch.

mod config;
mod pool;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use pool::FetchPool;
pub use runner::BatchOrchestrator;
pub use types::{BatchHandle, BatchPhase, BatchStats, OrchestratorError, SubmitRequest};
