//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Batch submissions and fetch outcomes
//! - Worker pool occupancy
//! - Archive creation

use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts};

/// Batches started total.
pub static BATCHES_STARTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("batchdl_batches_started_total", "Total batches started").unwrap()
});

/// Fetch outcomes total by result.
pub static FETCH_RESULTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("batchdl_fetch_results_total", "Total fetch task outcomes"),
        &["result"], // "completed", "error"
    )
    .unwrap()
});

/// Tasks currently held by a worker.
pub static ACTIVE_TASKS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "batchdl_active_tasks",
        "Number of tasks currently being fetched",
    )
    .unwrap()
});

/// Archives created total.
pub static ARCHIVES_CREATED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "batchdl_archives_created_total",
        "Total batch archives created",
    )
    .unwrap()
});

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(BATCHES_STARTED.clone()),
        Box::new(FETCH_RESULTS.clone()),
        Box::new(ACTIVE_TASKS.clone()),
        Box::new(ARCHIVES_CREATED.clone()),
    ]
}
