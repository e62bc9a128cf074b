use std::sync::Arc;

use batchdl_core::{BatchOrchestrator, Config};

/// Shared application state
pub struct AppState {
    config: Config,
    orchestrator: Arc<BatchOrchestrator>,
}

impl AppState {
    pub fn new(config: Config, orchestrator: Arc<BatchOrchestrator>) -> Self {
        Self {
            config,
            orchestrator,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn orchestrator(&self) -> &Arc<BatchOrchestrator> {
        &self.orchestrator
    }
}
