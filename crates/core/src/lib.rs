pub mod archiver;
pub mod config;
pub mod fetcher;
pub mod history;
pub mod metrics;
pub mod orchestrator;
pub mod storage;
pub mod task;
pub mod testing;

pub use archiver::{ArchiveError, ArchiveResult, Archiver, ZipArchiver};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, ServerConfig,
    StorageConfig,
};
pub use fetcher::{
    FetchError, FetchProgress, FetchRequest, FetchedFile, Fetcher, FetcherConfig, HttpFetcher,
};
pub use history::{HistoryEntry, HistoryKind, HistoryLedger};
pub use orchestrator::{
    BatchHandle, BatchOrchestrator, BatchPhase, BatchStats, OrchestratorConfig, OrchestratorError,
    SubmitRequest,
};
pub use storage::{
    generated_folder_name, resolve_under_root, sanitize_folder_name, CookieFile, StorageError,
};
pub use task::{Task, TaskId, TaskRegistry, TaskStatus};
