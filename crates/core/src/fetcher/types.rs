use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Fetcher configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetcherConfig {
    /// Attempts per task before the fetch is reported failed.
    #[serde(default = "default_retries")]
    pub retries: u32,
    /// Connect timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_retries() -> u32 {
    3
}

fn default_timeout() -> u64 {
    30
}

/// Immutable inputs for one fetch.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    /// Directory the resulting file is written into.
    pub dest_dir: PathBuf,
    /// Filename template with `{name}` and `{ext}` placeholders.
    pub filename_template: String,
    /// Optional single-use credential file passed through to the remote.
    pub cookie_file: Option<PathBuf>,
}

/// Incremental byte progress reported during a fetch.
///
/// `total_bytes` is zero when the remote did not announce a length;
/// `total_bytes_estimate` may carry a best guess in that case.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchProgress {
    pub downloaded_bytes: u64,
    pub total_bytes: u64,
    pub total_bytes_estimate: u64,
}

/// Successful fetch outcome.
#[derive(Debug, Clone)]
pub struct FetchedFile {
    pub path: PathBuf,
    pub bytes: u64,
}
