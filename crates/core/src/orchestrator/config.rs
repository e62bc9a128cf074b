use serde::{Deserialize, Serialize};

/// Worker pool and submission policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrchestratorConfig {
    /// Pool size used when a submission does not request one.
    #[serde(default = "default_workers")]
    pub default_workers: usize,
    /// Upper bound for requested pool sizes.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    /// Domains whose URLs require an uploaded cookie file.
    #[serde(default = "default_cookie_domains")]
    pub cookie_required_domains: Vec<String>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            default_workers: default_workers(),
            max_workers: default_max_workers(),
            cookie_required_domains: default_cookie_domains(),
        }
    }
}

fn default_workers() -> usize {
    5
}

fn default_max_workers() -> usize {
    32
}

fn default_cookie_domains() -> Vec<String> {
    vec!["instagram.com".to_string(), "facebook.com".to_string()]
}
