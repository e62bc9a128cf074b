use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Worker pool bounds are sane
/// - Fetcher retry count is at least 1
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Pool validation
    if config.pool.default_workers == 0 {
        return Err(ConfigError::ValidationError(
            "pool.default_workers must be at least 1".to_string(),
        ));
    }
    if config.pool.max_workers < config.pool.default_workers {
        return Err(ConfigError::ValidationError(format!(
            "pool.max_workers ({}) cannot be lower than pool.default_workers ({})",
            config.pool.max_workers, config.pool.default_workers
        )));
    }

    // Fetcher validation
    if config.fetcher.retries == 0 {
        return Err(ConfigError::ValidationError(
            "fetcher.retries must be at least 1".to_string(),
        ));
    }

    Ok(())
}
