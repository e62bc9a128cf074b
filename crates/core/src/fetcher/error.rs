use thiserror::Error;

/// Errors produced by a fetcher. Always isolated to the owning task.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP transport or status error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Local filesystem error while writing the result.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// All configured attempts failed.
    #[error("fetch failed for {url} after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retries_exhausted_display() {
        let err = FetchError::RetriesExhausted {
            url: "http://example.com/a".to_string(),
            attempts: 3,
            last_error: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "fetch failed for http://example.com/a after 3 attempts: connection refused"
        );
    }
}
