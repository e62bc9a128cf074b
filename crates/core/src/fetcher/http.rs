//! Streaming HTTP fetcher implementation.

use async_trait::async_trait;
use futures::StreamExt;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::error::FetchError;
use super::traits::Fetcher;
use super::types::{FetchProgress, FetchRequest, FetchedFile, FetcherConfig};

/// HTTP fetcher with a bounded retry loop and per-chunk progress.
pub struct HttpFetcher {
    client: reqwest::Client,
    config: FetcherConfig,
}

impl HttpFetcher {
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    async fn try_fetch(
        &self,
        request: &FetchRequest,
        progress_tx: &mpsc::Sender<FetchProgress>,
    ) -> Result<FetchedFile, FetchError> {
        let mut builder = self.client.get(&request.url);

        // Single-use credential pass-through: the raw cookie header value
        // is read from the uploaded file.
        if let Some(ref cookie_path) = request.cookie_file {
            let cookie = tokio::fs::read_to_string(cookie_path).await?;
            builder = builder.header(reqwest::header::COOKIE, cookie.trim().to_string());
        }

        let response = builder.send().await?.error_for_status()?;
        let total_bytes = response.content_length().unwrap_or(0);

        tokio::fs::create_dir_all(&request.dest_dir).await?;
        let filename = render_filename(&request.filename_template, &request.url);
        let dest = request.dest_dir.join(filename);
        let mut file = tokio::fs::File::create(&dest).await?;

        let mut downloaded = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
            let _ = progress_tx
                .send(FetchProgress {
                    downloaded_bytes: downloaded,
                    total_bytes,
                    total_bytes_estimate: 0,
                })
                .await;
        }
        file.flush().await?;

        debug!("Fetched {} ({} bytes) to {:?}", request.url, downloaded, dest);
        Ok(FetchedFile {
            path: dest,
            bytes: downloaded,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(
        &self,
        request: FetchRequest,
        progress_tx: mpsc::Sender<FetchProgress>,
    ) -> Result<FetchedFile, FetchError> {
        let mut last_error = String::new();
        for attempt in 1..=self.config.retries {
            match self.try_fetch(&request, &progress_tx).await {
                Ok(file) => return Ok(file),
                Err(e) => {
                    warn!(
                        "Fetch attempt {}/{} failed for {}: {}",
                        attempt, self.config.retries, request.url, e
                    );
                    last_error = e.to_string();
                }
            }
        }
        Err(FetchError::RetriesExhausted {
            url: request.url,
            attempts: self.config.retries,
            last_error,
        })
    }
}

/// Render a destination filename from the template and the URL path tail.
///
/// Supports `{name}` and `{ext}` placeholders. URLs without a usable tail
/// fall back to `download.bin`.
fn render_filename(template: &str, url: &str) -> String {
    let tail = url
        .split('/')
        .next_back()
        .unwrap_or("")
        .split(['?', '#'])
        .next()
        .unwrap_or("");
    let tail = if tail.is_empty() { "download.bin" } else { tail };

    let (name, ext) = match tail.rsplit_once('.') {
        Some((name, ext)) if !name.is_empty() && !ext.is_empty() => (name, ext),
        _ => (tail, "bin"),
    };

    template.replace("{name}", name).replace("{ext}", ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_filename_basic() {
        assert_eq!(
            render_filename("{name}.{ext}", "http://example.com/video.mp4"),
            "video.mp4"
        );
    }

    #[test]
    fn test_render_filename_strips_query() {
        assert_eq!(
            render_filename("{name}.{ext}", "http://example.com/clip.webm?token=abc"),
            "clip.webm"
        );
    }

    #[test]
    fn test_render_filename_no_extension() {
        assert_eq!(
            render_filename("{name}.{ext}", "http://example.com/resource"),
            "resource.bin"
        );
    }

    #[test]
    fn test_render_filename_bare_host() {
        assert_eq!(
            render_filename("{name}.{ext}", "http://example.com/"),
            "download.bin"
        );
    }

    #[test]
    fn test_render_filename_custom_template() {
        assert_eq!(
            render_filename("copy-of-{name}.{ext}", "http://example.com/a.txt"),
            "copy-of-a.txt"
        );
    }
}
