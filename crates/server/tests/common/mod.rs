//! Common test utilities for E2E testing with mocks.
//!
//! Provides a test fixture that builds an in-process router wired to mock
//! fetcher and archiver collaborators, so full lifecycles run without any
//! network access.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use batchdl_core::{
    testing::{MockArchiver, MockFetcher},
    BatchOrchestrator, Config, FetcherConfig, OrchestratorConfig, ServerConfig, StorageConfig,
};
use batchdl_server::api::create_router;
use batchdl_server::state::AppState;

/// Fixed boundary for hand-built multipart bodies.
const BOUNDARY: &str = "batchdl-test-boundary";

/// Test fixture for E2E testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new().await;
/// let response = fixture
///     .post_form("/start_download", &[("urls", "http://example.com/a")])
///     .await;
/// assert_eq!(response.status, StatusCode::ACCEPTED);
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock fetcher - control per-URL outcomes
    pub fetcher: Arc<MockFetcher>,
    /// Mock archiver - control archive outcomes
    pub archiver: Arc<MockArchiver>,
    /// Orchestrator behind the router
    pub orchestrator: Arc<BatchOrchestrator>,
    /// Temporary directory holding the download and upload roots
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub content_type: Option<String>,
    pub raw_body: Vec<u8>,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let download_root = temp_dir.path().join("downloads");
        let upload_root = temp_dir.path().join("uploads");

        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            storage: StorageConfig {
                download_root: download_root.clone(),
                upload_root,
                ..Default::default()
            },
            pool: OrchestratorConfig::default(),
            fetcher: FetcherConfig::default(),
        };

        let fetcher = Arc::new(MockFetcher::new());
        fetcher.set_fetch_duration(Duration::from_millis(10)).await;
        let archiver = Arc::new(MockArchiver::new());

        let orchestrator = Arc::new(BatchOrchestrator::new(
            config.pool.clone(),
            download_root,
            Arc::clone(&fetcher) as Arc<dyn batchdl_core::Fetcher>,
            Arc::clone(&archiver) as Arc<dyn batchdl_core::Archiver>,
        ));

        let state = Arc::new(AppState::new(config, Arc::clone(&orchestrator)));
        let router = create_router(state);

        Self {
            router,
            fetcher,
            archiver,
            orchestrator,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Send a POST request without a body.
    pub async fn post(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Send a multipart form POST with text fields only.
    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        self.post_form_with_file(path, fields, None).await
    }

    /// Send a multipart form POST, optionally with one file field.
    pub async fn post_form_with_file(
        &self,
        path: &str,
        fields: &[(&str, &str)],
        file: Option<(&str, &str, &[u8])>,
    ) -> TestResponse {
        let mut body: Vec<u8> = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    BOUNDARY, name, value
                )
                .as_bytes(),
            );
        }
        if let Some((name, filename, contents)) = file {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n",
                    BOUNDARY, name, filename
                )
                .as_bytes(),
            );
            body.extend_from_slice(contents);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Poll `/get_progress` until `pred` holds or the deadline hits.
    pub async fn wait_for_progress<F>(&self, pred: F) -> Value
    where
        F: Fn(&Value) -> bool,
    {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let response = self.get("/get_progress").await;
            assert_eq!(response.status, StatusCode::OK);
            if pred(&response.body) {
                return response.body;
            }
            if tokio::time::Instant::now() > deadline {
                panic!("timed out waiting for progress, last: {}", response.body);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let raw_body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        let body: Value = if raw_body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&raw_body).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            body,
            content_type,
            raw_body,
        }
    }
}
