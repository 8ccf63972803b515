//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock dependencies injected, so every swap route can be exercised
//! without network access, object storage or the face swap tool.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use faceswap_core::orchestrator::JobsConfig;
use faceswap_core::testing::{MockFetcher, MockPublisher, MockToolRunner};
use faceswap_core::{Config, Fetcher, Publisher, ToolRunner};

/// Re-export fixtures for test convenience
pub use faceswap_core::testing::fixtures;

/// Test fixture for E2E testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_single_swap() {
///     let fixture = TestFixture::new();
///
///     let response = fixture.post("/faceswap", json!({
///         "source_url": "https://x/a.jpg",
///         "target_url": "https://x/b.jpg"
///     })).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock fetcher - configure input downloads
    pub fetcher: Arc<MockFetcher>,
    /// Mock tool runner - control pass results
    pub runner: Arc<MockToolRunner>,
    /// Mock publisher - inspect uploads
    pub publisher: Arc<MockPublisher>,
    /// Temporary directory holding job workspaces and the target pool
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default job settings.
    pub fn new() -> Self {
        Self::with_jobs(JobsConfig::default())
    }

    /// Create a test fixture with custom admission and deadline settings.
    pub fn with_jobs(jobs: JobsConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        // Create mocks
        let fetcher = Arc::new(MockFetcher::new());
        let runner = Arc::new(MockToolRunner::new());
        let publisher = Arc::new(MockPublisher::with_bucket("swaps", "eu-west-1"));

        let mut config = Config::default();
        config.storage.bucket = "swaps".to_string();
        config.storage.region = "eu-west-1".to_string();
        config.jobs = jobs.clone();

        let orchestrator = fixtures::orchestrator_with(
            temp_dir.path(),
            jobs,
            Arc::clone(&fetcher) as Arc<dyn Fetcher>,
            Arc::clone(&runner) as Arc<dyn ToolRunner>,
            Arc::clone(&publisher) as Arc<dyn Publisher>,
        );

        let state = Arc::new(faceswap_server::state::AppState::new(
            config,
            Arc::new(orchestrator),
        ));

        // Create router
        let router = faceswap_server::api::create_router(state);

        Self {
            router,
            fetcher,
            runner,
            publisher,
            temp_dir,
        }
    }

    /// Fill the target pool with `count` images for `category`.
    pub fn target_pool(&self, category: &str, count: usize) {
        fixtures::target_pool(self.temp_dir.path(), category, count);
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

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.post_raw(path, &body.to_string()).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Send a GET request and return the raw text body.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}

/// Helper to assert a JSON path equals expected value.
#[macro_export]
macro_rules! assert_json_path {
    ($json:expr, $path:expr, $expected:expr) => {
        let actual = &$json[$path];
        assert_eq!(
            actual, &$expected,
            "Path '{}' expected {:?}, got {:?}",
            $path, $expected, actual
        );
    };
}
