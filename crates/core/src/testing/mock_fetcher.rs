//! Mock fetcher for testing.

use async_trait::async_trait;
use reqwest::Url;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::fetcher::{FetchError, FetchedFile, Fetcher};

/// Configured behavior for a URL.
#[derive(Debug, Clone)]
enum MockResponse {
    Body(Vec<u8>),
    Status(u16),
    Transport(String),
}

/// A recorded fetch for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedFetch {
    pub url: Url,
    pub destination: PathBuf,
    pub success: bool,
}

/// Mock implementation of the Fetcher trait.
///
/// Unknown URLs succeed with a small placeholder body. Failures never leave
/// a file at the destination, like the real fetcher.
///
/// # Example
///
/// ```rust,ignore
/// use faceswap_core::testing::MockFetcher;
///
/// let fetcher = MockFetcher::new();
/// fetcher.set_status("https://x/b.jpg", 404).await;
///
/// let err = fetcher.fetch(&url, &dest).await.unwrap_err();
/// assert_eq!(err.status(), Some(404));
/// ```
#[derive(Debug, Default)]
pub struct MockFetcher {
    responses: Arc<RwLock<HashMap<String, MockResponse>>>,
    fetches: Arc<RwLock<Vec<RecordedFetch>>>,
    delay_ms: Arc<RwLock<u64>>,
}

impl MockFetcher {
    /// Create a new mock fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`.
    pub async fn set_body(&self, url: &str, body: impl Into<Vec<u8>>) {
        self.responses
            .write()
            .await
            .insert(url.to_string(), MockResponse::Body(body.into()));
    }

    /// Answer `url` with a non-success HTTP status.
    pub async fn set_status(&self, url: &str, status: u16) {
        self.responses
            .write()
            .await
            .insert(url.to_string(), MockResponse::Status(status));
    }

    /// Fail `url` with a transport error.
    pub async fn set_transport_error(&self, url: &str, reason: &str) {
        self.responses
            .write()
            .await
            .insert(url.to_string(), MockResponse::Transport(reason.to_string()));
    }

    /// Delay every fetch by `duration`.
    pub async fn set_delay(&self, duration: Duration) {
        *self.delay_ms.write().await = duration.as_millis() as u64;
    }

    /// Get all recorded fetches.
    pub async fn recorded_fetches(&self) -> Vec<RecordedFetch> {
        self.fetches.read().await.clone()
    }

    /// Get the number of fetches attempted.
    pub async fn fetch_count(&self) -> usize {
        self.fetches.read().await.len()
    }

    async fn record(&self, url: &Url, destination: &Path, success: bool) {
        self.fetches.write().await.push(RecordedFetch {
            url: url.clone(),
            destination: destination.to_path_buf(),
            success,
        });
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, url: &Url, destination: &Path) -> Result<FetchedFile, FetchError> {
        let delay_ms = *self.delay_ms.read().await;
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        let response = self
            .responses
            .read()
            .await
            .get(url.as_str())
            .cloned()
            .unwrap_or_else(|| MockResponse::Body(b"mock-media".to_vec()));

        match response {
            MockResponse::Body(body) => {
                tokio::fs::write(destination, &body)
                    .await
                    .map_err(|e| FetchError::io(destination, e))?;
                self.record(url, destination, true).await;
                Ok(FetchedFile {
                    path: destination.to_path_buf(),
                    bytes: body.len() as u64,
                })
            }
            MockResponse::Status(status) => {
                self.record(url, destination, false).await;
                Err(FetchError::Status {
                    url: url.to_string(),
                    status,
                })
            }
            MockResponse::Transport(reason) => {
                self.record(url, destination, false).await;
                Err(FetchError::Transport {
                    url: url.to_string(),
                    reason,
                })
            }
        }
    }
}
