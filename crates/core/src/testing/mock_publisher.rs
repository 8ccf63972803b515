//! Mock publisher for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::job::MediaKind;
use crate::publisher::{object_key, public_url, PublishedObject, Publisher, UploadError};

/// A recorded upload for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub path: PathBuf,
    pub kind: MediaKind,
    pub key: String,
    /// Contents of the file at upload time.
    pub contents: Vec<u8>,
}

/// Mock implementation of the Publisher trait.
///
/// Builds real public URLs for `bucket`/`region` and keeps uploaded objects
/// in memory until deleted.
#[derive(Debug)]
pub struct MockPublisher {
    bucket: String,
    region: String,
    uploads: Arc<RwLock<Vec<RecordedUpload>>>,
    stored: Arc<RwLock<HashSet<String>>>,
    deleted: Arc<RwLock<Vec<String>>>,
    /// 1-based publish call numbers that fail with a transport error.
    failing_calls: Arc<RwLock<HashSet<usize>>>,
    /// 1-based publish call numbers that stall before completing.
    delayed_calls: Arc<RwLock<HashMap<usize, Duration>>>,
    missing_credentials: Arc<RwLock<bool>>,
    calls: Arc<RwLock<usize>>,
}

impl Default for MockPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPublisher {
    /// Create a new mock publisher for bucket `bucket` in region `region`.
    pub fn new() -> Self {
        Self::with_bucket("bucket", "region")
    }

    pub fn with_bucket(bucket: &str, region: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            region: region.to_string(),
            uploads: Arc::new(RwLock::new(Vec::new())),
            stored: Arc::new(RwLock::new(HashSet::new())),
            deleted: Arc::new(RwLock::new(Vec::new())),
            failing_calls: Arc::new(RwLock::new(HashSet::new())),
            delayed_calls: Arc::new(RwLock::new(HashMap::new())),
            missing_credentials: Arc::new(RwLock::new(false)),
            calls: Arc::new(RwLock::new(0)),
        }
    }

    /// Make the `n`th publish call (1-based) fail.
    pub async fn fail_on_call(&self, n: usize) {
        self.failing_calls.write().await.insert(n);
    }

    /// Make the `n`th publish call (1-based) take `duration` before storing anything.
    pub async fn delay_call(&self, n: usize, duration: Duration) {
        self.delayed_calls.write().await.insert(n, duration);
    }

    /// Behave as if no credentials were configured.
    pub async fn set_missing_credentials(&self, missing: bool) {
        *self.missing_credentials.write().await = missing;
    }

    /// Get all successful uploads, in order.
    pub async fn recorded_uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.read().await.clone()
    }

    /// Number of publish calls, successful or not.
    pub async fn publish_count(&self) -> usize {
        *self.calls.read().await
    }

    /// Keys removed through `delete`.
    pub async fn deleted_keys(&self) -> Vec<String> {
        self.deleted.read().await.clone()
    }

    /// Keys currently stored.
    pub async fn stored_keys(&self) -> HashSet<String> {
        self.stored.read().await.clone()
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn publish(&self, path: &Path, kind: MediaKind) -> Result<PublishedObject, UploadError> {
        let call_number = {
            let mut calls = self.calls.write().await;
            *calls += 1;
            *calls
        };

        if *self.missing_credentials.read().await {
            return Err(UploadError::credentials("access key or secret key not configured"));
        }

        let contents = tokio::fs::read(path).await.map_err(|e| UploadError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let delay = self.delayed_calls.read().await.get(&call_number).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing_calls.read().await.contains(&call_number) {
            return Err(UploadError::transport("simulated upload failure"));
        }

        let key = object_key(kind);
        self.stored.write().await.insert(key.clone());
        self.uploads.write().await.push(RecordedUpload {
            path: path.to_path_buf(),
            kind,
            key: key.clone(),
            contents,
        });

        Ok(PublishedObject {
            url: public_url(&self.bucket, &self.region, &key),
            key,
        })
    }

    async fn delete(&self, key: &str) -> Result<(), UploadError> {
        self.stored.write().await.remove(key);
        self.deleted.write().await.push(key.to_string());
        Ok(())
    }
}
