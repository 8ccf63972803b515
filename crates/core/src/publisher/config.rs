//! Configuration for the publisher module.

use serde::{Deserialize, Serialize};

/// Object storage settings.
///
/// Credentials may be left empty; uploads then fail per request with
/// [`UploadError::Credentials`](super::UploadError::Credentials).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Bucket receiving job outputs.
    #[serde(default)]
    pub bucket: String,

    /// Bucket region, e.g. `us-east-1`.
    #[serde(default)]
    pub region: String,

    #[serde(default)]
    pub access_key: String,

    #[serde(default)]
    pub secret_key: String,

    /// Timeout for a single upload in seconds.
    #[serde(default = "default_upload_timeout")]
    pub upload_timeout_secs: u64,
}

fn default_upload_timeout() -> u64 {
    300 // 5 minutes
}

impl StorageConfig {
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            upload_timeout_secs: default_upload_timeout(),
            ..Default::default()
        }
    }

    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_key = access_key.into();
        self.secret_key = secret_key.into();
        self
    }

    /// Whether both halves of the static credentials are present.
    pub fn has_credentials(&self) -> bool {
        !self.access_key.trim().is_empty() && !self.secret_key.trim().is_empty()
    }
}
