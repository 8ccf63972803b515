//! Amazon S3 publisher.

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::path::Path;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::job::MediaKind;
use crate::metrics::UPLOADS_TOTAL;

use super::config::StorageConfig;
use super::error::UploadError;
use super::key::{object_key, public_url};
use super::traits::{PublishedObject, Publisher};

/// Service error codes meaning the credentials were rejected.
const CREDENTIAL_ERROR_CODES: &[&str] = &[
    "InvalidAccessKeyId",
    "SignatureDoesNotMatch",
    "InvalidToken",
    "ExpiredToken",
];

/// Publishes outputs to an S3 bucket with static credentials.
pub struct S3Publisher {
    client: Option<Client>,
    config: StorageConfig,
}

impl S3Publisher {
    /// Creates a publisher. No network call is made here.
    ///
    /// Without credentials the publisher is still constructed; every upload
    /// then fails with [`UploadError::Credentials`].
    pub fn new(config: StorageConfig) -> Self {
        let client = config.has_credentials().then(|| {
            let credentials = Credentials::new(
                config.access_key.clone(),
                config.secret_key.clone(),
                None,
                None,
                "faceswap-config",
            );
            let sdk_config = aws_sdk_s3::Config::builder()
                .behavior_version(BehaviorVersion::latest())
                .region(Region::new(config.region.clone()))
                .credentials_provider(credentials)
                .build();
            Client::from_conf(sdk_config)
        });

        Self { client, config }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    fn client(&self) -> Result<&Client, UploadError> {
        self.client
            .as_ref()
            .ok_or_else(|| UploadError::credentials("access key or secret key not configured"))
    }

    fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.config.upload_timeout_secs)
    }

    async fn put(&self, path: &Path, kind: MediaKind) -> Result<PublishedObject, UploadError> {
        let client = self.client()?;

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| UploadError::Io {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let key = object_key(kind);
        let request = client
            .put_object()
            .bucket(&self.config.bucket)
            .key(&key)
            .content_type(kind.content_type())
            .body(body)
            .send();

        match timeout(self.upload_timeout(), request).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(classify(e)),
            Err(_) => {
                return Err(UploadError::transport(format!(
                    "upload timed out after {} seconds",
                    self.config.upload_timeout_secs
                )))
            }
        }

        Ok(PublishedObject {
            url: public_url(&self.config.bucket, &self.config.region, &key),
            key,
        })
    }
}

/// Maps an SDK error onto the upload taxonomy.
fn classify<E, R>(err: SdkError<E, R>) -> UploadError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    if let Some(code) = err.code().filter(|c| CREDENTIAL_ERROR_CODES.contains(c)) {
        return UploadError::credentials(code.to_string());
    }
    UploadError::transport(DisplayErrorContext(err).to_string())
}

#[async_trait]
impl Publisher for S3Publisher {
    fn name(&self) -> &str {
        "s3"
    }

    async fn publish(&self, path: &Path, kind: MediaKind) -> Result<PublishedObject, UploadError> {
        let result = self.put(path, kind).await;

        match &result {
            Ok(object) => {
                UPLOADS_TOTAL.with_label_values(&["success"]).inc();
                debug!(key = %object.key, bucket = %self.config.bucket, "Uploaded output");
            }
            Err(e) => {
                UPLOADS_TOTAL.with_label_values(&["failed"]).inc();
                warn!(error = %e, path = %path.display(), "Upload failed");
            }
        }

        result
    }

    async fn delete(&self, key: &str) -> Result<(), UploadError> {
        let client = self.client()?;
        let request = client
            .delete_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send();

        match timeout(self.upload_timeout(), request).await {
            Ok(Ok(_)) => {
                UPLOADS_TOTAL.with_label_values(&["deleted"]).inc();
                debug!(key = key, bucket = %self.config.bucket, "Deleted object");
                Ok(())
            }
            Ok(Err(e)) => Err(classify(e)),
            Err(_) => Err(UploadError::transport(format!(
                "delete timed out after {} seconds",
                self.config.upload_timeout_secs
            ))),
        }
    }
}
