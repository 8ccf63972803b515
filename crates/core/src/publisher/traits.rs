//! Trait definitions for the publisher module.

use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;

use crate::job::MediaKind;

use super::error::UploadError;

/// An uploaded object and its public address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedObject {
    pub key: String,
    pub url: String,
}

/// Uploads finished outputs to object storage.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Returns the name of this publisher implementation.
    fn name(&self) -> &str;

    /// Uploads `path` under a freshly generated key.
    async fn publish(&self, path: &Path, kind: MediaKind) -> Result<PublishedObject, UploadError>;

    /// Removes a previously published object.
    async fn delete(&self, key: &str) -> Result<(), UploadError>;
}
