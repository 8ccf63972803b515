//! Error types for the publisher module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while uploading an output.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Store credentials are absent or were rejected.
    #[error("Object store credentials missing or invalid: {reason}")]
    Credentials { reason: String },

    /// Any other upload fault.
    #[error("Upload failed: {reason}")]
    Transport { reason: String },

    /// The local file could not be read.
    #[error("Failed to read {path}: {reason}")]
    Io { path: PathBuf, reason: String },
}

impl UploadError {
    pub fn credentials(reason: impl Into<String>) -> Self {
        Self::Credentials {
            reason: reason.into(),
        }
    }

    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    pub fn is_credentials(&self) -> bool {
        matches!(self, Self::Credentials { .. })
    }
}
