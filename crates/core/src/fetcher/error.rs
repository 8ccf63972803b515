//! Error types for the fetcher module.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while downloading a remote input.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-2xx status.
    #[error("Request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Network or protocol failure.
    #[error("Failed to fetch {url}: {reason}")]
    Transport { url: String, reason: String },

    /// Writing the downloaded body failed.
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl FetchError {
    pub(crate) fn transport(url: impl ToString, err: &reqwest::Error) -> Self {
        let reason = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            format!("connection failed: {}", err)
        } else {
            err.to_string()
        };
        Self::Transport {
            url: url.to_string(),
            reason,
        }
    }

    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// HTTP status, when the failure was a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors that can occur while drawing targets from the local pool.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("No target pool found for category: {category}")]
    NoSuchCategory { category: String },

    #[error(
        "Not enough images in pool '{category}' for {requested} face swaps (found {available})"
    )]
    InsufficientPool {
        category: String,
        available: usize,
        requested: usize,
    },

    #[error("Invalid target pool category: {category}")]
    InvalidCategory { category: String },

    #[error("Failed to read target pool {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
