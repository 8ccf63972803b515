//! Trait definitions for the fetcher module.

use async_trait::async_trait;
use reqwest::Url;
use std::path::{Path, PathBuf};

use super::error::FetchError;

/// A file that has been fully written to its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedFile {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Retrieves a remote file into a local path.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Returns the name of this fetcher implementation.
    fn name(&self) -> &str;

    /// Downloads `url` to `destination`.
    ///
    /// On failure no file is left at `destination` by this call; a file that
    /// already existed there is left untouched.
    async fn fetch(&self, url: &Url, destination: &Path) -> Result<FetchedFile, FetchError>;
}
