//! Configuration for the fetcher module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for remote downloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Overall timeout for a single download in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Write buffer size in bytes.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

fn default_timeout() -> u64 {
    300 // 5 minutes
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_buffer_size() -> usize {
    64 * 1024
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            buffer_size: default_buffer_size(),
        }
    }
}

/// Configuration for the local pool of target images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetPoolConfig {
    /// Directory holding one sub-directory per category.
    #[serde(default = "default_pool_root")]
    pub root: PathBuf,

    /// Eligible file extensions, compared case-insensitively.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Number of targets drawn per job.
    #[serde(default = "default_count")]
    pub count: usize,
}

fn default_pool_root() -> PathBuf {
    PathBuf::from("/home/azureuser/facefusion/faceswap-images")
}

fn default_extensions() -> Vec<String> {
    vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()]
}

fn default_count() -> usize {
    5
}

impl Default for TargetPoolConfig {
    fn default() -> Self {
        Self {
            root: default_pool_root(),
            extensions: default_extensions(),
            count: default_count(),
        }
    }
}

impl TargetPoolConfig {
    /// Creates a pool config rooted at `root` with default extensions and count.
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            root,
            ..Default::default()
        }
    }

    /// Sets the number of targets per job.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }
}
