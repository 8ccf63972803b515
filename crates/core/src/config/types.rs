use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::fetcher::{FetcherConfig, TargetPoolConfig};
use crate::orchestrator::JobsConfig;
use crate::publisher::StorageConfig;
use crate::tool::ToolConfig;
use crate::workspace::WorkspaceConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub tool: ToolConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
    #[serde(default)]
    pub target_pool: TargetPoolConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    7860
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration. `RUST_LOG` takes precedence over `filter`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "info,tower_http=debug".to_string()
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub storage: SanitizedStorageConfig,
    pub tool: SanitizedToolConfig,
    pub workspace: WorkspaceConfig,
    pub fetcher: FetcherConfig,
    pub jobs: JobsConfig,
    pub target_pool: TargetPoolConfig,
}

/// Storage config with credentials hidden
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedStorageConfig {
    pub bucket: String,
    pub region: String,
    pub access_key_configured: bool,
    pub secret_key_configured: bool,
    pub upload_timeout_secs: u64,
}

/// Tool config as exposed over the API
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedToolConfig {
    pub program: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_path: Option<PathBuf>,
    pub timeout_secs: u64,
    pub execution_providers: Vec<String>,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            storage: SanitizedStorageConfig {
                bucket: config.storage.bucket.clone(),
                region: config.storage.region.clone(),
                access_key_configured: !config.storage.access_key.is_empty(),
                secret_key_configured: !config.storage.secret_key.is_empty(),
                upload_timeout_secs: config.storage.upload_timeout_secs,
            },
            tool: SanitizedToolConfig {
                program: config.tool.program.clone(),
                script_path: config.tool.script_path.clone(),
                timeout_secs: config.tool.timeout_secs,
                execution_providers: config.tool.execution_providers.clone(),
            },
            workspace: config.workspace.clone(),
            fetcher: config.fetcher.clone(),
            jobs: config.jobs.clone(),
            target_pool: config.target_pool.clone(),
        }
    }
}
