//! Configuration for the tool module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the external face-swap tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Program to execute (the interpreter when `script_path` is set).
    #[serde(default = "default_program")]
    pub program: PathBuf,

    /// Script passed as the first argument to `program`.
    #[serde(default = "default_script_path")]
    pub script_path: Option<PathBuf>,

    /// Timeout for a single pass in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Execution providers handed to the tool (e.g. cpu, cuda).
    #[serde(default = "default_execution_providers")]
    pub execution_providers: Vec<String>,

    #[serde(default = "default_thread_count")]
    pub execution_thread_count: u32,

    #[serde(default = "default_queue_count")]
    pub execution_queue_count: u32,

    /// Tool log level (error, warn, info, debug).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Additional arguments appended after the generated options.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_program() -> PathBuf {
    PathBuf::from("python3")
}

fn default_script_path() -> Option<PathBuf> {
    Some(PathBuf::from("/home/azureuser/facefusion/facefusion.py"))
}

fn default_timeout() -> u64 {
    900 // 15 minutes
}

fn default_execution_providers() -> Vec<String> {
    vec!["cpu".to_string()]
}

fn default_thread_count() -> u32 {
    4
}

fn default_queue_count() -> u32 {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            script_path: default_script_path(),
            timeout_secs: default_timeout(),
            execution_providers: default_execution_providers(),
            execution_thread_count: default_thread_count(),
            execution_queue_count: default_queue_count(),
            log_level: default_log_level(),
            extra_args: Vec::new(),
        }
    }
}

impl ToolConfig {
    /// Runs `program` directly, without a script argument.
    pub fn direct(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            script_path: None,
            ..Default::default()
        }
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}
