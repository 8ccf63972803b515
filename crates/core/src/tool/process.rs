//! Subprocess-based runner for FaceFusion.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use crate::metrics::{TOOL_DURATION, TOOL_INVOCATIONS};

use super::config::ToolConfig;
use super::error::ToolError;
use super::traits::ToolRunner;
use super::types::{Invocation, ProcessResult};

/// Runs FaceFusion as a child process.
pub struct FaceFusionRunner {
    config: ToolConfig,
}

impl FaceFusionRunner {
    /// Creates a new runner with the given configuration.
    pub fn new(config: ToolConfig) -> Self {
        Self { config }
    }

    /// Creates a runner with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ToolConfig::default())
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    /// Full argument list, including the script path when configured.
    fn build_args(&self, invocation: &Invocation) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(script) = &self.config.script_path {
            args.push(script.to_string_lossy().to_string());
        }
        args.extend(invocation.to_args());
        args.extend(self.config.extra_args.iter().cloned());
        args
    }

    fn spawn_error(&self, e: std::io::Error) -> ToolError {
        if e.kind() == std::io::ErrorKind::NotFound {
            ToolError::NotFound {
                path: self.config.program.clone(),
            }
        } else {
            ToolError::Io(e)
        }
    }

    async fn execute(&self, invocation: &Invocation) -> Result<ProcessResult, ToolError> {
        let start = Instant::now();
        let args = self.build_args(invocation);
        debug!(
            program = %self.config.program.display(),
            command = %invocation.command,
            output = %invocation.output_path.display(),
            "Starting face swap tool"
        );

        let mut child = Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let mut stdout = child.stdout.take();
        let mut stderr = child.stderr.take();

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let result = timeout(timeout_duration, async {
            let mut out = Vec::new();
            let mut err = Vec::new();
            let read_out = async {
                match stdout.as_mut() {
                    Some(pipe) => pipe.read_to_end(&mut out).await.map(|_| ()),
                    None => Ok(()),
                }
            };
            let read_err = async {
                match stderr.as_mut() {
                    Some(pipe) => pipe.read_to_end(&mut err).await.map(|_| ()),
                    None => Ok(()),
                }
            };
            let (out_res, err_res) = tokio::join!(read_out, read_err);
            out_res?;
            err_res?;

            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, out, err))
        })
        .await;

        let (status, out, err) = match result {
            Ok(Ok(captured)) => captured,
            Ok(Err(e)) => return Err(ToolError::Io(e)),
            Err(_) => {
                // Kill the process on timeout
                let _ = child.kill().await;
                warn!(
                    timeout_secs = self.config.timeout_secs,
                    output = %invocation.output_path.display(),
                    "Face swap tool timed out"
                );
                return Err(ToolError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                });
            }
        };

        let process = ProcessResult {
            exit_code: status.code(),
            stdout: String::from_utf8_lossy(&out).into_owned(),
            stderr: String::from_utf8_lossy(&err).into_owned(),
            duration_ms: start.elapsed().as_millis() as u64,
        };

        if !status.success() {
            return Err(ToolError::Exited {
                exit_code: process.exit_code,
                stderr: process.stderr,
            });
        }

        if tokio::fs::metadata(&invocation.output_path).await.is_err() {
            return Err(ToolError::OutputMissing {
                path: invocation.output_path.clone(),
            });
        }

        Ok(process)
    }
}

#[async_trait]
impl ToolRunner for FaceFusionRunner {
    fn name(&self) -> &str {
        "facefusion"
    }

    async fn run(&self, invocation: &Invocation) -> Result<ProcessResult, ToolError> {
        let start = Instant::now();
        let result = self.execute(invocation).await;

        let label = match &result {
            Ok(_) => "success",
            Err(ToolError::Timeout { .. }) => "timeout",
            Err(_) => "failed",
        };
        TOOL_INVOCATIONS.with_label_values(&[label]).inc();
        TOOL_DURATION.observe(start.elapsed().as_secs_f64());

        match &result {
            Ok(process) => debug!(
                duration_ms = process.duration_ms,
                output = %invocation.output_path.display(),
                "Face swap tool finished"
            ),
            Err(e) => warn!(error = %e, "Face swap tool failed"),
        }

        result
    }

    async fn validate(&self) -> Result<(), ToolError> {
        if let Some(script) = &self.config.script_path {
            if tokio::fs::metadata(script).await.is_err() {
                return Err(ToolError::NotFound {
                    path: script.clone(),
                });
            }
        }

        let status = Command::new(&self.config.program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !status.success() {
            return Err(ToolError::Exited {
                exit_code: status.code(),
                stderr: String::new(),
            });
        }

        Ok(())
    }
}
