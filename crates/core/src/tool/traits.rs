//! Trait definitions for the tool module.

use async_trait::async_trait;

use super::error::ToolError;
use super::types::{Invocation, ProcessResult};

/// Runs the external face-swap tool.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Returns the name of this runner implementation.
    fn name(&self) -> &str;

    /// Executes one invocation and waits for it to finish.
    ///
    /// Returns `Ok` only when the process exited with status 0 and the output
    /// file exists. Dropping the returned future terminates the process.
    async fn run(&self, invocation: &Invocation) -> Result<ProcessResult, ToolError>;

    /// Validates that the runner is properly configured and ready.
    async fn validate(&self) -> Result<(), ToolError>;
}
