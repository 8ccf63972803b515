//! Error types for the tool module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while running the face-swap tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The tool exited with a non-zero status. Not retryable.
    #[error("Face swap tool exited with code {}", display_code(.exit_code))]
    Exited {
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The tool program could not be found.
    #[error("Face swap tool not found at path: {path}")]
    NotFound { path: PathBuf },

    /// The pass did not finish before the configured deadline.
    #[error("Face swap tool timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The tool reported success but wrote no output file.
    #[error("Face swap tool produced no output at {path}")]
    OutputMissing { path: PathBuf },

    /// A pass plan could not be resolved into invocations.
    #[error("Invalid pass plan: {reason}")]
    InvalidPlan { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

impl ToolError {
    pub fn invalid_plan(reason: impl Into<String>) -> Self {
        Self::InvalidPlan {
            reason: reason.into(),
        }
    }

    /// Captured diagnostic output, when the tool produced any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::Exited { stderr, .. } if !stderr.is_empty() => Some(stderr),
            _ => None,
        }
    }
}
