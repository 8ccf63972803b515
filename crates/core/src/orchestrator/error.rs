//! Error types for the orchestrator.

use thiserror::Error;

use crate::fetcher::{FetchError, SelectionError};
use crate::job::{InputRole, JobId, JobVariant, Stage};
use crate::publisher::UploadError;
use crate::tool::ToolError;

/// What went wrong in a failed job.
#[derive(Debug, Error)]
pub enum JobErrorKind {
    /// The job workspace could not be prepared.
    #[error("Failed to prepare job workspace: {0}")]
    Workspace(#[source] std::io::Error),

    /// An input could not be downloaded.
    #[error("Failed to download {description}: {source}")]
    Fetch {
        role: InputRole,
        description: String,
        source: FetchError,
    },

    /// Targets could not be drawn from the local pool.
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// A tool pass failed. `pass` is 1-based.
    #[error("Pass {pass} of {total} failed: {source}")]
    Tool {
        variant: JobVariant,
        pass: usize,
        total: usize,
        source: ToolError,
    },

    /// An output could not be published.
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// The job exceeded its deadline.
    #[error("Job timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// No admission slot became free in time.
    #[error("All job slots are busy")]
    Busy,
}

/// A failed job, attributed to the stage that failed.
#[derive(Debug, Error)]
#[error("Job {job_id} failed during {stage}: {kind}")]
pub struct JobError {
    pub job_id: JobId,
    pub stage: Stage,
    #[source]
    pub kind: JobErrorKind,
}

impl JobError {
    pub fn new(job_id: JobId, stage: Stage, kind: JobErrorKind) -> Self {
        Self {
            job_id,
            stage,
            kind,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.kind, JobErrorKind::Busy)
    }

    /// Short message for API clients.
    pub fn user_message(&self) -> String {
        match &self.kind {
            JobErrorKind::Workspace(_) => "Failed to prepare job workspace".to_string(),
            JobErrorKind::Fetch { description, .. } => format!("Failed to download {}", description),
            JobErrorKind::Selection(e) => e.to_string(),
            JobErrorKind::Tool {
                variant,
                pass,
                total,
                ..
            } => tool_failure_message(*variant, *pass, *total),
            JobErrorKind::Upload(_) => "Failed to upload output".to_string(),
            JobErrorKind::Timeout { .. } => "Face swap job timed out".to_string(),
            JobErrorKind::Busy => "Server is busy, try again later".to_string(),
        }
    }

    /// Diagnostic detail for API clients.
    ///
    /// Tool failures carry the tool's stderr verbatim. Fetch failures carry
    /// none, matching the plain download error clients already handle.
    pub fn details(&self) -> Option<String> {
        match &self.kind {
            JobErrorKind::Tool { source, .. } => match source {
                ToolError::Exited { stderr, .. } => Some(stderr.clone()),
                other => Some(other.to_string()),
            },
            JobErrorKind::Workspace(e) => Some(e.to_string()),
            JobErrorKind::Upload(e) => Some(e.to_string()),
            JobErrorKind::Timeout { .. } => Some(self.kind.to_string()),
            JobErrorKind::Fetch { .. } | JobErrorKind::Selection(_) | JobErrorKind::Busy => None,
        }
    }
}

fn tool_failure_message(variant: JobVariant, pass: usize, total: usize) -> String {
    match variant {
        JobVariant::DualSourceImage => match pass {
            1 => "Face swap tool failed on first run".to_string(),
            2 => "Face swap tool failed on second run".to_string(),
            n => format!("Face swap tool failed on run {}", n),
        },
        JobVariant::FiveTarget if total > 1 => {
            format!("Face swap tool failed for target image {}", pass)
        }
        _ => "Face swap tool failed".to_string(),
    }
}
