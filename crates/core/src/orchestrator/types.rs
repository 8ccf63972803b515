//! Types for the swap orchestrator.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::job::{JobId, JobVariant};
use crate::publisher::PublishedObject;

/// Result of a successful job.
#[derive(Debug, Clone, Serialize)]
pub struct JobOutcome {
    pub job_id: JobId,
    pub variant: JobVariant,
    /// When the request was accepted, before admission.
    pub accepted_at: DateTime<Utc>,
    /// Published outputs, in pass order.
    pub outputs: Vec<PublishedObject>,
    pub duration_ms: u64,
}

impl JobOutcome {
    pub fn urls(&self) -> Vec<String> {
        self.outputs.iter().map(|o| o.url.clone()).collect()
    }
}

/// Current status of the orchestrator.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrchestratorStatus {
    /// Admission limit.
    pub max_concurrent: usize,
    /// Jobs currently holding a slot.
    pub active_jobs: usize,
    pub total_completed: u64,
    pub total_failed: u64,
}
