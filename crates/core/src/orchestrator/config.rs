//! Orchestrator configuration.

use serde::{Deserialize, Serialize};

/// Admission and deadline settings for face swap jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Maximum jobs running at once.
    /// Each job runs the tool, which is CPU/GPU bound, so keep this small.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// How long a request may wait for a free slot before it is rejected as busy.
    /// 0 rejects at once whenever every slot is taken.
    #[serde(default = "default_admission_timeout")]
    pub admission_timeout_secs: u64,

    /// Deadline for a whole job, from admission to the last upload.
    /// It caps `tool.timeout_secs` too: five-target jobs run one pass per
    /// target, so the default of 1800 is shorter than 5 full 900s passes.
    #[serde(default = "default_job_timeout")]
    pub job_timeout_secs: u64,
}

fn default_max_concurrent() -> usize {
    2
}

fn default_admission_timeout() -> u64 {
    30
}

fn default_job_timeout() -> u64 {
    1800 // 30 minutes
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            admission_timeout_secs: default_admission_timeout(),
            job_timeout_secs: default_job_timeout(),
        }
    }
}

impl JobsConfig {
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    pub fn with_admission_timeout_secs(mut self, secs: u64) -> Self {
        self.admission_timeout_secs = secs;
        self
    }

    pub fn with_job_timeout_secs(mut self, secs: u64) -> Self {
        self.job_timeout_secs = secs;
        self
    }
}
