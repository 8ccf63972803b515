//! Core library for the face swap service.
//!
//! A request becomes a [`Job`](job::Job) that is validated, fetched into its
//! own workspace, run through the external face swap tool and published to
//! object storage by the [`SwapOrchestrator`](orchestrator::SwapOrchestrator).

pub mod config;
pub mod fetcher;
pub mod job;
pub mod metrics;
pub mod orchestrator;
pub mod publisher;
pub mod request;
pub mod testing;
pub mod tool;
pub mod workspace;

pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config, ConfigError,
    LogFormat, SanitizedConfig,
};
pub use fetcher::{FetchError, Fetcher, HttpFetcher, SelectionError, TargetSelector};
pub use job::{InputRole, Job, JobId, JobStatus, JobVariant, MediaKind, Stage};
pub use orchestrator::{JobError, JobErrorKind, JobOutcome, OrchestratorStatus, SwapOrchestrator};
pub use publisher::{PublishedObject, Publisher, S3Publisher, UploadError};
pub use request::{validate, ValidatedRequest, ValidationError};
pub use tool::{FaceFusionRunner, ToolError, ToolRunner};
pub use workspace::{JobWorkspace, WorkspaceConfig};
