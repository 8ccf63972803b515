//! Types for the job module.

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info};
use uuid::Uuid;

use crate::tool::Invocation;

/// Opaque per-request identifier, also used to name the job workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_hyphenated())
    }
}

/// Kind of media a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    const IMAGE_EXTENSIONS: &'static [&'static str] = &["jpg", "jpeg", "png", "webp", "bmp"];
    const VIDEO_EXTENSIONS: &'static [&'static str] = &["mp4", "mov", "mkv", "webm", "avi", "m4v"];

    /// File extension used for stored objects and local outputs.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Image => "jpg",
            Self::Video => "mp4",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Image => "image/jpeg",
            Self::Video => "video/mp4",
        }
    }

    /// Guesses the media kind from the extension of a URL path.
    pub fn from_url(url: &Url) -> Option<Self> {
        let last = url.path_segments()?.next_back()?;
        let (_, ext) = last.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        if Self::IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Image)
        } else if Self::VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Video)
        } else {
            None
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
        }
    }
}

/// Role a fetched input plays in a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputRole {
    Source,
    Source1,
    Source2,
    Target,
}

impl InputRole {
    /// File stem used inside the job workspace.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Source1 => "source1",
            Self::Source2 => "source2",
            Self::Target => "target",
        }
    }

    pub fn is_source(&self) -> bool {
        !matches!(self, Self::Target)
    }
}

impl fmt::Display for InputRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five request shapes the service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobVariant {
    /// One source face onto one target image.
    SingleImage,
    /// Two sources applied to one target image in two chained passes.
    DualSourceImage,
    /// Two sources applied to one target in a single `batch-run` pass.
    DualSourceBatch,
    /// One source applied to several targets drawn from the local pool.
    FiveTarget,
    /// One source face onto a target video.
    Video,
}

impl JobVariant {
    pub const ALL: [JobVariant; 5] = [
        Self::SingleImage,
        Self::DualSourceImage,
        Self::DualSourceBatch,
        Self::FiveTarget,
        Self::Video,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleImage => "single_image",
            Self::DualSourceImage => "dual_source_image",
            Self::DualSourceBatch => "dual_source_batch",
            Self::FiveTarget => "five_target",
            Self::Video => "video",
        }
    }

    /// URL-bearing request fields, in fetch order.
    pub fn url_fields(&self) -> &'static [(InputRole, &'static str)] {
        match self {
            Self::SingleImage | Self::Video => &[
                (InputRole::Source, "source_url"),
                (InputRole::Target, "target_url"),
            ],
            Self::DualSourceImage => &[
                (InputRole::Source1, "source_url_1"),
                (InputRole::Source2, "source_url_2"),
                (InputRole::Target, "target_url"),
            ],
            Self::DualSourceBatch => &[
                (InputRole::Source1, "source_url1"),
                (InputRole::Source2, "source_url2"),
                (InputRole::Target, "target_url"),
            ],
            Self::FiveTarget => &[(InputRole::Source, "source_url")],
        }
    }

    /// Name of the category field for variants that draw targets from the pool.
    pub fn category_field(&self) -> Option<&'static str> {
        match self {
            Self::FiveTarget => Some("gender"),
            _ => None,
        }
    }

    /// Every field the request body must carry.
    pub fn required_fields(&self) -> Vec<&'static str> {
        self.url_fields()
            .iter()
            .map(|(_, field)| *field)
            .chain(self.category_field())
            .collect()
    }

    /// Output media kind when nothing in the request says otherwise.
    pub fn default_output_kind(&self) -> MediaKind {
        match self {
            Self::DualSourceBatch | Self::Video => MediaKind::Video,
            _ => MediaKind::Image,
        }
    }

    /// Human description of an input, as used in error messages.
    pub fn describe_input(&self, role: InputRole, target_kind: MediaKind) -> String {
        match (self, role) {
            (_, InputRole::Target) => format!("target {}", target_kind),
            (Self::DualSourceImage, InputRole::Source1) => "first source image".to_string(),
            (Self::DualSourceImage, InputRole::Source2) => "second source image".to_string(),
            (_, InputRole::Source1) => "source image 1".to_string(),
            (_, InputRole::Source2) => "source image 2".to_string(),
            (_, InputRole::Source) => "source image".to_string(),
        }
    }
}

impl fmt::Display for JobVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline stage, used to attribute failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Admission,
    Workspace,
    Fetch,
    Selection,
    Processing,
    Upload,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admission => write!(f, "admission"),
            Self::Workspace => write!(f, "workspace"),
            Self::Fetch => write!(f, "fetch"),
            Self::Selection => write!(f, "selection"),
            Self::Processing => write!(f, "processing"),
            Self::Upload => write!(f, "upload"),
        }
    }
}

/// Current state of a job.
///
/// State machine flow:
/// ```text
/// Pending -> Fetching -> Processing -> Uploading -> Done
///
/// Any non-terminal state can transition to Failed.
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Fetching,
    Processing,
    Uploading,
    Done,
    Failed { stage: Stage, reason: String },
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Processing => "processing",
            Self::Uploading => "uploading",
            Self::Done => "done",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn can_transition_to(&self, next: &JobStatus) -> bool {
        match (self, next) {
            (current, _) if current.is_terminal() => false,
            (_, Self::Failed { .. }) => true,
            (Self::Pending, Self::Fetching)
            | (Self::Fetching, Self::Processing)
            | (Self::Processing, Self::Uploading)
            | (Self::Uploading, Self::Done) => true,
            _ => false,
        }
    }
}

/// A single face-swap request, from acceptance to response.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub variant: JobVariant,
    pub created_at: DateTime<Utc>,
    /// Remote inputs in fetch order.
    pub inputs: Vec<(InputRole, Url)>,
    /// Pool category for variants that select targets locally.
    pub category: Option<String>,
    /// Local copies of the inputs, inside the job workspace.
    pub working_files: BTreeMap<InputRole, PathBuf>,
    /// Planned tool invocations.
    pub passes: Vec<Invocation>,
    /// Files produced by completed passes, in publish order.
    pub outputs: Vec<PathBuf>,
    status: JobStatus,
}

impl Job {
    pub fn new(variant: JobVariant, inputs: Vec<(InputRole, Url)>, category: Option<String>) -> Self {
        Self {
            id: JobId::new(),
            variant,
            created_at: Utc::now(),
            inputs,
            category,
            working_files: BTreeMap::new(),
            passes: Vec::new(),
            outputs: Vec::new(),
            status: JobStatus::Pending,
        }
    }

    pub fn status(&self) -> &JobStatus {
        &self.status
    }

    /// Moves the job to `next`, ignoring transitions the state machine forbids.
    ///
    /// Returns whether the transition was applied.
    pub fn advance(&mut self, next: JobStatus) -> bool {
        if !self.status.can_transition_to(&next) {
            debug!(
                job_id = %self.id,
                from = self.status.name(),
                to = next.name(),
                "Ignoring invalid job transition"
            );
            return false;
        }

        info!(
            job_id = %self.id,
            variant = %self.variant,
            from = self.status.name(),
            to = next.name(),
            "Job state changed"
        );
        self.status = next;
        true
    }

    /// Marks the job failed at `stage`.
    pub fn fail(&mut self, stage: Stage, reason: impl Into<String>) -> bool {
        self.advance(JobStatus::Failed {
            stage,
            reason: reason.into(),
        })
    }
}
