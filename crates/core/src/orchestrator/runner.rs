//! Swap orchestrator implementation.
//!
//! Runs one job per request, strictly in sequence:
//! admission -> workspace -> fetch (or select) -> tool passes -> upload.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Url;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{error, info, info_span, warn, Instrument};

use crate::fetcher::{Fetcher, TargetPoolConfig, TargetSelector};
use crate::job::{InputRole, Job, JobId, JobStatus, JobVariant, MediaKind, Stage};
use crate::metrics::{JOBS_IN_FLIGHT, JOBS_TOTAL, JOB_DURATION};
use crate::publisher::{PublishedObject, Publisher};
use crate::request::ValidatedRequest;
use crate::tool::{
    run_passes, FaceSelectorOrder, PassPlan, PassSpec, PassTarget, SwapParameters, ToolCommand,
    ToolConfig, ToolError, ToolRunner,
};
use crate::workspace::{JobWorkspace, WorkspaceConfig};

use super::config::JobsConfig;
use super::error::{JobError, JobErrorKind};
use super::types::{JobOutcome, OrchestratorStatus};

/// Tracks job statistics.
#[derive(Default)]
struct JobStats {
    active: AtomicU64,
    total_completed: AtomicU64,
    total_failed: AtomicU64,
}

/// Marks a job as in flight for as long as it is alive.
///
/// Dropped without [`finish`](Self::finish) means the job future itself was
/// dropped (client disconnect or shutdown).
struct InFlightGuard {
    stats: Arc<JobStats>,
    job_id: JobId,
    variant: JobVariant,
    finished: bool,
}

impl InFlightGuard {
    fn new(stats: Arc<JobStats>, job_id: JobId, variant: JobVariant) -> Self {
        stats.active.fetch_add(1, Ordering::Relaxed);
        JOBS_IN_FLIGHT.inc();
        Self {
            stats,
            job_id,
            variant,
            finished: false,
        }
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.stats.active.fetch_sub(1, Ordering::Relaxed);
        JOBS_IN_FLIGHT.dec();
        if !self.finished {
            warn!(job_id = %self.job_id, variant = %self.variant, "Job cancelled before completion");
            JOBS_TOTAL
                .with_label_values(&[self.variant.as_str(), "cancelled"])
                .inc();
        }
    }
}

/// Outputs published for one job, deleted again unless committed.
///
/// Lives in [`SwapOrchestrator::run`] rather than in the job future, so a
/// job that times out or is dropped mid-upload can still be rolled back.
struct PublishedOutputs {
    publisher: Arc<dyn Publisher>,
    objects: Vec<PublishedObject>,
}

impl PublishedOutputs {
    fn new(publisher: Arc<dyn Publisher>) -> Self {
        Self {
            publisher,
            objects: Vec::new(),
        }
    }

    fn record(&mut self, object: PublishedObject) {
        self.objects.push(object);
    }

    fn commit(&mut self) -> Vec<PublishedObject> {
        std::mem::take(&mut self.objects)
    }

    /// Deletes every recorded object.
    ///
    /// An object leaves the list only once its delete has returned, so a
    /// rollback that is itself dropped hands the rest to [`Drop`].
    async fn roll_back(&mut self) {
        while let Some(object) = self.objects.first().cloned() {
            delete_output(self.publisher.as_ref(), &object).await;
            self.objects.remove(0);
        }
    }
}

impl Drop for PublishedOutputs {
    fn drop(&mut self) {
        if self.objects.is_empty() {
            return;
        }

        let objects = std::mem::take(&mut self.objects);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!(
                    count = objects.len(),
                    "Job dropped after publishing, deleting its outputs"
                );
                let publisher = self.publisher.clone();
                handle.spawn(async move {
                    for object in &objects {
                        delete_output(publisher.as_ref(), object).await;
                    }
                });
            }
            Err(_) => {
                let keys: Vec<&str> = objects.iter().map(|o| o.key.as_str()).collect();
                error!(?keys, "No runtime left to delete outputs of dropped job");
            }
        }
    }
}

async fn delete_output(publisher: &dyn Publisher, object: &PublishedObject) {
    match publisher.delete(&object.key).await {
        Ok(()) => info!(key = %object.key, "Deleted output of failed job"),
        Err(e) => warn!(
            key = %object.key,
            error = %e,
            "Failed to delete output of failed job"
        ),
    }
}

/// The swap orchestrator - runs face swap jobs end to end.
pub struct SwapOrchestrator {
    config: JobsConfig,
    tool_config: ToolConfig,
    workspace_config: WorkspaceConfig,
    selector: TargetSelector,
    fetcher: Arc<dyn Fetcher>,
    runner: Arc<dyn ToolRunner>,
    publisher: Arc<dyn Publisher>,
    admission: Arc<Semaphore>,
    stats: Arc<JobStats>,
}

impl SwapOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        config: JobsConfig,
        tool_config: ToolConfig,
        workspace_config: WorkspaceConfig,
        target_pool: TargetPoolConfig,
        fetcher: Arc<dyn Fetcher>,
        runner: Arc<dyn ToolRunner>,
        publisher: Arc<dyn Publisher>,
    ) -> Self {
        let admission = Arc::new(Semaphore::new(config.max_concurrent));

        Self {
            config,
            tool_config,
            workspace_config,
            selector: TargetSelector::new(target_pool),
            fetcher,
            runner,
            publisher,
            admission,
            stats: Arc::new(JobStats::default()),
        }
    }

    /// Current admission and completion counters.
    pub fn status(&self) -> OrchestratorStatus {
        OrchestratorStatus {
            max_concurrent: self.config.max_concurrent,
            active_jobs: self.stats.active.load(Ordering::Relaxed) as usize,
            total_completed: self.stats.total_completed.load(Ordering::Relaxed),
            total_failed: self.stats.total_failed.load(Ordering::Relaxed),
        }
    }

    /// Checks that the face swap tool can be started.
    pub async fn validate_tool(&self) -> Result<(), ToolError> {
        self.runner.validate().await
    }

    /// Runs a validated request to completion.
    ///
    /// Dropping the returned future cancels the job: the tool process is
    /// killed and the workspace removed.
    pub async fn run(&self, request: ValidatedRequest) -> Result<JobOutcome, JobError> {
        let mut job = Job::new(request.variant, request.inputs, request.category);
        let span = info_span!("job", job_id = %job.id, variant = %job.variant);

        async move {
            let start = Instant::now();
            info!("Job accepted");

            let _permit = match timeout(
                Duration::from_secs(self.config.admission_timeout_secs),
                self.admission.clone().acquire_owned(),
            )
            .await
            {
                Ok(Ok(permit)) => permit,
                Ok(Err(_)) | Err(_) => {
                    warn!(
                        max_concurrent = self.config.max_concurrent,
                        "No job slot available, rejecting job"
                    );
                    JOBS_TOTAL
                        .with_label_values(&[job.variant.as_str(), "busy"])
                        .inc();
                    let err = JobError::new(job.id, Stage::Admission, JobErrorKind::Busy);
                    job.fail(err.stage, err.kind.to_string());
                    return Err(err);
                }
            };

            let mut guard = InFlightGuard::new(self.stats.clone(), job.id, job.variant);
            let mut published = PublishedOutputs::new(self.publisher.clone());
            let job_timeout = self.config.job_timeout_secs;

            let deadline = timeout(
                Duration::from_secs(job_timeout),
                self.execute(&mut job, &mut published),
            )
            .await;
            let result = match deadline {
                Ok(result) => result,
                Err(_) => {
                    let stage = stage_of(job.status());
                    Err(JobError::new(
                        job.id,
                        stage,
                        JobErrorKind::Timeout {
                            timeout_secs: job_timeout,
                        },
                    ))
                }
            };

            // All outputs or none
            let result = match result {
                Ok(()) => Ok(published.commit()),
                Err(err) => {
                    published.roll_back().await;
                    Err(err)
                }
            };
            guard.finish();

            let elapsed = start.elapsed();
            JOB_DURATION
                .with_label_values(&[job.variant.as_str()])
                .observe(elapsed.as_secs_f64());

            match result {
                Ok(outputs) => {
                    self.stats.total_completed.fetch_add(1, Ordering::Relaxed);
                    JOBS_TOTAL
                        .with_label_values(&[job.variant.as_str(), "success"])
                        .inc();
                    info!(
                        outputs = outputs.len(),
                        duration_ms = elapsed.as_millis() as u64,
                        "Job completed"
                    );
                    Ok(JobOutcome {
                        job_id: job.id,
                        variant: job.variant,
                        accepted_at: job.created_at,
                        outputs,
                        duration_ms: elapsed.as_millis() as u64,
                    })
                }
                Err(err) => {
                    self.stats.total_failed.fetch_add(1, Ordering::Relaxed);
                    JOBS_TOTAL
                        .with_label_values(&[job.variant.as_str(), "failed"])
                        .inc();
                    job.fail(err.stage, err.kind.to_string());
                    error!(stage = %err.stage, error = %err.kind, "Job failed");
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        job: &mut Job,
        published: &mut PublishedOutputs,
    ) -> Result<(), JobError> {
        let job_id = job.id;
        let variant = job.variant;
        let fail = move |stage: Stage, kind: JobErrorKind| JobError::new(job_id, stage, kind);

        let workspace = JobWorkspace::create(&self.workspace_config, &job_id)
            .await
            .map_err(|e| fail(Stage::Workspace, JobErrorKind::Workspace(e)))?;

        job.advance(JobStatus::Fetching);
        let output_kind = output_kind(variant, job_input(job, InputRole::Target));

        let inputs = job.inputs.clone();
        for (role, url) in &inputs {
            let extension = if role.is_source() {
                MediaKind::Image.extension()
            } else {
                output_kind.extension()
            };
            let destination = workspace.input_path(*role, extension);

            self.fetcher
                .fetch(url, &destination)
                .await
                .map_err(|source| {
                    fail(
                        Stage::Fetch,
                        JobErrorKind::Fetch {
                            role: *role,
                            description: variant.describe_input(*role, output_kind),
                            source,
                        },
                    )
                })?;
            job.working_files.insert(*role, destination);
        }

        let pool_targets = match (variant, job.category.clone()) {
            (JobVariant::FiveTarget, Some(category)) => {
                let selected = self
                    .selector
                    .select(&category, self.selector.config().count)
                    .await
                    .map_err(|e| fail(Stage::Selection, JobErrorKind::Selection(e)))?;
                copy_into_workspace(&selected, &workspace)
                    .await
                    .map_err(|e| fail(Stage::Selection, JobErrorKind::Workspace(e)))?
            }
            _ => Vec::new(),
        };

        let plan = self.plan(job, &workspace, &pool_targets, output_kind);
        let invocations = plan.resolve().map_err(|source| {
            fail(
                Stage::Processing,
                JobErrorKind::Tool {
                    variant,
                    pass: 1,
                    total: plan.len(),
                    source,
                },
            )
        })?;

        job.advance(JobStatus::Processing);
        job.passes = invocations.clone();
        run_passes(self.runner.as_ref(), &invocations)
            .await
            .map_err(|failure| {
                fail(
                    Stage::Processing,
                    JobErrorKind::Tool {
                        variant,
                        pass: failure.index,
                        total: failure.total,
                        source: failure.error,
                    },
                )
            })?;
        job.outputs = plan.outputs();

        job.advance(JobStatus::Uploading);
        self.publish_all(&job.outputs, output_kind, published)
            .await
            .map_err(|e| fail(Stage::Upload, JobErrorKind::Upload(e)))?;

        job.advance(JobStatus::Done);
        Ok(())
    }

    /// Builds the pass plan for the job's variant.
    fn plan(
        &self,
        job: &Job,
        workspace: &JobWorkspace,
        pool_targets: &[PathBuf],
        output_kind: MediaKind,
    ) -> PassPlan {
        let file = |role: InputRole| job.working_files.get(&role).cloned().unwrap_or_default();
        let params = SwapParameters::for_variant(job.variant, &self.tool_config);
        let ext = output_kind.extension();

        match job.variant {
            JobVariant::SingleImage | JobVariant::Video => PassPlan::new().then(PassSpec::headless(
                vec![file(InputRole::Source)],
                PassTarget::File(file(InputRole::Target)),
                workspace.output_path(1, ext),
                params,
            )),
            JobVariant::DualSourceImage => {
                let first = FaceSelectorOrder::LargeSmall;
                PassPlan::new()
                    .then(PassSpec::headless(
                        vec![file(InputRole::Source1)],
                        PassTarget::File(file(InputRole::Target)),
                        workspace.output_path(1, ext),
                        params.clone().with_selector_order(first),
                    ))
                    .then(PassSpec::headless(
                        vec![file(InputRole::Source2)],
                        PassTarget::PreviousOutput,
                        workspace.output_path(2, ext),
                        params.with_selector_order(first.opposite()),
                    ))
            }
            JobVariant::DualSourceBatch => PassPlan::new().then(PassSpec {
                command: ToolCommand::BatchRun,
                sources: vec![file(InputRole::Source1), file(InputRole::Source2)],
                target: PassTarget::File(file(InputRole::Target)),
                output: workspace.output_path(1, ext),
                parameters: params,
            }),
            JobVariant::FiveTarget => {
                let params = match &job.category {
                    Some(category) => params.with_selector_gender(category.clone()),
                    None => params,
                };
                let mut plan = PassPlan::new();
                for (i, target) in pool_targets.iter().enumerate() {
                    plan.push(PassSpec::headless(
                        vec![file(InputRole::Source)],
                        PassTarget::File(target.clone()),
                        workspace.output_path(i + 1, ext),
                        params.clone(),
                    ));
                }
                plan
            }
        }
    }

    /// Publishes every output in order, recording each into `published`.
    ///
    /// Stops at the first failed upload; `run` deletes what was recorded.
    async fn publish_all(
        &self,
        outputs: &[PathBuf],
        kind: MediaKind,
        published: &mut PublishedOutputs,
    ) -> Result<(), crate::publisher::UploadError> {
        for path in outputs {
            let object = self.publisher.publish(path, kind).await?;
            info!(key = %object.key, "Published output");
            published.record(object);
        }
        Ok(())
    }
}

fn job_input(job: &Job, role: InputRole) -> Option<&Url> {
    job.inputs.iter().find(|(r, _)| *r == role).map(|(_, url)| url)
}

/// Media kind of the job's outputs.
///
/// Only the batch variant accepts both kinds; it follows the target URL's
/// extension and falls back to video.
fn output_kind(variant: JobVariant, target: Option<&Url>) -> MediaKind {
    match variant {
        JobVariant::DualSourceBatch => target
            .and_then(MediaKind::from_url)
            .unwrap_or_else(|| variant.default_output_kind()),
        _ => variant.default_output_kind(),
    }
}

/// Stage a job was in, for failures that interrupt it.
fn stage_of(status: &JobStatus) -> Stage {
    match status {
        JobStatus::Pending => Stage::Workspace,
        JobStatus::Fetching => Stage::Fetch,
        JobStatus::Processing => Stage::Processing,
        JobStatus::Uploading | JobStatus::Done => Stage::Upload,
        JobStatus::Failed { stage, .. } => *stage,
    }
}

/// Copies selected pool images into the workspace as `target_<n>.<ext>`.
async fn copy_into_workspace(
    selected: &[PathBuf],
    workspace: &JobWorkspace,
) -> std::io::Result<Vec<PathBuf>> {
    let mut targets = Vec::with_capacity(selected.len());
    for (i, source) in selected.iter().enumerate() {
        let ext = extension_of(source);
        let destination = workspace.target_path(i + 1, ext);
        tokio::fs::copy(source, &destination).await?;
        targets.push(destination);
    }
    Ok(targets)
}

fn extension_of(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("jpg")
}
