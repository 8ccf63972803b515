//! Multi-pass pipelines over the tool.
//!
//! A [`PassPlan`] lists the passes of a job. Each pass declares where its
//! target comes from, so chaining (pass 2 consuming pass 1's output) is
//! explicit rather than implied by shared paths.

use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

use super::error::ToolError;
use super::traits::ToolRunner;
use super::types::{Invocation, ProcessResult, SwapParameters, ToolCommand};

/// Where a pass reads its target from.
#[derive(Debug, Clone, PartialEq)]
pub enum PassTarget {
    /// A file already present in the workspace.
    File(PathBuf),
    /// The output of the immediately preceding pass.
    PreviousOutput,
}

/// Declaration of one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PassSpec {
    pub command: ToolCommand,
    pub sources: Vec<PathBuf>,
    pub target: PassTarget,
    pub output: PathBuf,
    pub parameters: SwapParameters,
}

impl PassSpec {
    pub fn headless(
        sources: Vec<PathBuf>,
        target: PassTarget,
        output: PathBuf,
        parameters: SwapParameters,
    ) -> Self {
        Self {
            command: ToolCommand::HeadlessRun,
            sources,
            target,
            output,
            parameters,
        }
    }
}

/// Ordered list of passes making up one job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassPlan {
    passes: Vec<PassSpec>,
}

impl PassPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, pass: PassSpec) -> Self {
        self.passes.push(pass);
        self
    }

    pub fn push(&mut self, pass: PassSpec) {
        self.passes.push(pass);
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Output paths of every pass, in order.
    pub fn outputs(&self) -> Vec<PathBuf> {
        self.passes.iter().map(|p| p.output.clone()).collect()
    }

    /// Resolves every target into a concrete path.
    ///
    /// Fails if the plan is empty or the first pass refers to a previous output.
    pub fn resolve(&self) -> Result<Vec<Invocation>, ToolError> {
        if self.passes.is_empty() {
            return Err(ToolError::invalid_plan("plan has no passes"));
        }

        let mut invocations: Vec<Invocation> = Vec::with_capacity(self.passes.len());
        for (i, pass) in self.passes.iter().enumerate() {
            let target_path = match &pass.target {
                PassTarget::File(path) => path.clone(),
                PassTarget::PreviousOutput => match invocations.last() {
                    Some(previous) => previous.output_path.clone(),
                    None => {
                        return Err(ToolError::invalid_plan(format!(
                            "pass {} has no previous output",
                            i + 1
                        )))
                    }
                },
            };
            if pass.sources.is_empty() {
                return Err(ToolError::invalid_plan(format!(
                    "pass {} has no source paths",
                    i + 1
                )));
            }

            invocations.push(Invocation {
                command: pass.command,
                source_paths: pass.sources.clone(),
                target_path,
                output_path: pass.output.clone(),
                parameters: pass.parameters.clone(),
            });
        }

        Ok(invocations)
    }
}

/// A pass that failed, with its 1-based position in the plan.
#[derive(Debug, Error)]
#[error("Pass {index} of {total} failed: {error}")]
pub struct PassFailure {
    pub index: usize,
    pub total: usize,
    #[source]
    pub error: ToolError,
}

/// Runs invocations in order, stopping at the first failure.
///
/// Passes after a failed one are never started.
pub async fn run_passes<R>(
    runner: &R,
    invocations: &[Invocation],
) -> Result<Vec<ProcessResult>, PassFailure>
where
    R: ToolRunner + ?Sized,
{
    let total = invocations.len();
    let mut results = Vec::with_capacity(total);

    for (i, invocation) in invocations.iter().enumerate() {
        let index = i + 1;
        info!(pass = index, total = total, command = %invocation.command, "Running pass");
        match runner.run(invocation).await {
            Ok(result) => results.push(result),
            Err(error) => return Err(PassFailure { index, total, error }),
        }
    }

    Ok(results)
}
