//! Mock tool runner for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::tool::{Invocation, ProcessResult, ToolError, ToolRunner};

/// Mock implementation of the ToolRunner trait.
///
/// Every successful call writes a small file at the invocation's output path
/// (when its directory exists), so chained passes and uploads see real files.
///
/// # Example
///
/// ```rust,ignore
/// use faceswap_core::testing::MockToolRunner;
///
/// let runner = MockToolRunner::new();
/// // Third call exits with code 1
/// runner.fail_on_call(3, 1, "No face detected").await;
///
/// // ... run a job ...
/// assert_eq!(runner.call_count().await, 3);
/// ```
#[derive(Debug, Default)]
pub struct MockToolRunner {
    calls: Arc<RwLock<Vec<Invocation>>>,
    /// 1-based call number -> (exit code, stderr).
    failures: Arc<RwLock<HashMap<usize, (i32, String)>>>,
    next_error: Arc<RwLock<Option<ToolError>>>,
    validate_error: Arc<RwLock<Option<ToolError>>>,
    run_duration_ms: Arc<RwLock<u64>>,
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
}

impl MockToolRunner {
    /// Create a new mock runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded invocations, in call order.
    pub async fn calls(&self) -> Vec<Invocation> {
        self.calls.read().await.clone()
    }

    /// Get the number of invocations started.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Make the `n`th call (1-based) exit non-zero with `stderr`.
    pub async fn fail_on_call(&self, n: usize, exit_code: i32, stderr: &str) {
        self.failures
            .write()
            .await
            .insert(n, (exit_code, stderr.to_string()));
    }

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: ToolError) {
        *self.next_error.write().await = Some(error);
    }

    /// Configure `validate` to fail with the given error.
    pub async fn set_validate_error(&self, error: ToolError) {
        *self.validate_error.write().await = Some(error);
    }

    /// Set the simulated duration of each call.
    pub async fn set_run_duration(&self, duration: Duration) {
        *self.run_duration_ms.write().await = duration.as_millis() as u64;
    }

    /// Highest number of calls observed running at the same time.
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

/// Decrements the active-call counter when a call ends or is dropped.
struct ActiveCall(Arc<AtomicUsize>);

impl Drop for ActiveCall {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ToolRunner for MockToolRunner {
    fn name(&self) -> &str {
        "mock"
    }

    async fn run(&self, invocation: &Invocation) -> Result<ProcessResult, ToolError> {
        let call_number = {
            let mut calls = self.calls.write().await;
            calls.push(invocation.clone());
            calls.len()
        };

        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);
        let _active = ActiveCall(self.active.clone());

        let duration_ms = *self.run_duration_ms.read().await;
        if duration_ms > 0 {
            tokio::time::sleep(Duration::from_millis(duration_ms)).await;
        }

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        if let Some((exit_code, stderr)) = self.failures.read().await.get(&call_number).cloned() {
            return Err(ToolError::Exited {
                exit_code: Some(exit_code),
                stderr,
            });
        }

        let output = &invocation.output_path;
        if output.parent().map(|p| p.is_dir()).unwrap_or(false) {
            tokio::fs::write(output, format!("swapped-{}", call_number)).await?;
        }

        Ok(ProcessResult {
            exit_code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
            duration_ms,
        })
    }

    async fn validate(&self) -> Result<(), ToolError> {
        match self.validate_error.write().await.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
