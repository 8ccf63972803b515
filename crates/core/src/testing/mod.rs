//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the fetcher, tool runner and
//! publisher traits, allowing full job runs without network, object storage,
//! or the face swap tool.
//!
//! # Example
//!
//! ```rust,ignore
//! use faceswap_core::testing::{fixtures, MockFetcher, MockPublisher, MockToolRunner};
//!
//! let fetcher = Arc::new(MockFetcher::new());
//! let runner = Arc::new(MockToolRunner::new());
//! let publisher = Arc::new(MockPublisher::new());
//!
//! // Configure mock responses
//! fetcher.set_status("https://x/b.jpg", 404).await;
//! runner.fail_on_call(2, 1, "No face detected").await;
//!
//! let orchestrator = fixtures::orchestrator(dir.path(), fetcher, runner, publisher);
//! ```

mod mock_fetcher;
mod mock_publisher;
mod mock_tool_runner;

pub use mock_fetcher::{MockFetcher, RecordedFetch};
pub use mock_publisher::{MockPublisher, RecordedUpload};
pub use mock_tool_runner::MockToolRunner;

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::{json, Value};
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use crate::fetcher::{Fetcher, TargetPoolConfig};
    use crate::job::JobVariant;
    use crate::orchestrator::{JobsConfig, SwapOrchestrator};
    use crate::publisher::Publisher;
    use crate::request::{validate, ValidatedRequest};
    use crate::tool::{ToolConfig, ToolRunner};
    use crate::workspace::WorkspaceConfig;

    /// Workspace root used by [`orchestrator`] under `base`.
    pub fn workspace_root(base: &Path) -> PathBuf {
        base.join("jobs")
    }

    /// Target pool root used by [`orchestrator`] under `base`.
    pub fn pool_root(base: &Path) -> PathBuf {
        base.join("pool")
    }

    /// Create `count` placeholder images in `<base>/pool/<category>/`.
    pub fn target_pool(base: &Path, category: &str, count: usize) -> Vec<PathBuf> {
        let dir = pool_root(base).join(category);
        std::fs::create_dir_all(&dir).expect("create pool directory");
        (1..=count)
            .map(|i| {
                let path = dir.join(format!("{}_{:02}.png", category, i));
                std::fs::write(&path, format!("pool-image-{}", i)).expect("write pool image");
                path
            })
            .collect()
    }

    /// Build an orchestrator over mocks, with all job files under `base`.
    pub fn orchestrator(
        base: &Path,
        fetcher: Arc<dyn Fetcher>,
        runner: Arc<dyn ToolRunner>,
        publisher: Arc<dyn Publisher>,
    ) -> SwapOrchestrator {
        orchestrator_with(base, JobsConfig::default(), fetcher, runner, publisher)
    }

    /// Like [`orchestrator`], with custom admission and deadline settings.
    pub fn orchestrator_with(
        base: &Path,
        jobs: JobsConfig,
        fetcher: Arc<dyn Fetcher>,
        runner: Arc<dyn ToolRunner>,
        publisher: Arc<dyn Publisher>,
    ) -> SwapOrchestrator {
        SwapOrchestrator::new(
            jobs,
            ToolConfig::default(),
            WorkspaceConfig::default().with_root(workspace_root(base)),
            TargetPoolConfig::with_root(pool_root(base)),
            fetcher,
            runner,
            publisher,
        )
    }

    /// A valid request body for `variant`.
    pub fn request_body(variant: JobVariant) -> Value {
        match variant {
            JobVariant::SingleImage => json!({
                "source_url": "https://x/a.jpg",
                "target_url": "https://x/b.jpg"
            }),
            JobVariant::DualSourceImage => json!({
                "source_url_1": "https://x/a1.jpg",
                "source_url_2": "https://x/a2.jpg",
                "target_url": "https://x/b.jpg"
            }),
            JobVariant::DualSourceBatch => json!({
                "source_url1": "https://x/a1.jpg",
                "source_url2": "https://x/a2.jpg",
                "target_url": "https://x/clip.mp4"
            }),
            JobVariant::FiveTarget => json!({
                "source_url": "https://x/a.jpg",
                "gender": "female"
            }),
            JobVariant::Video => json!({
                "source_url": "https://x/a.jpg",
                "target_url": "https://x/clip.mp4"
            }),
        }
    }

    /// A validated request for `variant`, built from [`request_body`].
    pub fn validated_request(variant: JobVariant) -> ValidatedRequest {
        validate(variant, &request_body(variant)).expect("fixture request is valid")
    }
}
