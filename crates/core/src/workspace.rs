//! Job-scoped working directories.
//!
//! Every job gets `root/<job_id>/`; all downloaded inputs and tool outputs
//! live there, so concurrent jobs never touch each other's files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::job::{InputRole, JobId};

/// Configuration for job workspaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Directory under which per-job directories are created.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Remove the job directory once the job finishes.
    #[serde(default = "default_cleanup")]
    pub cleanup: bool,
}

fn default_root() -> PathBuf {
    std::env::temp_dir().join("faceswap-jobs")
}

fn default_cleanup() -> bool {
    true
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            cleanup: default_cleanup(),
        }
    }
}

impl WorkspaceConfig {
    /// Sets the workspace root.
    pub fn with_root(mut self, root: PathBuf) -> Self {
        self.root = root;
        self
    }

    /// Sets whether job directories are removed afterwards.
    pub fn with_cleanup(mut self, cleanup: bool) -> Self {
        self.cleanup = cleanup;
        self
    }
}

/// The working directory of one job. Removed on drop when cleanup is enabled.
#[derive(Debug)]
pub struct JobWorkspace {
    dir: PathBuf,
    cleanup: bool,
}

impl JobWorkspace {
    /// Creates `root/<job_id>`. Fails if that directory already exists.
    pub async fn create(config: &WorkspaceConfig, job_id: &JobId) -> std::io::Result<Self> {
        tokio::fs::create_dir_all(&config.root).await?;
        let dir = config.root.join(job_id.to_string());
        tokio::fs::create_dir(&dir).await?;
        debug!(job_id = %job_id, dir = %dir.display(), "Created job workspace");

        Ok(Self {
            dir,
            cleanup: config.cleanup,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Local path for a downloaded input.
    pub fn input_path(&self, role: InputRole, extension: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", role.as_str(), extension))
    }

    /// Local path for the `index`-th pool target (1-based).
    pub fn target_path(&self, index: usize, extension: &str) -> PathBuf {
        self.dir.join(format!("target_{}.{}", index, extension))
    }

    /// Local path for the `index`-th pass output (1-based).
    pub fn output_path(&self, index: usize, extension: &str) -> PathBuf {
        self.dir.join(format!("output_{}.{}", index, extension))
    }

}

impl Drop for JobWorkspace {
    fn drop(&mut self) {
        if !self.cleanup {
            return;
        }
        match std::fs::remove_dir_all(&self.dir) {
            Ok(()) => debug!(dir = %self.dir.display(), "Removed job workspace"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(dir = %self.dir.display(), error = %e, "Failed to remove job workspace"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(root: &Path) -> WorkspaceConfig {
        WorkspaceConfig::default().with_root(root.to_path_buf())
    }

    #[test]
    fn test_default_config() {
        let config = WorkspaceConfig::default();
        assert!(config.cleanup);
        assert!(config.root.ends_with("faceswap-jobs"));
    }

    #[tokio::test]
    async fn test_paths_are_inside_job_dir() {
        let root = TempDir::new().unwrap();
        let id = JobId::new();
        let ws = JobWorkspace::create(&config(root.path()), &id).await.unwrap();

        assert_eq!(ws.dir(), root.path().join(id.to_string()));
        assert_eq!(
            ws.input_path(InputRole::Source1, "jpg"),
            ws.dir().join("source1.jpg")
        );
        assert_eq!(ws.target_path(3, "png"), ws.dir().join("target_3.png"));
        assert_eq!(ws.output_path(2, "mp4"), ws.dir().join("output_2.mp4"));
    }

    #[tokio::test]
    async fn test_distinct_jobs_have_disjoint_namespaces() {
        let root = TempDir::new().unwrap();
        let cfg = config(root.path());
        let a = JobWorkspace::create(&cfg, &JobId::new()).await.unwrap();
        let b = JobWorkspace::create(&cfg, &JobId::new()).await.unwrap();

        assert!(!a.dir().starts_with(b.dir()));
        assert!(!b.dir().starts_with(a.dir()));
        assert_ne!(
            a.input_path(InputRole::Target, "jpg"),
            b.input_path(InputRole::Target, "jpg")
        );
        assert_ne!(a.output_path(1, "jpg"), b.output_path(1, "jpg"));
    }

    #[tokio::test]
    async fn test_same_id_cannot_be_created_twice() {
        let root = TempDir::new().unwrap();
        let cfg = config(root.path());
        let id = JobId::new();
        let _first = JobWorkspace::create(&cfg, &id).await.unwrap();
        let second = JobWorkspace::create(&cfg, &id).await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn test_drop_removes_directory() {
        let root = TempDir::new().unwrap();
        let ws = JobWorkspace::create(&config(root.path()), &JobId::new())
            .await
            .unwrap();
        let dir = ws.dir().to_path_buf();
        std::fs::write(ws.output_path(1, "jpg"), b"x").unwrap();
        drop(ws);
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_disabled_cleanup_leaves_directory() {
        let root = TempDir::new().unwrap();
        let cfg = config(root.path()).with_cleanup(false);
        let ws = JobWorkspace::create(&cfg, &JobId::new()).await.unwrap();
        let dir = ws.dir().to_path_buf();
        drop(ws);
        assert!(dir.exists());
    }
}
