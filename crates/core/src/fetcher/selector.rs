//! Random selection of target images from the local pool.

use rand::Rng;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::config::TargetPoolConfig;
use super::error::SelectionError;

/// Draws distinct target images from `<root>/<category>/`.
#[derive(Debug, Clone)]
pub struct TargetSelector {
    config: TargetPoolConfig,
}

impl TargetSelector {
    pub fn new(config: TargetPoolConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TargetPoolConfig {
        &self.config
    }

    /// Lists eligible images in the category directory, sorted by path.
    ///
    /// Only regular files whose extension matches the configured list
    /// (case-insensitively) are returned.
    pub async fn eligible(&self, category: &str) -> Result<Vec<PathBuf>, SelectionError> {
        if !is_valid_category(category) {
            return Err(SelectionError::InvalidCategory {
                category: category.to_string(),
            });
        }

        let dir = self.config.root.join(category);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SelectionError::NoSuchCategory {
                    category: category.to_string(),
                });
            }
            Err(e) => return Err(SelectionError::Io { path: dir, source: e }),
        };

        let mut images = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => return Err(SelectionError::Io { path: dir, source: e }),
            };
            let path = entry.path();
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if is_file && self.has_eligible_extension(&path) {
                images.push(path);
            }
        }

        images.sort();
        Ok(images)
    }

    /// Chooses `count` distinct entries from `pool` uniformly at random.
    pub fn sample<R: Rng + ?Sized>(
        pool: &[PathBuf],
        count: usize,
        category: &str,
        rng: &mut R,
    ) -> Result<Vec<PathBuf>, SelectionError> {
        if pool.len() < count {
            return Err(SelectionError::InsufficientPool {
                category: category.to_string(),
                available: pool.len(),
                requested: count,
            });
        }

        Ok(rand::seq::index::sample(rng, pool.len(), count)
            .into_iter()
            .map(|i| pool[i].clone())
            .collect())
    }

    /// Selects `count` distinct target images for `category`.
    pub async fn select(&self, category: &str, count: usize) -> Result<Vec<PathBuf>, SelectionError> {
        let pool = self.eligible(category).await?;
        let mut rng = rand::rng();
        self.log_and_sample(&pool, count, category, &mut rng)
    }

    /// Like [`select`](Self::select) with a caller-supplied random source.
    pub async fn select_with_rng<R: Rng + ?Sized>(
        &self,
        category: &str,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<PathBuf>, SelectionError> {
        let pool = self.eligible(category).await?;
        self.log_and_sample(&pool, count, category, rng)
    }

    fn log_and_sample<R: Rng + ?Sized>(
        &self,
        pool: &[PathBuf],
        count: usize,
        category: &str,
        rng: &mut R,
    ) -> Result<Vec<PathBuf>, SelectionError> {
        let selected = Self::sample(pool, count, category, rng)?;
        debug!(
            category = category,
            available = pool.len(),
            selected = selected.len(),
            "Selected target images"
        );
        Ok(selected)
    }

    fn has_eligible_extension(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.config
            .extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
    }
}

/// A category names exactly one directory directly below the pool root.
fn is_valid_category(category: &str) -> bool {
    !category.is_empty()
        && category != "."
        && category != ".."
        && category
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn pool_with(files: &[&str]) -> (TempDir, TargetSelector) {
        let dir = TempDir::new().unwrap();
        let category = dir.path().join("female");
        std::fs::create_dir(&category).unwrap();
        for name in files {
            std::fs::write(category.join(name), b"img").unwrap();
        }
        let selector = TargetSelector::new(TargetPoolConfig::with_root(dir.path().to_path_buf()));
        (dir, selector)
    }

    #[tokio::test]
    async fn test_eligible_filters_extensions() {
        let (_dir, selector) = pool_with(&["a.png", "b.JPG", "c.jpeg", "notes.txt", "noext"]);
        let images = selector.eligible("female").await.unwrap();
        let names: Vec<_> = images
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.png", "b.JPG", "c.jpeg"]);
    }

    #[tokio::test]
    async fn test_eligible_skips_directories() {
        let (dir, selector) = pool_with(&["a.png"]);
        std::fs::create_dir(dir.path().join("female").join("nested.png")).unwrap();
        let images = selector.eligible("female").await.unwrap();
        assert_eq!(images.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_category() {
        let (_dir, selector) = pool_with(&["a.png"]);
        let err = selector.eligible("male").await.unwrap_err();
        assert!(matches!(err, SelectionError::NoSuchCategory { ref category } if category == "male"));
    }

    #[tokio::test]
    async fn test_category_cannot_escape_root() {
        let (_dir, selector) = pool_with(&["a.png"]);
        for category in ["..", ".", "../female", "a/b", ""] {
            let err = selector.eligible(category).await.unwrap_err();
            assert!(matches!(err, SelectionError::InvalidCategory { .. }), "{category}");
        }
    }

    #[tokio::test]
    async fn test_select_returns_distinct_images() {
        let (_dir, selector) =
            pool_with(&["1.png", "2.png", "3.png", "4.jpg", "5.jpg", "6.jpeg", "7.png"]);
        let selected = selector.select("female", 5).await.unwrap();
        assert_eq!(selected.len(), 5);
        let unique: HashSet<_> = selected.iter().collect();
        assert_eq!(unique.len(), 5);
    }

    #[tokio::test]
    async fn test_select_insufficient_pool() {
        let (_dir, selector) = pool_with(&["1.png", "2.png"]);
        let err = selector.select("female", 5).await.unwrap_err();
        assert!(matches!(
            err,
            SelectionError::InsufficientPool {
                available: 2,
                requested: 5,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_select_with_seeded_rng_is_reproducible() {
        let (_dir, selector) = pool_with(&["1.png", "2.png", "3.png", "4.png", "5.png", "6.png"]);
        let first = selector
            .select_with_rng("female", 3, &mut StdRng::seed_from_u64(9))
            .await
            .unwrap();
        let second = selector
            .select_with_rng("female", 3, &mut StdRng::seed_from_u64(9))
            .await
            .unwrap();
        assert_eq!(first, second);
        assert!(first.iter().all(|p| p.starts_with(selector.config().root.join("female"))));
    }

    #[test]
    fn test_sample_exact_pool_uses_everything() {
        let pool: Vec<PathBuf> = (0..5).map(|i| PathBuf::from(format!("{i}.png"))).collect();
        let mut rng = StdRng::seed_from_u64(7);
        let mut selected = TargetSelector::sample(&pool, 5, "male", &mut rng).unwrap();
        selected.sort();
        assert_eq!(selected, pool);
    }

    #[test]
    fn test_sample_covers_whole_pool() {
        let pool: Vec<PathBuf> = (0..8).map(|i| PathBuf::from(format!("{i}.png"))).collect();
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            for path in TargetSelector::sample(&pool, 2, "male", &mut rng).unwrap() {
                seen.insert(path);
            }
        }
        assert_eq!(seen.len(), pool.len());
    }
}
