//! Stage artifact cache implementation.

use derive_getters::Getters;
use huddle_core::RecapStage;
use huddle_error::{CacheError, CacheErrorKind};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Root of every week's cache directory.
///
/// # Example
///
/// ```
/// use huddle_cache::StepCache;
/// use huddle_core::RecapStage;
///
/// let cache = StepCache::new("out");
/// let week = cache.week(2024, 5);
/// assert!(week.path(RecapStage::Article).ends_with("2024_week5/step3_recap.md"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct StepCache {
    root: PathBuf,
}

impl StepCache {
    /// Creates a cache rooted at `root`. Nothing is created on disk yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache for one season and week: `{root}/{season}_week{week}`.
    pub fn week(&self, season: i32, week: u32) -> WeekCache {
        WeekCache {
            dir: self.root.join(format!("{}_week{}", season, week)),
            season,
            week,
        }
    }
}

/// Artifacts for one season and week.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct WeekCache {
    dir: PathBuf,
    season: i32,
    week: u32,
}

impl WeekCache {
    /// Where `stage` stores its artifact.
    pub fn path(&self, stage: RecapStage) -> PathBuf {
        self.dir.join(stage.artifact_name())
    }

    /// True when an artifact file exists for `stage`.
    pub fn exists(&self, stage: RecapStage) -> bool {
        self.path(stage).is_file()
    }

    /// Loads a JSON artifact.
    ///
    /// Missing, unreadable and corrupt files are all misses; the latter two
    /// are logged.
    #[tracing::instrument(skip(self), fields(dir = %self.dir.display()))]
    pub fn load_json<T: DeserializeOwned>(&self, stage: RecapStage) -> Option<T> {
        let text = self.read(stage)?;
        match serde_json::from_str(&text) {
            Ok(value) => {
                tracing::debug!("Cache hit");
                Some(value)
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path(stage).display(),
                    error = %e,
                    "Cached artifact is corrupt, regenerating"
                );
                None
            }
        }
    }

    /// Loads a text artifact. Blank files are misses.
    #[tracing::instrument(skip(self), fields(dir = %self.dir.display()))]
    pub fn load_text(&self, stage: RecapStage) -> Option<String> {
        let text = self.read(stage)?;
        if text.trim().is_empty() {
            tracing::warn!(
                path = %self.path(stage).display(),
                "Cached artifact is empty, regenerating"
            );
            return None;
        }
        tracing::debug!("Cache hit");
        Some(text)
    }

    /// Writes `value` as pretty-printed JSON and returns its path.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn store_json<T: Serialize>(
        &self,
        stage: RecapStage,
        value: &T,
    ) -> Result<PathBuf, CacheError> {
        let path = self.path(stage);
        let text = serde_json::to_string_pretty(value).map_err(|e| {
            CacheError::new(CacheErrorKind::Serialize {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        })?;
        self.write(&path, &text)?;
        Ok(path)
    }

    /// Writes a text artifact and returns its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn store_text(&self, stage: RecapStage, text: &str) -> Result<PathBuf, CacheError> {
        let path = self.path(stage);
        self.write(&path, text)?;
        Ok(path)
    }

    /// Creates the week directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn ensure_dir(&self) -> Result<&Path, CacheError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            CacheError::new(CacheErrorKind::DirectoryCreation {
                path: self.dir.display().to_string(),
                message: e.to_string(),
            })
        })?;
        Ok(&self.dir)
    }

    fn read(&self, stage: RecapStage) -> Option<String> {
        let path = self.path(stage);
        if !path.is_file() {
            tracing::debug!(stage = %stage, "Cache miss");
            return None;
        }
        match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Cached artifact unreadable");
                None
            }
        }
    }

    fn write(&self, path: &Path, text: &str) -> Result<(), CacheError> {
        self.ensure_dir()?;
        fs::write(path, text).map_err(|e| {
            CacheError::new(CacheErrorKind::FileWrite {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        })?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "Stored artifact");
        Ok(())
    }
}
