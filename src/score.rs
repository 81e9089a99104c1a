//! Persistent high-score storage.
//!
//! The best score ever observed is a single non-negative integer kept under a
//! fixed key. It is read once when the client is built and written every time
//! a finished game beats it.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{Result, SnakeError};

/// Key the high score is stored under.
pub const HIGH_SCORE_KEY: &str = "snakeHighScore";

/// Default file name used by [`FileScoreStore::default`].
pub const DEFAULT_SCORE_FILE: &str = "snake_high_score.toml";

/// Durable storage for the high score.
pub trait ScoreStore: Send + 'static {
    /// Read the stored high score.
    ///
    /// Absent or unreadable values are reported as `0`; loading never fails.
    fn load(&self) -> u32;

    /// Persist a new high score.
    ///
    /// # Errors
    ///
    /// Returns [`SnakeError::Store`] if the value could not be written.
    fn save(&mut self, score: u32) -> Result<()>;
}

// ── File store ──────────────────────────────────────────────────────

/// Stores the high score as a one-key TOML document on disk.
///
/// ```toml
/// snakeHighScore = 15
/// ```
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileScoreStore {
    path: PathBuf,
}

impl FileScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn store_error(&self, source: std::io::Error) -> SnakeError {
        SnakeError::Store {
            path: self.path.clone(),
            source,
        }
    }
}

impl Default for FileScoreStore {
    fn default() -> Self {
        Self::new(DEFAULT_SCORE_FILE)
    }
}

impl ScoreStore for FileScoreStore {
    fn load(&self) -> u32 {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return 0,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "failed to read high score: {e}");
                return 0;
            }
        };

        match parse_high_score(&text) {
            Some(score) => score,
            None => {
                tracing::warn!(path = %self.path.display(), "unparseable high score file, using 0");
                0
            }
        }
    }

    fn save(&mut self, score: u32) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.store_error(e))?;
            }
        }

        let mut table = toml::Table::new();
        table.insert(HIGH_SCORE_KEY.to_string(), toml::Value::Integer(i64::from(score)));
        let body = table.to_string();

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, body).map_err(|e| self.store_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.store_error(e))?;

        tracing::debug!(path = %self.path.display(), score, "high score persisted");
        Ok(())
    }
}

/// Extract the high score from a TOML document, rejecting negatives and
/// values that do not fit in `u32`.
fn parse_high_score(text: &str) -> Option<u32> {
    let table: toml::Table = text.parse().ok()?;
    let value = table.get(HIGH_SCORE_KEY)?.as_integer()?;
    u32::try_from(value).ok()
}

// ── In-memory store ─────────────────────────────────────────────────

/// A [`ScoreStore`] kept in memory.
///
/// Clones share the same cell, so a test can keep one handle and inspect what
/// the client persisted through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    value: Arc<AtomicU32>,
    writes: Arc<AtomicUsize>,
}

impl MemoryScoreStore {
    /// Create a store seeded with `score`, as if it had been persisted by an
    /// earlier run.
    pub fn with_score(score: u32) -> Self {
        Self {
            value: Arc::new(AtomicU32::new(score)),
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The currently persisted value.
    pub fn persisted(&self) -> u32 {
        self.value.load(Ordering::Acquire)
    }

    /// Number of successful [`save`](ScoreStore::save) calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Acquire)
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load(&self) -> u32 {
        self.persisted()
    }

    fn save(&mut self, score: u32) -> Result<()> {
        self.value.store(score, Ordering::Release);
        self.writes.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_zero() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileScoreStore::new(dir.path().join("absent.toml"));
        assert_eq!(store.load(), 0);
    }

    #[test]
    fn save_then_load_survives_a_new_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("score.toml");

        let mut store = FileScoreStore::new(&path);
        store.save(42).unwrap();

        let reopened = FileScoreStore::new(&path);
        assert_eq!(reopened.load(), 42);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("snakeHighScore = 42"), "got {text:?}");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn garbage_file_loads_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("score.toml");
        std::fs::write(&path, "not toml at all ===").unwrap();
        assert_eq!(FileScoreStore::new(&path).load(), 0);
    }

    #[test]
    fn negative_and_wrong_type_load_zero() {
        assert_eq!(parse_high_score("snakeHighScore = -3"), None);
        assert_eq!(parse_high_score("snakeHighScore = \"12\""), None);
        assert_eq!(parse_high_score("otherKey = 12"), None);
        assert_eq!(parse_high_score("snakeHighScore = 12"), Some(12));
    }

    #[test]
    fn save_into_unwritable_location_reports_store_error() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file cannot be used as a parent directory.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        let mut store = FileScoreStore::new(blocker.join("score.toml"));
        let err = store.save(1).unwrap_err();
        assert!(matches!(err, SnakeError::Store { .. }));
    }

    #[test]
    fn memory_store_clones_share_state() {
        let handle = MemoryScoreStore::with_score(10);
        let mut writer = handle.clone();
        assert_eq!(writer.load(), 10);

        writer.save(15).unwrap();
        assert_eq!(handle.persisted(), 15);
        assert_eq!(handle.write_count(), 1);
    }
}
