//! Snapshot reconciliation.
//!
//! [`Reconciler`] owns the current-snapshot cell and the high score. Each
//! inbound frame either replaces the snapshot wholesale and yields a new status
//! line, or is discarded with the previous snapshot left untouched.

use tracing::{debug, error, info};

use crate::error::Result;
use crate::protocol::{GameSnapshot, GameStatus};
use crate::score::ScoreStore;
use crate::status;

/// Decodes frames into the current [`GameSnapshot`] and tracks the high score.
#[derive(Debug)]
pub struct Reconciler<S: ScoreStore> {
    store: S,
    high_score: u32,
    current: Option<GameSnapshot>,
    discarded: u64,
}

impl<S: ScoreStore> Reconciler<S> {
    /// Create a reconciler whose high score is seeded from `store`.
    pub fn new(store: S) -> Self {
        let high_score = store.load();
        debug!(high_score, "loaded high score");
        Self {
            store,
            high_score,
            current: None,
            discarded: 0,
        }
    }

    pub fn snapshot(&self) -> Option<&GameSnapshot> {
        self.current.as_ref()
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// Number of frames rejected since construction.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Decode `raw` and, on success, make it the current snapshot.
    ///
    /// Returns the status line derived from the new snapshot. When a lost game
    /// beats the high score, the new value is persisted before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`SnakeError::Decode`](crate::SnakeError::Decode) when `raw` is
    /// not a snapshot; the current snapshot and high score are unchanged.
    pub fn reconcile(&mut self, raw: &str) -> Result<String> {
        let snapshot = match GameSnapshot::from_frame(raw) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.discarded += 1;
                return Err(e);
            }
        };

        let score = snapshot.score;
        let text = match snapshot.game_state {
            GameStatus::Running => status::running(score),
            GameStatus::Lost if score > self.high_score => {
                self.record_high_score(score);
                status::new_high_score(score)
            }
            GameStatus::Lost => status::game_over(score),
        };

        self.current = Some(snapshot);
        Ok(text)
    }

    /// Drop the current snapshot so nothing stale is shown.
    pub fn clear(&mut self) {
        self.current = None;
    }

    fn record_high_score(&mut self, score: u32) {
        if let Err(e) = self.store.save(score) {
            error!(score, "failed to persist high score: {e}");
        }
        info!(previous = self.high_score, score, "new high score");
        self.high_score = score;
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
    use crate::error::SnakeError;
    use crate::score::MemoryScoreStore;

    fn frame(state: &str, score: u32) -> String {
        format!(
            r#"{{"boardWidth":30,"boardHeight":20,"snakeBody":[{{"X":1,"Y":1}}],"food":{{"X":4,"Y":4}},"gameState":"{state}","score":{score}}}"#
        )
    }

    /// A store whose writes always fail.
    struct BrokenStore;

    impl ScoreStore for BrokenStore {
        fn load(&self) -> u32 {
            3
        }

        fn save(&mut self, _score: u32) -> Result<()> {
            Err(SnakeError::Io(std::io::Error::other("disk full")))
        }
    }

    #[test]
    fn running_snapshot_sets_score_status() {
        let mut r = Reconciler::new(MemoryScoreStore::default());
        let text = r.reconcile(&frame("Running", 5)).unwrap();
        assert_eq!(text, "Score: 5");
        assert_eq!(r.snapshot().unwrap().score, 5);
    }

    #[test]
    fn lost_below_high_score_keeps_it() {
        let store = MemoryScoreStore::with_score(10);
        let mut r = Reconciler::new(store.clone());
        let text = r.reconcile(&frame("Lost", 7)).unwrap();
        assert_eq!(text, "Game Over! Score: 7. Press R to play again.");
        assert_eq!(r.high_score(), 10);
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn lost_equal_to_high_score_is_not_new() {
        let store = MemoryScoreStore::with_score(10);
        let mut r = Reconciler::new(store.clone());
        let text = r.reconcile(&frame("Lost", 10)).unwrap();
        assert_eq!(text, "Game Over! Score: 10. Press R to play again.");
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn lost_above_high_score_persists_before_status() {
        let store = MemoryScoreStore::with_score(10);
        let mut r = Reconciler::new(store.clone());
        let text = r.reconcile(&frame("Lost", 15)).unwrap();
        assert_eq!(text, "Game Over! New High Score: 15! Press R to play again.");
        assert_eq!(r.high_score(), 15);
        assert_eq!(store.persisted(), 15);
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn running_score_never_touches_high_score() {
        let store = MemoryScoreStore::with_score(1);
        let mut r = Reconciler::new(store.clone());
        r.reconcile(&frame("Running", 99)).unwrap();
        assert_eq!(r.high_score(), 1);
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn high_score_is_running_maximum_of_lost_scores() {
        let store = MemoryScoreStore::with_score(4);
        let mut r = Reconciler::new(store.clone());
        let mut expected = 4;
        for score in [3, 9, 2, 9, 12, 0, 11] {
            r.reconcile(&frame("Lost", score)).unwrap();
            expected = expected.max(score);
            assert_eq!(r.high_score(), expected);
            assert_eq!(store.persisted(), expected);
        }
        assert_eq!(store.write_count(), 2);
    }

    #[test]
    fn malformed_frame_keeps_previous_snapshot() {
        let mut r = Reconciler::new(MemoryScoreStore::default());
        r.reconcile(&frame("Running", 2)).unwrap();
        let before = r.snapshot().cloned();

        let err = r.reconcile("definitely not json").unwrap_err();
        assert!(matches!(err, SnakeError::Decode(_)));
        assert_eq!(r.snapshot().cloned(), before);
        assert_eq!(r.discarded(), 1);
    }

    #[test]
    fn clear_drops_snapshot_but_not_high_score() {
        let mut r = Reconciler::new(MemoryScoreStore::with_score(8));
        r.reconcile(&frame("Lost", 20)).unwrap();
        r.clear();
        assert!(r.snapshot().is_none());
        assert_eq!(r.high_score(), 20);
    }

    #[test]
    fn failed_persist_still_updates_in_memory() {
        let mut r = Reconciler::new(BrokenStore);
        assert_eq!(r.high_score(), 3);
        let text = r.reconcile(&frame("Lost", 6)).unwrap();
        assert_eq!(text, "Game Over! New High Score: 6! Press R to play again.");
        assert_eq!(r.high_score(), 6);
    }
}
