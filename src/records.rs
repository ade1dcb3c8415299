use serde::Serialize;

use crate::error::Result;
use crate::games::GameId;
use crate::history::HistoryLog;
use crate::store::KeyValueStore;

/// Derived per-session measurements that records and history are keyed on
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Metric {
    Score,
    Attempts,
    Accuracy,
    Wpm,
    MaxStreak,
    Errors,
}

/// Which way a record improves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

impl Direction {
    /// An absent record is beaten by any value in either direction.
    pub fn improves(self, candidate: u32, current: Option<u32>) -> bool {
        match (self, current) {
            (_, None) => true,
            (Direction::HigherIsBetter, Some(best)) => candidate > best,
            (Direction::LowerIsBetter, Some(best)) => candidate < best,
        }
    }
}

/// Declares one persisted best value of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordSpec {
    pub suffix: &'static str,
    pub metric: Metric,
    pub direction: Direction,
}

impl RecordSpec {
    pub const fn higher(suffix: &'static str, metric: Metric) -> Self {
        Self {
            suffix,
            metric,
            direction: Direction::HigherIsBetter,
        }
    }

    pub const fn lower(suffix: &'static str, metric: Metric) -> Self {
        Self {
            suffix,
            metric,
            direction: Direction::LowerIsBetter,
        }
    }

    pub fn key(&self, game: GameId) -> String {
        format!("{game}{}", self.suffix)
    }
}

/// A record that a completed session broke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordUpdate {
    pub metric: Metric,
    pub previous: Option<u32>,
    pub value: u32,
}

/// Per-game best values and recent history on top of a [`KeyValueStore`]
pub struct RecordStore {
    store: Box<dyn KeyValueStore>,
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore").finish_non_exhaustive()
    }
}

impl RecordStore {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(crate::store::MemoryStore::new()))
    }

    /// Stored best for `spec`. Values that do not parse are treated as absent.
    pub fn best(&self, game: GameId, spec: &RecordSpec) -> Result<Option<u32>> {
        let key = spec.key(game);
        let Some(raw) = self.store.get(&key)? else {
            return Ok(None);
        };
        match raw.trim().parse::<u32>() {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                tracing::warn!(%key, %raw, "ignoring unparsable record");
                Ok(None)
            }
        }
    }

    /// Read-then-conditionally-write. Returns the update when `value` beat the stored best.
    pub fn offer(
        &mut self,
        game: GameId,
        spec: &RecordSpec,
        value: u32,
    ) -> Result<Option<RecordUpdate>> {
        let previous = self.best(game, spec)?;
        if !spec.direction.improves(value, previous) {
            return Ok(None);
        }
        self.store.set(&spec.key(game), &value.to_string())?;
        tracing::info!(%game, metric = %spec.metric, ?previous, value, "new record");
        Ok(Some(RecordUpdate {
            metric: spec.metric,
            previous,
            value,
        }))
    }

    pub fn clear(&mut self, game: GameId, specs: &[RecordSpec]) -> Result<()> {
        for spec in specs {
            self.store.remove(&spec.key(game))?;
        }
        Ok(())
    }

    pub fn history(&self, game: GameId) -> Result<HistoryLog> {
        HistoryLog::load(self.store.as_ref(), game)
    }

    pub fn save_history(&mut self, game: GameId, log: &HistoryLog) -> Result<()> {
        log.save(self.store.as_mut(), game)
    }
}
