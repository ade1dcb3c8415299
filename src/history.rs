use std::collections::{BTreeMap, VecDeque};
use std::io::Write;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::difficulty::Difficulty;
use crate::error::Result;
use crate::games::GameId;
use crate::records::{Metric, RecordUpdate};
use crate::store::KeyValueStore;

/// How many completed sessions a log keeps
pub const HISTORY_LIMIT: usize = 10;

/// How a completed session ended
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Ending {
    /// A single-challenge game was solved
    Won,
    /// A single-challenge game ended on a miss; no records are offered
    Lost,
    /// Every round of a fixed-round game was played
    Finished,
}

/// What a completed session reports for display and history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub game: GameId,
    pub difficulty: Difficulty,
    pub mode: Option<String>,
    pub ending: Ending,
    pub score: u32,
    pub attempts: u32,
    pub max_streak: u32,
    pub metrics: BTreeMap<Metric, u32>,
    pub elapsed_secs: u64,
    pub finished_at: DateTime<Local>,
    pub new_records: Vec<RecordUpdate>,
}

impl SessionSummary {
    pub fn metric(&self, metric: Metric) -> Option<u32> {
        self.metrics.get(&metric).copied()
    }

    pub fn broke_record(&self, metric: Metric) -> bool {
        self.new_records.iter().any(|r| r.metric == metric)
    }
}

/// One history row; also the CSV export shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: String,
    pub game: GameId,
    pub difficulty: Difficulty,
    pub mode: Option<String>,
    pub ending: Ending,
    pub score: u32,
    pub attempts: u32,
    pub max_streak: u32,
    pub accuracy: Option<u32>,
    pub wpm: Option<u32>,
    pub elapsed_secs: u64,
}

impl From<&SessionSummary> for HistoryEntry {
    fn from(s: &SessionSummary) -> Self {
        Self {
            date: s.finished_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            game: s.game,
            difficulty: s.difficulty,
            mode: s.mode.clone(),
            ending: s.ending,
            score: s.score,
            attempts: s.attempts,
            max_streak: s.max_streak,
            accuracy: s.metric(Metric::Accuracy),
            wpm: s.metric(Metric::Wpm),
            elapsed_secs: s.elapsed_secs,
        }
    }
}

impl From<SessionSummary> for HistoryEntry {
    fn from(s: SessionSummary) -> Self {
        Self::from(&s)
    }
}

/// Newest-first log of recent completed sessions, truncated on insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryLog {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(HISTORY_LIMIT),
        }
    }

    /// Store key of a game's log, next to its `<gameId><Suffix>` records
    pub fn key(game: GameId) -> String {
        format!("{game}History")
    }

    /// The stored log of `game`. A value that does not parse counts as empty.
    pub fn load(store: &dyn KeyValueStore, game: GameId) -> Result<Self> {
        let key = Self::key(game);
        let Some(raw) = store.get(&key)? else {
            return Ok(Self::new());
        };
        match serde_json::from_str::<HistoryLog>(&raw) {
            Ok(mut log) => {
                log.entries.truncate(HISTORY_LIMIT);
                Ok(log)
            }
            Err(err) => {
                tracing::warn!(%key, %err, "ignoring unreadable history");
                Ok(Self::new())
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore, game: GameId) -> Result<()> {
        store.set(&Self::key(game), &serde_json::to_string(self)?)
    }

    pub fn push(&mut self, entry: impl Into<HistoryEntry>) {
        self.entries.push_front(entry.into());
        self.entries.truncate(HISTORY_LIMIT);
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write every entry, newest first, as CSV with a header row
    pub fn write_csv<W: Write>(&self, out: W) -> Result<()> {
        write_csv(self.iter(), out)
    }
}

/// Entries as CSV under one header row; nothing at all when there are none
pub fn write_csv<'a, W: Write>(
    entries: impl IntoIterator<Item = &'a HistoryEntry>,
    out: W,
) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for entry in entries {
        writer.serialize(entry)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn summary(score: u32) -> SessionSummary {
        SessionSummary {
            game: GameId::MathQuiz,
            difficulty: Difficulty::Easy,
            mode: Some("mixed".into()),
            ending: Ending::Finished,
            score,
            attempts: 10,
            max_streak: 3,
            metrics: BTreeMap::from([(Metric::Score, score), (Metric::Accuracy, score * 10)]),
            elapsed_secs: 42,
            finished_at: Local::now(),
            new_records: vec![],
        }
    }

    #[test]
    fn newest_first_and_capped() {
        let mut log = HistoryLog::new();
        for score in 0..15 {
            log.push(summary(score));
        }
        assert_eq!(log.len(), HISTORY_LIMIT);
        assert_eq!(log.latest().map(|s| s.score), Some(14));
        let scores: Vec<u32> = log.iter().map(|s| s.score).collect();
        assert_eq!(scores, (5..15).rev().collect::<Vec<_>>());
    }

    #[test]
    fn write_csv_has_header_and_rows() {
        let mut log = HistoryLog::new();
        log.push(summary(7));
        log.push(summary(8));
        let mut buf = Vec::new();
        log.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("date,game,difficulty,mode,ending,score"));
        assert!(lines[1].contains(",mathQuiz,easy,mixed,finished,8,10,3,80,,42"));
    }

    #[test]
    fn saved_log_loads_back_per_game() {
        let mut store = MemoryStore::new();
        let mut log = HistoryLog::new();
        log.push(summary(3));
        log.push(summary(5));
        log.save(&mut store, GameId::MathQuiz).unwrap();

        assert!(store.get("mathQuizHistory").unwrap().is_some());
        assert_eq!(HistoryLog::load(&store, GameId::MathQuiz).unwrap(), log);
        assert!(HistoryLog::load(&store, GameId::Typing).unwrap().is_empty());
    }

    #[test]
    fn unreadable_log_loads_empty() {
        let mut store = MemoryStore::new();
        store.set("typingHistory", "[{").unwrap();
        assert!(HistoryLog::load(&store, GameId::Typing).unwrap().is_empty());
    }
}
