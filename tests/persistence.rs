use std::path::Path;

use arcade::config::{Config, ConfigStore, FileConfigStore};
use arcade::games::math_quiz::QuestionKind;
use arcade::games::{GameId, NumberGuess};
use arcade::history::HistoryLog;
use arcade::store::KeyValueStore;
use arcade::{
    Difficulty, Ending, GameSession, Metric, RecordStore, ScriptedSource, SessionConfig,
    SqliteStore,
};
use tempfile::tempdir;

fn sqlite_records(db: &Path) -> RecordStore {
    RecordStore::new(Box::new(SqliteStore::open(db).unwrap()))
}

fn play_number_game(records: RecordStore, guesses: &[u32]) -> GameSession<NumberGuess> {
    let mut session =
        GameSession::new(NumberGuess, records).with_random(ScriptedSource::new(vec![0.495]));
    session.start(SessionConfig::default());
    for guess in guesses {
        session.submit(guess).unwrap();
    }
    session
}

#[test]
fn records_survive_reopening_the_database() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("state").join("records.db");

    // Arrange: a first session sets the record
    let session = play_number_game(sqlite_records(&db), &[10, 90, 50]);
    assert_eq!(session.best(Metric::Attempts).unwrap(), Some(3));
    drop(session);

    // Act: a worse session against the reopened store
    let session = play_number_game(sqlite_records(&db), &[1, 2, 3, 50]);

    // Assert: the stored best is untouched and nothing was reported
    let summary = session.summary().unwrap();
    assert!(summary.new_records.is_empty());
    assert_eq!(session.best(Metric::Attempts).unwrap(), Some(3));

    // A better session replaces it and reports the previous value
    drop(session);
    let session = play_number_game(sqlite_records(&db), &[50]);
    let update = session.summary().unwrap().new_records[0];
    assert_eq!(update.previous, Some(3));
    assert_eq!(update.value, 1);

    let store = SqliteStore::open(&db).unwrap();
    assert_eq!(
        store.get("numberGameBestScore").unwrap().as_deref(),
        Some("1")
    );
}

#[test]
fn clearing_records_removes_only_that_game() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("records.db");
    let mut store = SqliteStore::open(&db).unwrap();
    store.set("mathQuizBestScore", "7").unwrap();

    let mut session = play_number_game(RecordStore::new(Box::new(store)), &[50]);
    session.clear_records().unwrap();
    assert_eq!(session.best(Metric::Attempts).unwrap(), None);

    let store = SqliteStore::open(&db).unwrap();
    assert_eq!(store.get("numberGameBestScore").unwrap(), None);
    assert_eq!(
        store.get("mathQuizBestScore").unwrap().as_deref(),
        Some("7")
    );
    // the session log is not a record
    assert!(store.get("numberGameHistory").unwrap().is_some());
}

#[test]
fn corrupt_record_is_treated_as_absent() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    store.set("numberGameBestScore", "lots").unwrap();

    let session = play_number_game(RecordStore::new(Box::new(store)), &[20, 50]);
    let summary = session.summary().unwrap();
    assert_eq!(summary.new_records.len(), 1);
    assert_eq!(session.best(Metric::Attempts).unwrap(), Some(2));
}

#[test]
fn history_is_kept_per_game_across_reopens() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("records.db");

    for _ in 0..11 {
        play_number_game(sqlite_records(&db), &[10, 50]);
    }
    let session = play_number_game(sqlite_records(&db), &[50]);
    assert_eq!(session.history().len(), 10);

    let log = sqlite_records(&db).history(GameId::NumberGame).unwrap();
    assert_eq!(log.len(), 10);
    let attempts: Vec<u32> = log.iter().map(|e| e.attempts).collect();
    assert_eq!(attempts[0], 1);
    assert!(attempts[1..].iter().all(|&a| a == 2));
    assert!(log.iter().all(|e| e.ending == Ending::Won));
    assert!(sqlite_records(&db)
        .history(GameId::MathQuiz)
        .unwrap()
        .is_empty());
}

#[test]
fn history_log_exports_newest_first() {
    let mut log = HistoryLog::new();
    for guesses in [&[50][..], &[10, 50][..]] {
        let session = play_number_game(RecordStore::in_memory(), guesses);
        log.push(session.summary().unwrap());
    }

    let mut out = Vec::new();
    log.write_csv(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let rows: Vec<&str> = text.lines().skip(1).collect();
    assert_eq!(rows.len(), 2);
    // newest session took two attempts
    assert!(rows[0].contains(",2,"));
}

#[test]
fn saved_config_is_loaded_back() {
    let dir = tempdir().unwrap();
    let store = FileConfigStore::with_path(dir.path().join("config.json"));
    let cfg = Config {
        difficulty: Difficulty::Medium,
        rounds: Some(7),
        math_questions: QuestionKind::Multiplication,
        ..Config::default()
    };
    store.save(&cfg).unwrap();
    assert_eq!(store.load(), cfg);
}
