use std::time::Duration;

use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};

use crate::difficulty::Difficulty;
use crate::error::{GameError, Result};
use crate::games::GameId;
use crate::policy::{Game, GamePolicy, Outcome, RoundPlan, ScoringRule, SessionConfig};
use crate::random::RandomSource;
use crate::records::{Metric, RecordSpec};
use crate::util::percent;

static PASSAGE_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/passages");

pub static POLICY: GamePolicy = GamePolicy {
    id: GameId::Typing,
    name: "Typing Speed Test",
    description: "Type the passage as fast and as accurately as you can",
    rounds: RoundPlan::Single,
    scoring: ScoringRule::Unscored,
    records: &[
        RecordSpec::higher("BestWpm", Metric::Wpm),
        RecordSpec::higher("BestAccuracy", Metric::Accuracy),
    ],
    reveal_delay: None,
};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TextCategory {
    #[default]
    Random,
    Quotes,
    Code,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PassageSet {
    pub random: Vec<String>,
    pub quotes: Vec<String>,
    pub code: Vec<String>,
}

impl PassageSet {
    fn get(&self, category: TextCategory) -> &[String] {
        match category {
            TextCategory::Random => &self.random,
            TextCategory::Quotes => &self.quotes,
            TextCategory::Code => &self.code,
        }
    }
}

/// Passages for every tier and category
#[derive(Debug, Clone)]
pub struct PassageBook {
    easy: PassageSet,
    medium: PassageSet,
    hard: PassageSet,
}

impl PassageBook {
    /// The passages compiled into the binary
    pub fn embedded() -> Result<Self> {
        Self::from_sets(load_set("easy")?, load_set("medium")?, load_set("hard")?)
    }

    pub fn from_sets(easy: PassageSet, medium: PassageSet, hard: PassageSet) -> Result<Self> {
        let book = Self { easy, medium, hard };
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            for category in [TextCategory::Random, TextCategory::Quotes, TextCategory::Code] {
                if book.passages(difficulty, category).is_empty() {
                    return Err(GameError::Passages(format!(
                        "no {category} passages for {difficulty}"
                    )));
                }
            }
        }
        Ok(book)
    }

    pub fn passages(&self, difficulty: Difficulty, category: TextCategory) -> &[String] {
        let set = match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        };
        set.get(category)
    }
}

fn load_set(name: &str) -> Result<PassageSet> {
    let file_name = format!("{name}.json");
    let file = PASSAGE_DIR
        .get_file(&file_name)
        .ok_or_else(|| GameError::Passages(format!("{file_name} is missing")))?;
    let text = file
        .contents_utf8()
        .ok_or_else(|| GameError::Passages(format!("{file_name} is not UTF-8")))?;
    Ok(serde_json::from_str(text)?)
}

/// Typed text measured against the passage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub correct_chars: usize,
    pub first_error: Option<usize>,
    pub remaining: usize,
}

/// Shorter-than-passage submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Incomplete {
    pub typed: usize,
    pub remaining: usize,
    pub first_error: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Passage {
    text: String,
    typed: String,
}

impl Passage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            typed: String::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn typed(&self) -> &str {
        &self.typed
    }

    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    pub fn progress(&self, input: &str) -> Progress {
        let mut correct_chars = 0;
        let mut first_error = None;
        for (i, (typed, expected)) in input.chars().zip(self.text.chars()).enumerate() {
            if typed == expected {
                correct_chars += 1;
            } else if first_error.is_none() {
                first_error = Some(i);
            }
        }
        Progress {
            correct_chars,
            first_error,
            remaining: self.len().saturating_sub(input.chars().count()),
        }
    }

    /// Position-wise correct characters over the passage length, as a percentage
    pub fn accuracy(&self, input: &str) -> u32 {
        let correct = self.progress(input).correct_chars;
        percent(correct as u32, self.len() as u32)
    }

    pub fn errors(&self, input: &str) -> u32 {
        input
            .chars()
            .zip(self.text.chars())
            .filter(|(typed, expected)| typed != expected)
            .count() as u32
    }
}

/// Words per minute over the whole passage; 0 when no time has passed
pub fn words_per_minute(words: usize, elapsed: Duration) -> u32 {
    let minutes = elapsed.as_secs_f64() / 60.0;
    if minutes <= 0.0 {
        return 0;
    }
    (words as f64 / minutes).round() as u32
}

#[derive(Debug, Clone)]
pub struct TypingTest {
    book: PassageBook,
}

impl TypingTest {
    pub fn new() -> Result<Self> {
        Ok(Self::with_book(PassageBook::embedded()?))
    }

    pub fn with_book(book: PassageBook) -> Self {
        Self { book }
    }
}

impl Game for TypingTest {
    type Params = TextCategory;
    type Challenge = Passage;
    type Answer = str;
    type Feedback = Incomplete;

    fn policy(&self) -> &'static GamePolicy {
        &POLICY
    }

    fn generate(
        &self,
        config: &SessionConfig<TextCategory>,
        rng: &mut dyn RandomSource,
    ) -> Passage {
        let passages = self.book.passages(config.difficulty, config.params);
        let idx = rng.below(passages.len() as u32) as usize;
        Passage::new(passages[idx].clone())
    }

    fn evaluate(
        &self,
        _config: &SessionConfig<TextCategory>,
        passage: &mut Passage,
        input: &str,
    ) -> Outcome<Incomplete> {
        passage.typed = input.to_string();
        let progress = passage.progress(input);
        if input.chars().count() >= passage.len() {
            return Outcome::Correct;
        }
        Outcome::Incorrect(Some(Incomplete {
            typed: input.chars().count(),
            remaining: progress.remaining,
            first_error: progress.first_error,
        }))
    }

    fn final_metrics(&self, passage: &Passage, elapsed: Duration) -> Vec<(Metric, u32)> {
        vec![
            (Metric::Accuracy, passage.accuracy(&passage.typed)),
            (Metric::Errors, passage.errors(&passage.typed)),
            (Metric::Wpm, words_per_minute(passage.word_count(), elapsed)),
        ]
    }

    fn mode_label(&self, category: &TextCategory) -> Option<String> {
        Some(category.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedSource;

    #[test]
    fn embedded_book_has_every_category() {
        let book = PassageBook::embedded().unwrap();
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            assert_eq!(book.passages(difficulty, TextCategory::Quotes).len(), 3);
        }
    }

    #[test]
    fn empty_category_is_rejected() {
        let set = || PassageSet {
            random: vec!["a".into()],
            quotes: vec!["b".into()],
            code: vec!["c".into()],
        };
        let mut hard = set();
        hard.code.clear();
        let err = PassageBook::from_sets(set(), set(), hard).unwrap_err();
        assert_eq!(
            err.to_string(),
            "passage library is unusable: no code passages for hard"
        );
    }

    #[test]
    fn generate_picks_from_category() {
        let game = TypingTest::new().unwrap();
        let config = SessionConfig::with_params(Difficulty::Easy, TextCategory::Quotes);
        let mut rng = ScriptedSource::new(vec![0.5]);
        let passage = game.generate(&config, &mut rng);
        assert!(passage.text().starts_with("The only way to do great work"));
    }

    #[test]
    fn accuracy_counts_matching_positions() {
        let text = "a".repeat(50);
        let passage = Passage::new(text);
        let input = format!("{}{}", "a".repeat(40), "b".repeat(10));
        assert_eq!(passage.accuracy(&input), 80);
        assert_eq!(passage.errors(&input), 10);
    }

    #[test]
    fn progress_tracks_first_error() {
        let passage = Passage::new("hello world");
        let p = passage.progress("helxo");
        assert_eq!(p.correct_chars, 4);
        assert_eq!(p.first_error, Some(3));
        assert_eq!(p.remaining, 6);

        assert_eq!(passage.progress("hello").first_error, None);
    }

    #[test]
    fn short_submission_is_incomplete() {
        let game = TypingTest::new().unwrap();
        let config = SessionConfig::default();
        let mut passage = Passage::new("abcdef");
        let outcome = game.evaluate(&config, &mut passage, "abd");
        assert_eq!(
            outcome,
            Outcome::Incorrect(Some(Incomplete {
                typed: 3,
                remaining: 3,
                first_error: Some(2)
            }))
        );
        assert_eq!(game.evaluate(&config, &mut passage, "abcdeX"), Outcome::Correct);
        assert_eq!(passage.typed(), "abcdeX");
    }

    #[test]
    fn wpm_from_elapsed() {
        assert_eq!(words_per_minute(30, Duration::from_secs(30)), 60);
        assert_eq!(words_per_minute(10, Duration::from_secs(45)), 13);
        assert_eq!(words_per_minute(10, Duration::ZERO), 0);
    }
}
