// A game is one static policy row plus a `Game` impl that generates and judges
// challenges. Rounds, scoring and records come from the row.

use std::fmt::Debug;
use std::time::Duration;

use crate::difficulty::{Difficulty, Tiered};
use crate::games::GameId;
use crate::random::RandomSource;
use crate::records::{Metric, RecordSpec};

/// Result of judging one candidate answer
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<F> {
    Correct,
    Incorrect(Option<F>),
}

impl<F> Outcome<F> {
    pub fn is_correct(&self) -> bool {
        matches!(self, Outcome::Correct)
    }

    pub fn feedback(&self) -> Option<&F> {
        match self {
            Outcome::Correct => None,
            Outcome::Incorrect(feedback) => feedback.as_ref(),
        }
    }
}

/// How a session moves between challenges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPlan {
    /// One challenge for the whole session; done once the game reports it solved
    Single,
    /// A fresh challenge per round, `default` rounds unless the config overrides it
    Fixed { default: u32, advance_on_miss: bool },
}

/// Points awarded for a correct answer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoringRule {
    /// No per-round points; the game is measured by its completion metrics
    Unscored,
    /// One point per correct answer
    Count,
    /// `max(0, 100 - deviation) + max(0, 100 - elapsed_secs) + bonus`, rounded
    Distance { difficulty_bonus: Tiered<u32> },
}

impl ScoringRule {
    pub fn round_score(&self, difficulty: Difficulty, deviation: f64, elapsed: Duration) -> u32 {
        match self {
            ScoringRule::Unscored => 0,
            ScoringRule::Count => 1,
            ScoringRule::Distance { difficulty_bonus } => {
                let accuracy = (100.0 - deviation).max(0.0);
                let time_bonus = (100.0 - elapsed.as_secs() as f64).max(0.0);
                (accuracy + time_bonus + difficulty_bonus.get(difficulty) as f64).round() as u32
            }
        }
    }
}

/// Static description of one game
#[derive(Debug, Clone, Copy)]
pub struct GamePolicy {
    pub id: GameId,
    pub name: &'static str,
    pub description: &'static str,
    pub rounds: RoundPlan,
    pub scoring: ScoringRule,
    pub records: &'static [RecordSpec],
    /// A miss leaves the challenge revealed until the host resolves it after this delay
    pub reveal_delay: Option<Duration>,
}

/// Options chosen before play starts
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig<P> {
    pub difficulty: Difficulty,
    pub params: P,
    /// Overrides the policy's round count for fixed-round games
    pub rounds: Option<u32>,
}

impl<P: Default> SessionConfig<P> {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            params: P::default(),
            rounds: None,
        }
    }
}

impl<P> SessionConfig<P> {
    pub fn with_params(difficulty: Difficulty, params: P) -> Self {
        Self {
            difficulty,
            params,
            rounds: None,
        }
    }

    pub fn rounds(mut self, rounds: u32) -> Self {
        self.rounds = Some(rounds);
        self
    }
}

impl<P: Default> Default for SessionConfig<P> {
    fn default() -> Self {
        Self::new(Difficulty::default())
    }
}

/// Challenge generation and evaluation for one game
pub trait Game {
    /// Game-specific mode selector (operation kind, text category, ...)
    type Params: Clone + Debug + Default;
    type Challenge: Clone + Debug;
    type Answer: ?Sized;
    type Feedback: Clone + Debug + PartialEq;

    fn policy(&self) -> &'static GamePolicy;

    fn generate(
        &self,
        config: &SessionConfig<Self::Params>,
        rng: &mut dyn RandomSource,
    ) -> Self::Challenge;

    /// Judge `answer`. The challenge is mutable so boards and typed text can
    /// be tracked on it.
    fn evaluate(
        &self,
        config: &SessionConfig<Self::Params>,
        challenge: &mut Self::Challenge,
        answer: &Self::Answer,
    ) -> Outcome<Self::Feedback>;

    /// Average per-dimension error of the last accepted answer
    fn deviation(&self, _challenge: &Self::Challenge) -> f64 {
        0.0
    }

    /// Answers the game would ignore (an occupied square, a card already
    /// face up). The session rejects these before judging or counting them.
    fn accepts(&self, _challenge: &Self::Challenge, _answer: &Self::Answer) -> bool {
        true
    }

    /// For single-challenge games: whether a correct answer finished it
    fn is_solved(&self, _challenge: &Self::Challenge) -> bool {
        true
    }

    /// For single-challenge games: whether a miss ended it as a loss
    fn is_over(&self, _challenge: &Self::Challenge) -> bool {
        false
    }

    /// Undo whatever a miss revealed (only called for policies with a reveal delay)
    fn reconcile(&self, _challenge: &mut Self::Challenge) {}

    /// Metrics measured on the final challenge; they override the engine's defaults
    fn final_metrics(&self, _challenge: &Self::Challenge, _elapsed: Duration) -> Vec<(Metric, u32)> {
        Vec::new()
    }

    /// Human label for the chosen params, kept in history
    fn mode_label(&self, _params: &Self::Params) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_score_combines_accuracy_time_and_bonus() {
        let rule = ScoringRule::Distance {
            difficulty_bonus: Tiered::new(50, 100, 150),
        };
        // 100 - 10 + 100 - 12 + 50
        assert_eq!(
            rule.round_score(Difficulty::Easy, 10.0, Duration::from_secs(12)),
            228
        );
        // time bonus bottoms out at zero
        assert_eq!(
            rule.round_score(Difficulty::Hard, 0.0, Duration::from_secs(500)),
            250
        );
    }

    #[test]
    fn count_and_unscored() {
        assert_eq!(
            ScoringRule::Count.round_score(Difficulty::Easy, 99.0, Duration::ZERO),
            1
        );
        assert_eq!(
            ScoringRule::Unscored.round_score(Difficulty::Easy, 0.0, Duration::ZERO),
            0
        );
    }

    #[test]
    fn outcome_helpers() {
        let miss: Outcome<&str> = Outcome::Incorrect(Some("too low"));
        assert!(!miss.is_correct());
        assert_eq!(miss.feedback(), Some(&"too low"));
        assert!(Outcome::<()>::Correct.is_correct());
    }

    #[test]
    fn config_builder() {
        let config: SessionConfig<()> = SessionConfig::new(Difficulty::Hard).rounds(3);
        assert_eq!(config.rounds, Some(3));
        assert_eq!(config.difficulty, Difficulty::Hard);
    }
}
