use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use chrono::Local;

use crate::clock::{Clock, SystemClock};
use crate::error::{GameError, Result};
use crate::history::{Ending, HistoryLog, SessionSummary};
use crate::policy::{Game, GamePolicy, Outcome, RoundPlan, SessionConfig};
use crate::random::{RandomSource, RngSource};
use crate::records::{Metric, RecordSpec, RecordStore};
use crate::util::percent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// `reconciling` is set while a missed answer stays revealed
    Active { reconciling: bool },
    Complete,
}

impl Phase {
    pub fn is_active(&self) -> bool {
        matches!(self, Phase::Active { .. })
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Active { reconciling: false } => write!(f, "active"),
            Phase::Active { reconciling: true } => write!(f, "reconciling"),
            Phase::Complete => write!(f, "complete"),
        }
    }
}

/// Mutable play-through state; the challenge is present only while active
#[derive(Debug, Clone)]
struct SessionState<C> {
    challenge: Option<C>,
    round: u32,
    total_rounds: Option<u32>,
    attempts: u32,
    correct: u32,
    streak: u32,
    max_streak: u32,
    score: u32,
    started_at: Option<Instant>,
    elapsed: Duration,
}

impl<C> SessionState<C> {
    fn fresh() -> Self {
        Self {
            challenge: None,
            round: 0,
            total_rounds: None,
            attempts: 0,
            correct: 0,
            streak: 0,
            max_streak: 0,
            score: 0,
            started_at: None,
            elapsed: Duration::ZERO,
        }
    }
}

/// Read-only view for rendering
#[derive(Debug)]
pub struct Snapshot<'a, C, F> {
    pub phase: Phase,
    pub score: u32,
    pub attempts: u32,
    pub correct: u32,
    pub streak: u32,
    pub max_streak: u32,
    /// 1-based round number (0 while idle)
    pub round: u32,
    pub total_rounds: Option<u32>,
    pub elapsed: Duration,
    pub challenge: Option<&'a C>,
    pub last_outcome: Option<&'a Outcome<F>>,
    pub summary: Option<&'a SessionSummary>,
    pub reveal_delay: Option<Duration>,
}

/// Drives one play-through at a time of a scored mini-game
pub struct GameSession<G: Game> {
    game: G,
    config: SessionConfig<G::Params>,
    phase: Phase,
    state: SessionState<G::Challenge>,
    last_outcome: Option<Outcome<G::Feedback>>,
    summary: Option<SessionSummary>,
    records: RecordStore,
    history: HistoryLog,
    rng: Box<dyn RandomSource>,
    clock: Box<dyn Clock>,
}

impl<G: Game> GameSession<G> {
    pub fn new(game: G, records: RecordStore) -> Self {
        let id = game.policy().id;
        let history = records.history(id).unwrap_or_else(|err| {
            tracing::warn!(game = %id, %err, "could not load history");
            HistoryLog::new()
        });
        Self {
            game,
            config: SessionConfig::default(),
            phase: Phase::Idle,
            state: SessionState::fresh(),
            last_outcome: None,
            summary: None,
            records,
            history,
            rng: Box::new(RngSource::from_entropy()),
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_random(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn policy(&self) -> &'static GamePolicy {
        self.game.policy()
    }

    /// Begin a fresh play-through. A running session is abandoned unrecorded.
    pub fn start(&mut self, config: SessionConfig<G::Params>) {
        let policy = self.game.policy();
        if self.phase.is_active() {
            tracing::debug!(game = %policy.id, "abandoning running session");
        }

        let now = self.clock.now();
        let challenge = self.game.generate(&config, self.rng.as_mut());
        let total_rounds = match policy.rounds {
            RoundPlan::Single => None,
            RoundPlan::Fixed { default, .. } => Some(config.rounds.unwrap_or(default).max(1)),
        };

        tracing::debug!(game = %policy.id, difficulty = %config.difficulty, ?total_rounds, "session started");

        self.state = SessionState {
            challenge: Some(challenge),
            round: 1,
            total_rounds,
            started_at: Some(now),
            ..SessionState::fresh()
        };
        self.config = config;
        self.phase = Phase::Active { reconciling: false };
        self.last_outcome = None;
        self.summary = None;
    }

    /// Judge a candidate answer against the current challenge.
    ///
    /// Completes the session when the game's finish condition is met. An
    /// answer the game does not accept fails with `IllegalMove` and leaves the
    /// session untouched.
    pub fn submit(&mut self, answer: &G::Answer) -> Result<Outcome<G::Feedback>> {
        if self.phase != (Phase::Active { reconciling: false }) {
            return Err(self.invalid("submit"));
        }
        let now = self.clock.now();
        let policy = self.game.policy();

        let Some(challenge) = self.state.challenge.as_mut() else {
            return Err(GameError::InvalidState {
                op: "submit",
                phase: self.phase,
            });
        };
        if !self.game.accepts(challenge, answer) {
            tracing::debug!(game = %policy.id, "move rejected");
            return Err(GameError::IllegalMove { game: policy.id });
        }
        let outcome = self.game.evaluate(&self.config, challenge, answer);
        let deviation = self.game.deviation(challenge);

        self.state.attempts += 1;
        if let Some(started_at) = self.state.started_at {
            self.state.elapsed = now.saturating_duration_since(started_at);
        }

        let ending = match &outcome {
            Outcome::Correct => {
                self.state.correct += 1;
                self.state.streak += 1;
                self.state.max_streak = self.state.max_streak.max(self.state.streak);
                self.state.score += policy.scoring.round_score(
                    self.config.difficulty,
                    deviation,
                    self.state.elapsed,
                );
                self.advance(true)
            }
            Outcome::Incorrect(_) => {
                self.state.streak = 0;
                if policy.reveal_delay.is_some() {
                    self.phase = Phase::Active { reconciling: true };
                    None
                } else {
                    self.advance(false)
                }
            }
        };

        tracing::debug!(
            game = %policy.id,
            correct = outcome.is_correct(),
            attempts = self.state.attempts,
            score = self.state.score,
            streak = self.state.streak,
            "answer judged"
        );

        self.last_outcome = Some(outcome.clone());
        if let Some(ending) = ending {
            self.complete(now, ending);
        }
        Ok(outcome)
    }

    /// Move to the next round if this answer consumed the current one.
    /// Returns how the session ended, if it did.
    fn advance(&mut self, correct: bool) -> Option<Ending> {
        match self.game.policy().rounds {
            RoundPlan::Single => {
                let challenge = self.state.challenge.as_ref()?;
                if correct && self.game.is_solved(challenge) {
                    Some(Ending::Won)
                } else if !correct && self.game.is_over(challenge) {
                    Some(Ending::Lost)
                } else {
                    None
                }
            }
            RoundPlan::Fixed {
                advance_on_miss, ..
            } => {
                if !correct && !advance_on_miss {
                    return None;
                }
                let total = self.state.total_rounds.unwrap_or(1);
                if self.state.round >= total {
                    return Some(Ending::Finished);
                }
                self.state.round += 1;
                self.state.challenge = Some(self.game.generate(&self.config, self.rng.as_mut()));
                None
            }
        }
    }

    /// Freeze the session, update records and history. A lost session
    /// offers no records.
    fn complete(&mut self, now: Instant, ending: Ending) -> SessionSummary {
        let policy = self.game.policy();
        let elapsed = self
            .state
            .started_at
            .map(|started_at| now.saturating_duration_since(started_at))
            .unwrap_or_default();
        self.state.elapsed = elapsed;
        let challenge = self.state.challenge.take();

        let mut metrics = BTreeMap::from([
            (Metric::Score, self.state.score),
            (Metric::Attempts, self.state.attempts),
            (Metric::MaxStreak, self.state.max_streak),
            (
                Metric::Accuracy,
                percent(self.state.correct, self.state.attempts),
            ),
        ]);
        if let Some(challenge) = &challenge {
            metrics.extend(self.game.final_metrics(challenge, elapsed));
        }

        let mut new_records = Vec::new();
        let specs: &[RecordSpec] = if ending == Ending::Lost {
            &[]
        } else {
            policy.records
        };
        for spec in specs {
            let Some(&value) = metrics.get(&spec.metric) else {
                continue;
            };
            match self.records.offer(policy.id, spec, value) {
                Ok(Some(update)) => new_records.push(update),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(game = %policy.id, metric = %spec.metric, %err, "could not update record")
                }
            }
        }

        let summary = SessionSummary {
            game: policy.id,
            difficulty: self.config.difficulty,
            mode: self.game.mode_label(&self.config.params),
            ending,
            score: self.state.score,
            attempts: self.state.attempts,
            max_streak: self.state.max_streak,
            metrics,
            elapsed_secs: elapsed.as_secs(),
            finished_at: Local::now(),
            new_records,
        };

        tracing::info!(
            game = %policy.id,
            %ending,
            score = summary.score,
            attempts = summary.attempts,
            elapsed_secs = summary.elapsed_secs,
            records = summary.new_records.len(),
            "session complete"
        );

        self.history.push(&summary);
        if let Err(err) = self.records.save_history(policy.id, &self.history) {
            tracing::warn!(game = %policy.id, %err, "could not save history");
        }
        self.summary = Some(summary.clone());
        self.phase = Phase::Complete;
        summary
    }

    /// Abandon the current session without recording it. No-op while idle.
    pub fn reset(&mut self) {
        if self.phase == Phase::Idle {
            return;
        }
        tracing::debug!(game = %self.game.policy().id, phase = %self.phase, "session reset");
        self.state = SessionState::fresh();
        self.phase = Phase::Idle;
        self.last_outcome = None;
        self.summary = None;
    }

    /// Refresh the elapsed-time display; has no effect outside the active phase
    pub fn tick(&mut self, now: Instant) {
        if !self.phase.is_active() {
            return;
        }
        if let Some(started_at) = self.state.started_at {
            self.state.elapsed = now.saturating_duration_since(started_at);
        }
    }

    /// End the reveal window opened by a miss, hiding what it exposed
    pub fn resolve_reconciliation(&mut self) -> Result<()> {
        if self.phase != (Phase::Active { reconciling: true }) {
            return Err(self.invalid("resolve reconciliation"));
        }
        if let Some(challenge) = self.state.challenge.as_mut() {
            self.game.reconcile(challenge);
        }
        self.phase = Phase::Active { reconciling: false };
        Ok(())
    }

    fn invalid(&self, op: &'static str) -> GameError {
        GameError::InvalidState {
            op,
            phase: self.phase,
        }
    }

    pub fn snapshot(&self) -> Snapshot<'_, G::Challenge, G::Feedback> {
        Snapshot {
            phase: self.phase,
            score: self.state.score,
            attempts: self.state.attempts,
            correct: self.state.correct,
            streak: self.state.streak,
            max_streak: self.state.max_streak,
            round: self.state.round,
            total_rounds: self.state.total_rounds,
            elapsed: self.state.elapsed,
            challenge: self.state.challenge.as_ref(),
            last_outcome: self.last_outcome.as_ref(),
            summary: self.summary.as_ref(),
            reveal_delay: self.game.policy().reveal_delay,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn challenge(&self) -> Option<&G::Challenge> {
        self.state.challenge.as_ref()
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn attempts(&self) -> u32 {
        self.state.attempts
    }

    pub fn streak(&self) -> u32 {
        self.state.streak
    }

    pub fn max_streak(&self) -> u32 {
        self.state.max_streak
    }

    pub fn elapsed(&self) -> Duration {
        self.state.elapsed
    }

    pub fn last_outcome(&self) -> Option<&Outcome<G::Feedback>> {
        self.last_outcome.as_ref()
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn config(&self) -> &SessionConfig<G::Params> {
        &self.config
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    /// Stored best for one of this game's declared records
    pub fn best(&self, metric: Metric) -> Result<Option<u32>> {
        let policy = self.game.policy();
        match policy.records.iter().find(|spec| spec.metric == metric) {
            Some(spec) => self.records.best(policy.id, spec),
            None => Ok(None),
        }
    }

    pub fn clear_records(&mut self) -> Result<()> {
        let policy = self.game.policy();
        self.records.clear(policy.id, policy.records)
    }

    pub fn reveal_delay(&self) -> Option<Duration> {
        self.game.policy().reveal_delay
    }
}
