use crate::error::InputError;
use crate::games::GameId;
use crate::policy::{Game, GamePolicy, Outcome, RoundPlan, ScoringRule, SessionConfig};
use crate::random::RandomSource;
use crate::records::{Metric, RecordSpec};

pub const MIN: u32 = 1;
pub const MAX: u32 = 100;

pub static POLICY: GamePolicy = GamePolicy {
    id: GameId::NumberGame,
    name: "Number Guessing",
    description: "Find the hidden number between 1 and 100 in as few guesses as possible",
    rounds: RoundPlan::Single,
    scoring: ScoringRule::Unscored,
    records: &[RecordSpec::lower("BestScore", Metric::Attempts)],
    reveal_delay: None,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    TooLow,
    TooHigh,
}

/// How close a miss was
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, strum_macros::Display)]
pub enum Band {
    #[strum(serialize = "Very Hot")]
    VeryHot,
    Hot,
    Warm,
    Cold,
    #[strum(serialize = "Very Cold")]
    VeryCold,
}

impl Band {
    pub fn from_distance(distance: u32) -> Self {
        match distance {
            0..=5 => Band::VeryHot,
            6..=10 => Band::Hot,
            11..=20 => Band::Warm,
            21..=40 => Band::Cold,
            _ => Band::VeryCold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hint {
    pub direction: Direction,
    pub band: Band,
}

/// The hidden number; only the guesses are visible
#[derive(Debug, Clone)]
pub struct HiddenNumber {
    target: u32,
    guesses: Vec<u32>,
}

impl HiddenNumber {
    pub fn guesses(&self) -> &[u32] {
        &self.guesses
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NumberGuess;

impl Game for NumberGuess {
    type Params = ();
    type Challenge = HiddenNumber;
    type Answer = u32;
    type Feedback = Hint;

    fn policy(&self) -> &'static GamePolicy {
        &POLICY
    }

    fn generate(&self, _config: &SessionConfig<()>, rng: &mut dyn RandomSource) -> HiddenNumber {
        HiddenNumber {
            target: rng.between(MIN, MAX),
            guesses: Vec::new(),
        }
    }

    fn evaluate(
        &self,
        _config: &SessionConfig<()>,
        challenge: &mut HiddenNumber,
        guess: &u32,
    ) -> Outcome<Hint> {
        let guess = *guess;
        challenge.guesses.push(guess);
        if guess == challenge.target {
            return Outcome::Correct;
        }
        let direction = if guess > challenge.target {
            Direction::TooHigh
        } else {
            Direction::TooLow
        };
        Outcome::Incorrect(Some(Hint {
            direction,
            band: Band::from_distance(guess.abs_diff(challenge.target)),
        }))
    }
}

/// Validate a typed guess before it reaches the engine
pub fn parse_guess(input: &str) -> Result<u32, InputError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(InputError::Empty);
    }
    let value: i64 = input
        .parse()
        .map_err(|_| InputError::NotANumber(input.to_string()))?;
    if !(MIN as i64..=MAX as i64).contains(&value) {
        return Err(InputError::OutOfRange {
            min: MIN as i64,
            max: MAX as i64,
        });
    }
    Ok(value as u32)
}
