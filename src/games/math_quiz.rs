use std::fmt;

use serde::{Deserialize, Serialize};

use crate::difficulty::{Difficulty, Tiered};
use crate::error::InputError;
use crate::games::GameId;
use crate::policy::{Game, GamePolicy, Outcome, RoundPlan, ScoringRule, SessionConfig};
use crate::random::RandomSource;
use crate::records::{Metric, RecordSpec};

/// Answers within this distance of the expected value count as correct
pub const EPSILON: f64 = 1e-2;

pub static POLICY: GamePolicy = GamePolicy {
    id: GameId::MathQuiz,
    name: "Math Quiz",
    description: "Answer a run of arithmetic questions; every answer moves on",
    rounds: RoundPlan::Fixed {
        default: 10,
        advance_on_miss: true,
    },
    scoring: ScoringRule::Count,
    records: &[
        RecordSpec::higher("BestScore", Metric::Score),
        RecordSpec::higher("BestAccuracy", Metric::Accuracy),
    ],
    reveal_delay: None,
};

/// Inclusive operand range per tier
const OPERANDS: Tiered<(u32, u32)> = Tiered::new((1, 20), (10, 59), (50, 149));

/// Divisor and quotient ceiling for whole-number division
const WHOLE_DIVISION: Tiered<Option<u32>> = Tiered::new(Some(10), Some(15), None);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    const ALL: [Operation; 4] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
    ];

    pub fn symbol(&self) -> char {
        match self {
            Operation::Add => '+',
            Operation::Subtract => '-',
            Operation::Multiply => '×',
            Operation::Divide => '÷',
        }
    }

    fn apply(&self, a: u32, b: u32) -> f64 {
        let (a, b) = (a as f64, b as f64);
        match self {
            Operation::Add => a + b,
            Operation::Subtract => a - b,
            Operation::Multiply => a * b,
            Operation::Divide => a / b,
        }
    }
}

/// Which operations a quiz draws from
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
pub enum QuestionKind {
    #[default]
    Mixed,
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

impl QuestionKind {
    fn pick(&self, rng: &mut dyn RandomSource) -> Operation {
        match self {
            QuestionKind::Mixed => Operation::ALL[rng.below(4) as usize],
            QuestionKind::Addition => Operation::Add,
            QuestionKind::Subtraction => Operation::Subtract,
            QuestionKind::Multiplication => Operation::Multiply,
            QuestionKind::Division => Operation::Divide,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub left: u32,
    pub right: u32,
    pub operation: Operation,
    expected: f64,
}

impl Question {
    pub fn new(left: u32, right: u32, operation: Operation) -> Self {
        Self {
            left,
            right,
            operation,
            expected: operation.apply(left, right),
        }
    }

    pub fn accepts(&self, answer: f64) -> bool {
        (answer - self.expected).abs() < EPSILON
    }

    pub fn expected(&self) -> f64 {
        self.expected
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} = ?",
            self.left,
            self.operation.symbol(),
            self.right
        )
    }
}

/// The correct answer, shown after a miss
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Expected(pub f64);

#[derive(Debug, Clone, Copy, Default)]
pub struct MathQuiz;

impl MathQuiz {
    fn question(difficulty: Difficulty, kind: QuestionKind, rng: &mut dyn RandomSource) -> Question {
        let (lo, hi) = OPERANDS.get(difficulty);
        let mut left = rng.between(lo, hi);
        let mut right = rng.between(lo, hi);
        let operation = kind.pick(rng);

        if operation == Operation::Divide {
            if let Some(ceiling) = WHOLE_DIVISION.get(difficulty) {
                right = rng.between(1, ceiling);
                left = right * rng.between(1, ceiling);
            }
        }
        Question::new(left, right, operation)
    }
}

impl Game for MathQuiz {
    type Params = QuestionKind;
    type Challenge = Question;
    type Answer = f64;
    type Feedback = Expected;

    fn policy(&self) -> &'static GamePolicy {
        &POLICY
    }

    fn generate(
        &self,
        config: &SessionConfig<QuestionKind>,
        rng: &mut dyn RandomSource,
    ) -> Question {
        Self::question(config.difficulty, config.params, rng)
    }

    fn evaluate(
        &self,
        _config: &SessionConfig<QuestionKind>,
        question: &mut Question,
        answer: &f64,
    ) -> Outcome<Expected> {
        if question.accepts(*answer) {
            Outcome::Correct
        } else {
            Outcome::Incorrect(Some(Expected(question.expected)))
        }
    }

    fn mode_label(&self, kind: &QuestionKind) -> Option<String> {
        Some(kind.to_string())
    }
}

pub fn parse_answer(input: &str) -> Result<f64, InputError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(InputError::Empty);
    }
    match input.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(InputError::NotANumber(input.to_string())),
    }
}
