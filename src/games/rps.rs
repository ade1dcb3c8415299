use crate::error::InputError;
use crate::games::GameId;
use crate::policy::{Game, GamePolicy, Outcome, RoundPlan, ScoringRule, SessionConfig};
use crate::random::RandomSource;
use crate::records::{Metric, RecordSpec};

pub static POLICY: GamePolicy = GamePolicy {
    id: GameId::RockPaperScissors,
    name: "Rock Paper Scissors",
    description: "Beat the computer as many times as you can",
    rounds: RoundPlan::Fixed {
        default: 5,
        advance_on_miss: true,
    },
    scoring: ScoringRule::Count,
    records: &[
        RecordSpec::higher("BestScore", Metric::Score),
        RecordSpec::higher("BestStreak", Metric::MaxStreak),
    ],
    reveal_delay: None,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Choice {
    Rock,
    Paper,
    Scissors,
}

impl Choice {
    pub const ALL: [Choice; 3] = [Choice::Rock, Choice::Paper, Choice::Scissors];

    pub fn beats(&self) -> Choice {
        match self {
            Choice::Rock => Choice::Scissors,
            Choice::Paper => Choice::Rock,
            Choice::Scissors => Choice::Paper,
        }
    }

    pub fn against(&self, other: Choice) -> Verdict {
        if *self == other {
            Verdict::Tie
        } else if self.beats() == other {
            Verdict::Win
        } else {
            Verdict::Loss
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Verdict {
    Win,
    Tie,
    Loss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundResult {
    pub computer: Choice,
    pub verdict: Verdict,
}

/// The computer's hand, fixed when the round starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throw {
    computer: Choice,
    revealed: bool,
}

impl Throw {
    pub fn new(computer: Choice) -> Self {
        Self {
            computer,
            revealed: false,
        }
    }

    /// Hidden until the player has thrown
    pub fn computer(&self) -> Option<Choice> {
        self.revealed.then_some(self.computer)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RockPaperScissors;

impl Game for RockPaperScissors {
    type Params = ();
    type Challenge = Throw;
    type Answer = Choice;
    type Feedback = RoundResult;

    fn policy(&self) -> &'static GamePolicy {
        &POLICY
    }

    fn generate(&self, _config: &SessionConfig<()>, rng: &mut dyn RandomSource) -> Throw {
        Throw::new(Choice::ALL[rng.below(3) as usize])
    }

    fn evaluate(
        &self,
        _config: &SessionConfig<()>,
        throw: &mut Throw,
        player: &Choice,
    ) -> Outcome<RoundResult> {
        throw.revealed = true;
        match player.against(throw.computer) {
            Verdict::Win => Outcome::Correct,
            verdict => Outcome::Incorrect(Some(RoundResult {
                computer: throw.computer,
                verdict,
            })),
        }
    }
}

/// Accepts the full name or its first letter, any case
pub fn parse_choice(input: &str) -> Result<Choice, InputError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(InputError::Empty);
    }
    match input.to_ascii_lowercase().as_str() {
        "r" | "rock" => Ok(Choice::Rock),
        "p" | "paper" => Ok(Choice::Paper),
        "s" | "scissors" => Ok(Choice::Scissors),
        _ => Err(InputError::UnknownChoice(input.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedSource;

    #[test]
    fn each_choice_beats_exactly_one() {
        assert_eq!(Choice::Rock.against(Choice::Scissors), Verdict::Win);
        assert_eq!(Choice::Paper.against(Choice::Rock), Verdict::Win);
        assert_eq!(Choice::Scissors.against(Choice::Paper), Verdict::Win);
        assert_eq!(Choice::Paper.against(Choice::Scissors), Verdict::Loss);
        for c in Choice::ALL {
            assert_eq!(c.against(c), Verdict::Tie);
            assert_eq!(c.beats().against(c), Verdict::Loss);
        }
    }

    #[test]
    fn computer_hand_is_hidden_until_thrown() {
        let config = SessionConfig::default();
        let mut throw = RockPaperScissors.generate(&config, &mut ScriptedSource::new(vec![0.5]));
        assert_eq!(throw.computer(), None);
        assert_eq!(
            RockPaperScissors.evaluate(&config, &mut throw, &Choice::Scissors),
            Outcome::Correct
        );
        assert_eq!(throw.computer(), Some(Choice::Paper));
    }

    #[test]
    fn ties_and_losses_are_misses() {
        let config = SessionConfig::default();
        let mut throw = Throw::new(Choice::Rock);
        assert_eq!(
            RockPaperScissors.evaluate(&config, &mut throw, &Choice::Rock),
            Outcome::Incorrect(Some(RoundResult {
                computer: Choice::Rock,
                verdict: Verdict::Tie
            }))
        );
        assert_eq!(
            RockPaperScissors.evaluate(&config, &mut throw, &Choice::Scissors),
            Outcome::Incorrect(Some(RoundResult {
                computer: Choice::Rock,
                verdict: Verdict::Loss
            }))
        );
        assert_eq!(
            RockPaperScissors.evaluate(&config, &mut throw, &Choice::Paper),
            Outcome::Correct
        );
    }

    #[test]
    fn parse_choice_forms() {
        assert_eq!(parse_choice("Rock"), Ok(Choice::Rock));
        assert_eq!(parse_choice(" s "), Ok(Choice::Scissors));
        assert_eq!(parse_choice(""), Err(InputError::Empty));
        assert_eq!(
            parse_choice("lizard"),
            Err(InputError::UnknownChoice("lizard".into()))
        );
    }
}
