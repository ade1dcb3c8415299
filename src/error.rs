use thiserror::Error;

use crate::games::GameId;
use crate::session::Phase;

/// Errors surfaced by the session engine and its persistence collaborators
#[derive(Error, Debug)]
pub enum GameError {
    #[error("cannot {op} while the session is {phase}")]
    InvalidState { op: &'static str, phase: Phase },

    #[error("{game} does not accept that move right now")]
    IllegalMove { game: GameId },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("history log error: {0}")]
    Csv(#[from] csv::Error),

    #[error("passage library is unusable: {0}")]
    Passages(String),
}

pub type Result<T> = std::result::Result<T, GameError>;

/// Rejections raised while turning raw user text into an answer.
///
/// These never reach the engine; the host shows the message inline and asks again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Please enter something first!")]
    Empty,

    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("Please enter a valid number between {min} and {max}!")]
    OutOfRange { min: i64, max: i64 },

    #[error("'{0}' is not one of rock, paper or scissors")]
    UnknownChoice(String),

    #[error("Pick two different face-down cards between 1 and {cards}")]
    BadPick { cards: usize },

    #[error("Pick a free square between 1 and 9")]
    BadSquare,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_state_mentions_operation_and_phase() {
        let err = GameError::InvalidState {
            op: "submit",
            phase: Phase::Idle,
        };
        assert_eq!(err.to_string(), "cannot submit while the session is idle");
    }

    #[test]
    fn out_of_range_message() {
        let err = InputError::OutOfRange { min: 1, max: 100 };
        assert_eq!(
            err.to_string(),
            "Please enter a valid number between 1 and 100!"
        );
    }
}
