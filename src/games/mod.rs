pub mod color_mixer;
pub mod math_quiz;
pub mod memory;
pub mod number_guess;
pub mod palindrome;
pub mod rps;
pub mod tic_tac_toe;
pub mod typing;

use serde::{Deserialize, Serialize};

use crate::policy::GamePolicy;

pub use color_mixer::ColorMixer;
pub use math_quiz::MathQuiz;
pub use memory::MemoryMatch;
pub use number_guess::NumberGuess;
pub use palindrome::PalindromeHunt;
pub use rps::RockPaperScissors;
pub use tic_tac_toe::TicTacToe;
pub use typing::TypingTest;

/// Identifies a game; its display form prefixes the game's record keys
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum GameId {
    NumberGame,
    ColorMixer,
    MathQuiz,
    Typing,
    MemoryGame,
    Palindrome,
    RockPaperScissors,
    TicTacToe,
}

/// Every playable game, in menu order
pub fn catalog() -> [&'static GamePolicy; 8] {
    [
        &number_guess::POLICY,
        &color_mixer::POLICY,
        &math_quiz::POLICY,
        &typing::POLICY,
        &memory::POLICY,
        &palindrome::POLICY,
        &rps::POLICY,
        &tic_tac_toe::POLICY,
    ]
}

pub fn policy_for(id: GameId) -> &'static GamePolicy {
    match id {
        GameId::NumberGame => &number_guess::POLICY,
        GameId::ColorMixer => &color_mixer::POLICY,
        GameId::MathQuiz => &math_quiz::POLICY,
        GameId::Typing => &typing::POLICY,
        GameId::MemoryGame => &memory::POLICY,
        GameId::Palindrome => &palindrome::POLICY,
        GameId::RockPaperScissors => &rps::POLICY,
        GameId::TicTacToe => &tic_tac_toe::POLICY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_ids_are_unique_and_consistent() {
        let ids: HashSet<GameId> = catalog().iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), catalog().len());
        for policy in catalog() {
            assert_eq!(policy_for(policy.id).id, policy.id);
            assert!(!policy.records.is_empty());
        }
    }

    #[test]
    fn ids_render_as_store_prefixes() {
        assert_eq!(GameId::NumberGame.to_string(), "numberGame");
        assert_eq!(GameId::MemoryGame.to_string(), "memoryGame");
        assert_eq!(GameId::RockPaperScissors.to_string(), "rockPaperScissors");
        assert_eq!(GameId::TicTacToe.to_string(), "ticTacToe");
    }
}
