use std::time::Duration;

use crate::difficulty::Tiered;
use crate::error::InputError;
use crate::games::GameId;
use crate::policy::{Game, GamePolicy, Outcome, RoundPlan, ScoringRule, SessionConfig};
use crate::random::{shuffle, RandomSource};
use crate::records::{Metric, RecordSpec};

/// How long a mismatched pair stays face up
pub const REVEAL_DELAY: Duration = Duration::from_millis(1000);

pub static POLICY: GamePolicy = GamePolicy {
    id: GameId::MemoryGame,
    name: "Memory Match",
    description: "Flip cards two at a time and clear the board in as few moves as possible",
    rounds: RoundPlan::Single,
    scoring: ScoringRule::Count,
    records: &[RecordSpec::lower("BestScore", Metric::Attempts)],
    reveal_delay: Some(REVEAL_DELAY),
};

pub const PAIRS: Tiered<usize> = Tiered::new(6, 8, 10);

/// Grid shape (columns, rows) used to lay the board out
pub const GRID: Tiered<(usize, usize)> = Tiered::new((4, 3), (4, 4), (5, 4));

const SYMBOLS: [char; 10] = ['🐍', '🦊', '🐸', '🐼', '🐨', '🦁', '🐯', '🐮', '🐷', '🦄'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Down,
    Up,
    Matched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    pub symbol: char,
    pub face: Face,
}

/// Two positions flipped in one move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flip(pub usize, pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryFeedback {
    /// Shown until the host resolves the reveal window
    Mismatch { first: char, second: char },
}

#[derive(Debug, Clone)]
pub struct Board {
    cards: Vec<Card>,
    columns: usize,
}

impl Board {
    pub fn from_symbols(symbols: &[char], columns: usize) -> Self {
        Self {
            cards: symbols
                .iter()
                .map(|&symbol| Card {
                    symbol,
                    face: Face::Down,
                })
                .collect(),
            columns,
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// What the player may see: symbols of face-up and matched cards only
    pub fn visible(&self) -> Vec<Option<char>> {
        self.cards
            .iter()
            .map(|c| match c.face {
                Face::Down => None,
                Face::Up | Face::Matched => Some(c.symbol),
            })
            .collect()
    }

    pub fn face(&self, idx: usize) -> Option<Face> {
        self.cards.get(idx).map(|c| c.face)
    }

    pub fn can_pick(&self, idx: usize) -> bool {
        self.face(idx) == Some(Face::Down)
    }

    /// Two different face-down cards
    pub fn accepts(&self, Flip(a, b): Flip) -> bool {
        a != b && self.can_pick(a) && self.can_pick(b)
    }

    pub fn matched_pairs(&self) -> usize {
        self.cards.iter().filter(|c| c.face == Face::Matched).count() / 2
    }

    pub fn is_cleared(&self) -> bool {
        self.cards.iter().all(|c| c.face == Face::Matched)
    }

    /// Callers check `accepts` first; a flip it refuses changes nothing.
    fn flip(&mut self, flip: Flip) -> Outcome<MemoryFeedback> {
        if !self.accepts(flip) {
            return Outcome::Incorrect(None);
        }
        let Flip(a, b) = flip;
        let (first, second) = (self.cards[a].symbol, self.cards[b].symbol);
        if first == second {
            self.cards[a].face = Face::Matched;
            self.cards[b].face = Face::Matched;
            return Outcome::Correct;
        }
        self.cards[a].face = Face::Up;
        self.cards[b].face = Face::Up;
        Outcome::Incorrect(Some(MemoryFeedback::Mismatch { first, second }))
    }

    fn hide_unmatched(&mut self) {
        for card in &mut self.cards {
            if card.face == Face::Up {
                card.face = Face::Down;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryMatch;

impl Game for MemoryMatch {
    type Params = ();
    type Challenge = Board;
    type Answer = Flip;
    type Feedback = MemoryFeedback;

    fn policy(&self) -> &'static GamePolicy {
        &POLICY
    }

    fn generate(&self, config: &SessionConfig<()>, rng: &mut dyn RandomSource) -> Board {
        let pairs = PAIRS.get(config.difficulty).min(SYMBOLS.len());
        let mut symbols: Vec<char> = SYMBOLS[..pairs]
            .iter()
            .chain(SYMBOLS[..pairs].iter())
            .copied()
            .collect();
        shuffle(rng, &mut symbols);
        Board::from_symbols(&symbols, GRID.get(config.difficulty).0)
    }

    fn evaluate(
        &self,
        _config: &SessionConfig<()>,
        board: &mut Board,
        flip: &Flip,
    ) -> Outcome<MemoryFeedback> {
        board.flip(*flip)
    }

    fn accepts(&self, board: &Board, flip: &Flip) -> bool {
        board.accepts(*flip)
    }

    fn is_solved(&self, board: &Board) -> bool {
        board.is_cleared()
    }

    fn reconcile(&self, board: &mut Board) {
        board.hide_unmatched();
    }
}

/// Parse two 1-based card positions ("3 7" or "3,7") against the board
pub fn parse_flip(input: &str, board: &Board) -> Result<Flip, InputError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(InputError::Empty);
    }
    let bad = InputError::BadPick { cards: board.len() };
    let picks: Vec<usize> = input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<usize>())
        .collect::<Result<_, _>>()
        .map_err(|_| bad.clone())?;

    match picks.as_slice() {
        [a, b] if *a >= 1 && *b >= 1 => {
            let flip = Flip(a - 1, b - 1);
            if board.accepts(flip) {
                Ok(flip)
            } else {
                Err(bad)
            }
        }
        _ => Err(bad),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::Difficulty;
    use crate::random::ScriptedSource;

    fn board() -> Board {
        Board::from_symbols(&['A', 'B', 'A', 'B'], 2)
    }

    #[test]
    fn board_sizes_per_tier() {
        for (difficulty, pairs) in [
            (Difficulty::Easy, 6),
            (Difficulty::Medium, 8),
            (Difficulty::Hard, 10),
        ] {
            let config = SessionConfig::new(difficulty);
            let b = MemoryMatch.generate(&config, &mut ScriptedSource::new(vec![0.3, 0.8]));
            assert_eq!(b.len(), pairs * 2);
            assert!(b.visible().iter().all(Option::is_none));
            let mut symbols: Vec<char> = b.cards.iter().map(|c| c.symbol).collect();
            symbols.sort();
            symbols.dedup();
            assert_eq!(symbols.len(), pairs);
        }
    }

    #[test]
    fn match_marks_cards() {
        let mut b = board();
        assert_eq!(b.flip(Flip(0, 2)), Outcome::Correct);
        assert_eq!(b.matched_pairs(), 1);
        assert!(!b.is_cleared());
        assert_eq!(b.visible(), vec![Some('A'), None, Some('A'), None]);
    }

    #[test]
    fn mismatch_stays_up_until_hidden() {
        let mut b = board();
        assert_eq!(
            b.flip(Flip(0, 1)),
            Outcome::Incorrect(Some(MemoryFeedback::Mismatch {
                first: 'A',
                second: 'B'
            }))
        );
        assert_eq!(b.face(0), Some(Face::Up));
        b.hide_unmatched();
        assert_eq!(b.face(0), Some(Face::Down));
    }

    #[test]
    fn refused_flips_leave_the_board_alone() {
        let mut b = board();
        assert!(!b.accepts(Flip(1, 1)));
        assert!(!b.accepts(Flip(0, 9)));
        assert_eq!(b.flip(Flip(1, 1)), Outcome::Incorrect(None));
        assert_eq!(b.face(1), Some(Face::Down));

        b.flip(Flip(0, 2));
        assert!(!b.accepts(Flip(0, 1)));
        assert_eq!(b.flip(Flip(0, 1)), Outcome::Incorrect(None));
        assert_eq!(b.face(1), Some(Face::Down));
    }

    #[test]
    fn parse_flip_is_one_based() {
        let b = board();
        assert_eq!(parse_flip("1 3", &b), Ok(Flip(0, 2)));
        assert_eq!(parse_flip("2,4", &b), Ok(Flip(1, 3)));
        assert_eq!(parse_flip("1 1", &b), Err(InputError::BadPick { cards: 4 }));
        assert_eq!(parse_flip("0 1", &b), Err(InputError::BadPick { cards: 4 }));
        assert_eq!(parse_flip("1 5", &b), Err(InputError::BadPick { cards: 4 }));
        assert_eq!(parse_flip("x y", &b), Err(InputError::BadPick { cards: 4 }));
        assert_eq!(parse_flip("", &b), Err(InputError::Empty));
    }
}
