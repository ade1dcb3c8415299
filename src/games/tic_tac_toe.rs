use crate::difficulty::Tiered;
use crate::error::InputError;
use crate::games::GameId;
use crate::policy::{Game, GamePolicy, Outcome, RoundPlan, ScoringRule, SessionConfig};
use crate::random::{shuffle, RandomSource};
use crate::records::{Metric, RecordSpec};

pub static POLICY: GamePolicy = GamePolicy {
    id: GameId::TicTacToe,
    name: "Tic Tac Toe",
    description: "Get three in a row before the computer does",
    rounds: RoundPlan::Single,
    scoring: ScoringRule::Count,
    records: &[RecordSpec::lower("FewestMoves", Metric::Attempts)],
    reveal_delay: None,
};

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Mark {
    X,
    O,
}

/// How the computer picks its reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opponent {
    /// Any free square
    Random,
    /// Full-depth minimax; never loses
    Minimax,
}

pub const OPPONENT: Tiered<Opponent> =
    Tiered::new(Opponent::Random, Opponent::Minimax, Opponent::Minimax);

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Finish {
    #[strum(serialize = "You win")]
    PlayerWon,
    #[strum(serialize = "The computer wins")]
    ComputerWon,
    #[strum(serialize = "It's a draw")]
    Draw,
}

/// What happened after the player's move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reply {
    /// Square the computer took, if the game was still open
    pub computer: Option<usize>,
    pub finish: Option<Finish>,
}

type Cells = [Option<Mark>; 9];

/// The player is X and always moves first
#[derive(Debug, Clone)]
pub struct Grid {
    cells: Cells,
    opponent: Opponent,
    /// Random opponent takes the first free square in this order
    preference: [usize; 9],
    finish: Option<Finish>,
}

impl Grid {
    pub fn new(opponent: Opponent, preference: [usize; 9]) -> Self {
        Self {
            cells: [None; 9],
            opponent,
            preference,
            finish: None,
        }
    }

    pub fn cells(&self) -> &[Option<Mark>; 9] {
        &self.cells
    }

    pub fn finish(&self) -> Option<Finish> {
        self.finish
    }

    pub fn is_free(&self, idx: usize) -> bool {
        self.finish.is_none() && matches!(self.cells.get(idx), Some(None))
    }

    fn play(&mut self, idx: usize) -> Outcome<Reply> {
        if !self.is_free(idx) {
            return Outcome::Incorrect(None);
        }
        self.cells[idx] = Some(Mark::X);
        if winner(&self.cells) == Some(Mark::X) {
            self.finish = Some(Finish::PlayerWon);
            return Outcome::Correct;
        }

        let computer = if is_full(&self.cells) {
            None
        } else {
            self.reply()
        };
        if let Some(idx) = computer {
            self.cells[idx] = Some(Mark::O);
        }

        self.finish = if winner(&self.cells) == Some(Mark::O) {
            Some(Finish::ComputerWon)
        } else if is_full(&self.cells) {
            Some(Finish::Draw)
        } else {
            None
        };
        Outcome::Incorrect(Some(Reply {
            computer,
            finish: self.finish,
        }))
    }

    fn reply(&self) -> Option<usize> {
        match self.opponent {
            Opponent::Random => self
                .preference
                .iter()
                .copied()
                .find(|&i| self.cells[i].is_none()),
            Opponent::Minimax => best_move(&self.cells),
        }
    }
}

fn winner(cells: &Cells) -> Option<Mark> {
    LINES.iter().find_map(|&[a, b, c]| match cells[a] {
        Some(mark) if cells[b] == Some(mark) && cells[c] == Some(mark) => Some(mark),
        _ => None,
    })
}

fn is_full(cells: &Cells) -> bool {
    cells.iter().all(Option::is_some)
}

/// Lowest free square with the best minimax value for O
fn best_move(cells: &Cells) -> Option<usize> {
    let mut board = *cells;
    let mut best: Option<(usize, i32)> = None;
    for idx in 0..9 {
        if board[idx].is_some() {
            continue;
        }
        board[idx] = Some(Mark::O);
        let value = minimax(&mut board, 0, false);
        board[idx] = None;
        if best.map_or(true, |(_, v)| value > v) {
            best = Some((idx, value));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Quicker wins and slower losses score better for O
fn minimax(board: &mut Cells, depth: i32, maximizing: bool) -> i32 {
    match winner(board) {
        Some(Mark::O) => return 10 - depth,
        Some(Mark::X) => return depth - 10,
        None if is_full(board) => return 0,
        None => {}
    }

    let mark = if maximizing { Mark::O } else { Mark::X };
    let mut best = if maximizing { i32::MIN } else { i32::MAX };
    for idx in 0..9 {
        if board[idx].is_some() {
            continue;
        }
        board[idx] = Some(mark);
        let value = minimax(board, depth + 1, !maximizing);
        board[idx] = None;
        best = if maximizing {
            best.max(value)
        } else {
            best.min(value)
        };
    }
    best
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TicTacToe;

impl Game for TicTacToe {
    type Params = ();
    type Challenge = Grid;
    type Answer = usize;
    type Feedback = Reply;

    fn policy(&self) -> &'static GamePolicy {
        &POLICY
    }

    fn generate(&self, config: &SessionConfig<()>, rng: &mut dyn RandomSource) -> Grid {
        let mut preference = [0, 1, 2, 3, 4, 5, 6, 7, 8];
        shuffle(rng, &mut preference);
        Grid::new(OPPONENT.get(config.difficulty), preference)
    }

    fn evaluate(
        &self,
        _config: &SessionConfig<()>,
        grid: &mut Grid,
        square: &usize,
    ) -> Outcome<Reply> {
        grid.play(*square)
    }

    fn accepts(&self, grid: &Grid, square: &usize) -> bool {
        grid.is_free(*square)
    }

    fn is_solved(&self, grid: &Grid) -> bool {
        grid.finish == Some(Finish::PlayerWon)
    }

    fn is_over(&self, grid: &Grid) -> bool {
        matches!(grid.finish, Some(Finish::ComputerWon | Finish::Draw))
    }
}

/// A free square numbered 1-9, left to right and top to bottom
pub fn parse_square(input: &str, grid: &Grid) -> Result<usize, InputError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(InputError::Empty);
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=9).contains(&n) && grid.is_free(n - 1) => Ok(n - 1),
        _ => Err(InputError::BadSquare),
    }
}
