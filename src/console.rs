// Line-oriented terminal front end: a `TextFrontend` impl per game and a
// generic loop that plays one session over a reader/writer pair.

use std::borrow::Borrow;
use std::io::{BufRead, Write};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::style::{Color, Stylize};
use itertools::Itertools;

use crate::error::{self, GameError, InputError};
use crate::games::color_mixer::{self, Channel, ColorHint, ColorTarget, Nudge, Rgb};
use crate::games::math_quiz::{self, Expected, Question};
use crate::games::memory::{self, Board, Flip, MemoryFeedback};
use crate::games::number_guess::{self, Direction, HiddenNumber, Hint};
use crate::games::palindrome::{Mirror, Prompt};
use crate::games::rps::{self, Choice, RoundResult, Throw};
use crate::games::tic_tac_toe::{self, Grid, Reply};
use crate::games::typing::{Incomplete, Passage};
use crate::games::{
    ColorMixer, MathQuiz, MemoryMatch, NumberGuess, PalindromeHunt, RockPaperScissors, TicTacToe,
    TypingTest,
};
use crate::history::{HistoryEntry, SessionSummary};
use crate::policy::{Game, Outcome, SessionConfig};
use crate::records::RecordUpdate;
use crate::session::{GameSession, Phase, Snapshot};

/// Typing this instead of an answer abandons the session
pub const QUIT: &str = "quit";

pub trait TextFrontend: Game {
    /// Owned form of a parsed answer
    type Input: Borrow<Self::Answer>;

    /// The challenge as the player should see it
    fn show(&self, challenge: &Self::Challenge) -> String;

    /// What to type at the prompt
    fn instructions(&self) -> &'static str;

    fn parse(&self, line: &str, challenge: &Self::Challenge) -> Result<Self::Input, InputError>;

    fn describe(&self, feedback: &Self::Feedback) -> String;
}

impl TextFrontend for NumberGuess {
    type Input = u32;

    fn show(&self, challenge: &HiddenNumber) -> String {
        if challenge.guesses().is_empty() {
            return "I'm thinking of a number...".to_string();
        }
        format!("Guesses so far: {}", challenge.guesses().iter().join(", "))
    }

    fn instructions(&self) -> &'static str {
        "Guess a number between 1 and 100"
    }

    fn parse(&self, line: &str, _challenge: &HiddenNumber) -> Result<u32, InputError> {
        number_guess::parse_guess(line)
    }

    fn describe(&self, hint: &Hint) -> String {
        let direction = match hint.direction {
            Direction::TooLow => "Too low",
            Direction::TooHigh => "Too high",
        };
        format!("{direction}! ({})", hint.band)
    }
}

impl TextFrontend for ColorMixer {
    type Input = Rgb;

    fn show(&self, challenge: &ColorTarget) -> String {
        format!(
            "Target {}  tolerance ±{}",
            swatch(challenge.target),
            challenge.tolerance
        )
    }

    fn instructions(&self) -> &'static str {
        "Enter red green blue (0-255 each)"
    }

    fn parse(&self, line: &str, _challenge: &ColorTarget) -> Result<Rgb, InputError> {
        color_mixer::parse_rgb(line)
    }

    fn describe(&self, hint: &ColorHint) -> String {
        color_hint(hint)
    }
}

impl TextFrontend for MathQuiz {
    type Input = f64;

    fn show(&self, question: &Question) -> String {
        question.to_string()
    }

    fn instructions(&self) -> &'static str {
        "Answer to two decimal places where needed"
    }

    fn parse(&self, line: &str, _question: &Question) -> Result<f64, InputError> {
        math_quiz::parse_answer(line)
    }

    fn describe(&self, Expected(answer): &Expected) -> String {
        format!("Not quite, the answer was {}", format_number(*answer))
    }
}

impl TextFrontend for TypingTest {
    type Input = String;

    fn show(&self, passage: &Passage) -> String {
        passage.text().to_string()
    }

    fn instructions(&self) -> &'static str {
        "Type the passage exactly and press enter"
    }

    fn parse(&self, line: &str, _passage: &Passage) -> Result<String, InputError> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            return Err(InputError::Empty);
        }
        Ok(line.to_string())
    }

    fn describe(&self, incomplete: &Incomplete) -> String {
        let mut msg = format!("{} characters still to type", incomplete.remaining);
        if let Some(pos) = incomplete.first_error {
            msg.push_str(&format!(", first mistake at character {}", pos + 1));
        }
        msg
    }
}

impl TextFrontend for MemoryMatch {
    type Input = Flip;

    fn show(&self, board: &Board) -> String {
        board_rows(board).join("\n")
    }

    fn instructions(&self) -> &'static str {
        "Pick two face-down cards, e.g. 3 7"
    }

    fn parse(&self, line: &str, board: &Board) -> Result<Flip, InputError> {
        memory::parse_flip(line, board)
    }

    fn describe(&self, feedback: &MemoryFeedback) -> String {
        let MemoryFeedback::Mismatch { first, second } = feedback;
        format!("{first} and {second} don't match")
    }
}

impl TextFrontend for PalindromeHunt {
    type Input = String;

    fn show(&self, prompt: &Prompt) -> String {
        format!("Try something like \"{}\"", prompt.suggestion)
    }

    fn instructions(&self) -> &'static str {
        "Enter a word or phrase"
    }

    fn parse(&self, line: &str, _prompt: &Prompt) -> Result<String, InputError> {
        if line.trim().is_empty() {
            return Err(InputError::Empty);
        }
        Ok(line.to_string())
    }

    fn describe(&self, mirror: &Mirror) -> String {
        format!(
            "Nope, \"{}\" backwards is \"{}\"",
            mirror.forward, mirror.backward
        )
    }
}

impl TextFrontend for RockPaperScissors {
    type Input = Choice;

    fn show(&self, _throw: &Throw) -> String {
        "The computer has chosen.".to_string()
    }

    fn instructions(&self) -> &'static str {
        "rock, paper or scissors?"
    }

    fn parse(&self, line: &str, _throw: &Throw) -> Result<Choice, InputError> {
        rps::parse_choice(line)
    }

    fn describe(&self, result: &RoundResult) -> String {
        format!("Computer threw {}: {}", result.computer, result.verdict)
    }
}

impl TextFrontend for TicTacToe {
    type Input = usize;

    fn show(&self, grid: &Grid) -> String {
        grid_rows(grid).join("\n")
    }

    fn instructions(&self) -> &'static str {
        "Pick a free square 1-9"
    }

    fn parse(&self, line: &str, grid: &Grid) -> Result<usize, InputError> {
        tic_tac_toe::parse_square(line, grid)
    }

    fn describe(&self, reply: &Reply) -> String {
        let mut msg = match reply.computer {
            Some(idx) => format!("Computer took square {}", idx + 1),
            None => "No squares left".to_string(),
        };
        if let Some(finish) = reply.finish {
            msg.push_str(&format!(". {finish}!"));
        }
        msg
    }
}

/// A block of the target color followed by its channel values
pub fn swatch(rgb: Rgb) -> String {
    let Rgb { r, g, b } = rgb;
    format!(
        "{} ({r}, {g}, {b})",
        "      ".on(Color::Rgb { r, g, b })
    )
}

pub fn color_hint(hint: &ColorHint) -> String {
    hint.off
        .iter()
        .map(|(channel, nudge)| {
            let channel = match channel {
                Channel::Red => "red",
                Channel::Green => "green",
                Channel::Blue => "blue",
            };
            let nudge = match nudge {
                Nudge::TooHigh => "too high",
                Nudge::TooLow => "too low",
            };
            format!("{channel} {nudge}")
        })
        .join(", ")
}

/// Board laid out row by row; hidden cards show their 1-based position
pub fn board_rows(board: &Board) -> Vec<String> {
    let columns = board.columns().max(1);
    board
        .visible()
        .into_iter()
        .enumerate()
        .map(|(idx, card)| match card {
            Some(symbol) => format!("{symbol:>2}"),
            None => format!("{:>2}", idx + 1),
        })
        .chunks(columns)
        .into_iter()
        .map(|mut row| row.join(" "))
        .collect()
}

/// Three rows of marks; free squares show their 1-based number
pub fn grid_rows(grid: &Grid) -> Vec<String> {
    grid.cells()
        .iter()
        .enumerate()
        .map(|(idx, cell)| match cell {
            Some(mark) => mark.to_string(),
            None => (idx + 1).to_string(),
        })
        .chunks(3)
        .into_iter()
        .map(|mut row| row.join(" | "))
        .collect()
}

/// Whole numbers without a fraction, anything else to two places
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// mm:ss
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

pub fn status_line<C, F>(snapshot: &Snapshot<'_, C, F>) -> String {
    let mut parts = Vec::new();
    if let Some(total) = snapshot.total_rounds {
        parts.push(format!("Round {}/{}", snapshot.round, total));
    }
    parts.push(format!("Score {}", snapshot.score));
    parts.push(format!("Attempts {}", snapshot.attempts));
    parts.push(format!("Streak {}", snapshot.streak));
    parts.push(format_elapsed(snapshot.elapsed));
    parts.join(" | ")
}

fn record_line(update: &RecordUpdate) -> String {
    match update.previous {
        Some(previous) => format!(
            "New best {}: {} (was {})",
            update.metric, update.value, previous
        ),
        None => format!("First record for {}: {}", update.metric, update.value),
    }
}

pub fn summary_lines(summary: &SessionSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "{} on {}: {} in {}",
        summary.game,
        summary.difficulty,
        summary.ending,
        format_elapsed(Duration::from_secs(summary.elapsed_secs))
    )];
    lines.push(
        summary
            .metrics
            .iter()
            .map(|(metric, value)| format!("{metric}: {value}"))
            .join("  "),
    );
    lines.extend(summary.new_records.iter().map(record_line));
    lines
}

pub fn history_line(entry: &HistoryEntry) -> String {
    let mut line = format!(
        "{}  {:<6} {:<8} score {:<4} attempts {:<4} {}",
        entry.date,
        entry.difficulty.to_string(),
        entry.ending.to_string(),
        entry.score,
        entry.attempts,
        format_elapsed(Duration::from_secs(entry.elapsed_secs))
    );
    if let Some(mode) = &entry.mode {
        line.push_str(&format!("  {mode}"));
    }
    line
}

/// Play one session to completion on `input`/`out`.
///
/// Returns `None` if the player quits or input runs out first.
pub fn run_session<G, R, W>(
    session: &mut GameSession<G>,
    config: SessionConfig<G::Params>,
    input: R,
    out: &mut W,
) -> error::Result<Option<SessionSummary>>
where
    G: TextFrontend,
    R: BufRead,
    W: Write,
{
    session.start(config);
    let policy = session.policy();
    writeln!(out, "{}", policy.name.bold())?;
    writeln!(out, "{}", policy.description.dim())?;

    let mut lines = input.lines();
    while session.phase().is_active() {
        session.tick(Instant::now());

        if session.phase() == (Phase::Active { reconciling: true }) {
            if let Some(challenge) = session.challenge() {
                writeln!(out, "{}", session.game().show(challenge))?;
            }
            if let Some(delay) = session.reveal_delay() {
                out.flush()?;
                thread::sleep(delay);
            }
            session.resolve_reconciliation()?;
            continue;
        }

        let Some(challenge) = session.challenge() else {
            break;
        };
        writeln!(out)?;
        writeln!(out, "{}", status_line(&session.snapshot()).cyan())?;
        writeln!(out, "{}", session.game().show(challenge))?;
        write!(out, "{} > ", session.game().instructions())?;
        out.flush()?;

        let Some(line) = lines.next() else {
            tracing::debug!(game = %policy.id, "input closed");
            session.reset();
            return Ok(None);
        };
        let line = line?;
        if line.trim().eq_ignore_ascii_case(QUIT) {
            session.reset();
            return Ok(None);
        }

        let answer = match session.game().parse(&line, challenge) {
            Ok(answer) => answer,
            Err(err) => {
                writeln!(out, "{}", err.to_string().yellow())?;
                continue;
            }
        };

        match session.submit(answer.borrow()) {
            Ok(Outcome::Correct) => writeln!(out, "{}", "Correct!".green().bold())?,
            Ok(Outcome::Incorrect(Some(feedback))) => {
                writeln!(out, "{}", session.game().describe(&feedback).red())?
            }
            Ok(Outcome::Incorrect(None)) => writeln!(out, "{}", "Missed".red())?,
            Err(err @ GameError::IllegalMove { .. }) => {
                writeln!(out, "{}", err.to_string().yellow())?
            }
            Err(err) => return Err(err),
        }
    }

    let summary = session.summary().cloned();
    if let Some(summary) = &summary {
        writeln!(out)?;
        for line in summary_lines(summary) {
            writeln!(out, "{line}")?;
        }
    }
    Ok(summary)
}
