use std::error::Error;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use arcade::app_dirs::AppDirs;
use arcade::config::{Config, ConfigStore, FileConfigStore};
use arcade::console::{self, TextFrontend};
use arcade::difficulty::Difficulty;
use arcade::games::math_quiz::QuestionKind;
use arcade::games::typing::TextCategory;
use arcade::games::{
    self, ColorMixer, GameId, MathQuiz, MemoryMatch, NumberGuess, PalindromeHunt,
    RockPaperScissors, TicTacToe, TypingTest,
};
use arcade::history::{self, SessionSummary};
use arcade::policy::SessionConfig;
use arcade::random::RngSource;
use arcade::records::RecordStore;
use arcade::session::GameSession;
use arcade::store::SqliteStore;
use clap::{Args, Parser, Subcommand};
use crossterm::style::Stylize;
use tracing_subscriber::EnvFilter;

/// a terminal arcade of small scored mini-games
#[derive(Parser, Debug)]
#[clap(
    version,
    about,
    long_about = "A terminal arcade of small mini-games with difficulty tiers, persistent best scores and a session history log."
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// log engine events to stderr
    #[clap(short, long, global = true)]
    verbose: bool,

    /// keep records, history and config in this directory instead of the per-user defaults
    #[clap(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// list the available games
    List,
    /// play one session of a game
    Play(PlayArgs),
    /// show stored best results
    Records {
        #[clap(value_enum)]
        game: Option<GameId>,
    },
    /// show the most recent sessions of each game, newest first
    History {
        #[clap(value_enum)]
        game: Option<GameId>,

        /// print CSV instead of a table
        #[clap(long)]
        csv: bool,
    },
    /// forget every stored best result of a game
    ClearRecords {
        #[clap(value_enum)]
        game: GameId,
    },
}

#[derive(Args, Debug)]
struct PlayArgs {
    #[clap(value_enum)]
    game: GameId,

    /// difficulty tier
    #[clap(short, long, value_enum)]
    difficulty: Option<Difficulty>,

    /// number of rounds for round-based games
    #[clap(short, long)]
    rounds: Option<u32>,

    /// math quiz operation
    #[clap(long, value_enum)]
    operation: Option<QuestionKind>,

    /// typing test text category
    #[clap(long, value_enum)]
    category: Option<TextCategory>,

    /// seed the random source for a reproducible session
    #[clap(long)]
    seed: Option<u64>,

    /// remember these options as the new defaults
    #[clap(long)]
    save: bool,
}

impl PlayArgs {
    fn apply(&self, cfg: &mut Config) {
        if let Some(difficulty) = self.difficulty {
            cfg.difficulty = difficulty;
        }
        if let Some(rounds) = self.rounds {
            cfg.rounds = Some(rounds);
        }
        if let Some(operation) = self.operation {
            cfg.math_questions = operation;
        }
        if let Some(category) = self.category {
            cfg.text_category = category;
        }
    }
}

/// Where the persistent files live for this run
#[derive(Debug)]
struct Paths {
    db: PathBuf,
    config: PathBuf,
}

impl Paths {
    fn resolve(data_dir: Option<&Path>) -> Self {
        match data_dir {
            Some(dir) => Self {
                db: dir.join("records.db"),
                config: dir.join("config.json"),
            },
            None => Self {
                db: AppDirs::db_path().unwrap_or_else(|| PathBuf::from("arcade.db")),
                config: AppDirs::config_path(),
            },
        }
    }

    fn records(&self) -> arcade::Result<RecordStore> {
        Ok(RecordStore::new(Box::new(SqliteStore::open(&self.db)?)))
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let paths = Paths::resolve(cli.data_dir.as_deref());
    tracing::debug!(?paths, "resolved data locations");

    match cli.command {
        Command::List => list(),
        Command::Play(args) => play(args, &paths),
        Command::Records { game } => records(game, &paths),
        Command::History { game, csv } => show_history(game, csv, &paths),
        Command::ClearRecords { game } => clear_records(game, &paths),
    }
}

fn list() -> Result<(), Box<dyn Error>> {
    let mut out = io::stdout();
    for policy in games::catalog() {
        writeln!(
            out,
            "{} {} - {}",
            format!("{:<20}", policy.id.to_string()).bold(),
            policy.name,
            policy.description
        )?;
    }
    Ok(())
}

fn play(args: PlayArgs, paths: &Paths) -> Result<(), Box<dyn Error>> {
    let config_store = FileConfigStore::with_path(&paths.config);
    let mut cfg = config_store.load();
    args.apply(&mut cfg);
    if args.save {
        config_store.save(&cfg)?;
    }

    let records = paths.records()?;
    let rng = match args.seed {
        Some(seed) => RngSource::seeded(seed),
        None => RngSource::from_entropy(),
    };

    let summary: Option<SessionSummary> = match args.game {
        GameId::NumberGame => run(NumberGuess, (), &cfg, records, rng)?,
        GameId::ColorMixer => run(ColorMixer, (), &cfg, records, rng)?,
        GameId::MathQuiz => run(MathQuiz, cfg.math_questions, &cfg, records, rng)?,
        GameId::Typing => run(TypingTest::new()?, cfg.text_category, &cfg, records, rng)?,
        GameId::MemoryGame => run(MemoryMatch, (), &cfg, records, rng)?,
        GameId::Palindrome => run(PalindromeHunt, (), &cfg, records, rng)?,
        GameId::RockPaperScissors => run(RockPaperScissors, (), &cfg, records, rng)?,
        GameId::TicTacToe => run(TicTacToe, (), &cfg, records, rng)?,
    };
    tracing::debug!(finished = summary.is_some(), "play done");
    Ok(())
}

fn run<G: TextFrontend>(
    game: G,
    params: G::Params,
    cfg: &Config,
    records: RecordStore,
    rng: RngSource,
) -> arcade::Result<Option<SessionSummary>> {
    let mut session = GameSession::new(game, records).with_random(rng);
    let mut config = SessionConfig::with_params(cfg.difficulty, params);
    config.rounds = cfg.rounds;

    let stdin = io::stdin();
    let mut out = io::stdout();
    console::run_session(&mut session, config, stdin.lock(), &mut out)
}

fn records(game: Option<GameId>, paths: &Paths) -> Result<(), Box<dyn Error>> {
    let store = paths.records()?;
    let mut out = io::stdout();
    for policy in games::catalog() {
        if game.is_some_and(|g| g != policy.id) {
            continue;
        }
        writeln!(out, "{}", policy.name.bold())?;
        for spec in policy.records {
            let best = store
                .best(policy.id, spec)?
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string());
            writeln!(out, "  {:<32} {}", spec.key(policy.id), best)?;
        }
    }
    Ok(())
}

fn show_history(game: Option<GameId>, csv: bool, paths: &Paths) -> Result<(), Box<dyn Error>> {
    let store = paths.records()?;
    let mut logs = Vec::new();
    for policy in games::catalog() {
        if game.map_or(true, |g| g == policy.id) {
            logs.push((policy, store.history(policy.id)?));
        }
    }

    let mut out = io::stdout();
    if csv {
        history::write_csv(logs.iter().flat_map(|(_, log)| log.iter()), &mut out)?;
        return Ok(());
    }
    for (policy, log) in &logs {
        writeln!(out, "{}", policy.name.bold())?;
        if log.is_empty() {
            writeln!(out, "  no sessions yet")?;
        }
        for entry in log.iter() {
            writeln!(out, "  {}", console::history_line(entry))?;
        }
    }
    Ok(())
}

fn clear_records(game: GameId, paths: &Paths) -> Result<(), Box<dyn Error>> {
    let mut records = paths.records()?;
    let specs = games::policy_for(game).records;
    let mut cleared = 0;
    for spec in specs {
        if records.best(game, spec)?.is_some() {
            cleared += 1;
        }
    }
    records.clear(game, specs)?;
    println!("Cleared {cleared} record(s) for {game}");
    Ok(())
}
