// Library surface shared by the binary and the integration tests.
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod console;
pub mod difficulty;
pub mod error;
pub mod games;
pub mod history;
pub mod policy;
pub mod random;
pub mod records;
pub mod session;
pub mod store;
pub mod util;

pub use clock::{Clock, ManualClock, SystemClock};
pub use difficulty::Difficulty;
pub use error::{GameError, InputError, Result};
pub use games::GameId;
pub use history::{Ending, HistoryLog, SessionSummary};
pub use policy::{Game, GamePolicy, Outcome, SessionConfig};
pub use random::{RandomSource, RngSource, ScriptedSource};
pub use records::{Metric, RecordStore};
pub use session::{GameSession, Phase};
pub use store::{KeyValueStore, MemoryStore, SqliteStore};
