pub mod analysis;
pub mod debounce;
pub mod decision;
pub mod engine;
pub mod market;
pub mod scheduler;
pub mod sqlite_store;
pub mod telegram;

pub use debounce::DebounceGate;
pub use decision::{DecisionPolicy, Verdict};
pub use engine::SignalEngine;
pub use market::{CandleSource, RealRateSource};
pub use sqlite_store::SqliteStore;
pub use telegram::{SignalTransport, TelegramService};
