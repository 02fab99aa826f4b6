pub mod combat_log;
pub mod context;
pub mod effects;
pub mod game_data;
pub mod loot;
pub mod signal_processor;
pub mod state;

// Re-exports for convenience
pub use combat_log::{ClassifyError, EventKind, LogClassifier, LogEvent};
pub use context::{ConfigError, ParsingSession, load_config};
pub use game_data::SpellReference;
pub use signal_processor::{EventSubscriber, LootSubscriber};
