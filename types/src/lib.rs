//! Shared configuration types for the eqlog engine.
//!
//! Every settings struct deserializes with `#[serde(default)]`, so an empty
//! TOML document yields the stock tables the engine was tuned against.

pub mod config;

pub use config::{
    BuffSettings, ClassifierSettings, EngineConfig, HeuristicSettings, LootSettings,
    SpellTableLayout, SyntheticEmote,
};
