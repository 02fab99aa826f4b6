//! Log line classification
//!
//! Every game log line looks like `[Tue Apr 03 23:03:57 2018] <text>`. The
//! classifier strips the timestamp, filters by date and ignore list, and runs
//! the text through the recognizer table:
//!
//! ```text
//!   raw line ─► parse_timestamp ─► date / ignore filter ─► recognize ─► LogEvent
//!                    │ none                │ dropped           │ none
//!                    ▼                     ▼                   ▼
//!                 Ok(None)              Ok(None)         RawText event
//! ```

mod classifier;
mod context;
mod event;
pub mod recognizers;
mod timestamp;

#[cfg(test)]
mod recognizers_tests;

pub use classifier::LogClassifier;
pub use context::ClassifyContext;
pub use event::{EventKind, LogEvent, PartyStatus};
pub use timestamp::parse_timestamp;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("the logging player's name must be configured before classifying")]
    PlayerNotConfigured,
}
