//! Buff landing tracking
//!
//! The game never logs a "buff applied" event. Landings are recovered from
//! the fixed text a spell prints when it takes hold:
//!
//! ```text
//!   RawText ──► on-self text?  ──yes──► holder = logging player
//!                    │ no
//!                    ▼
//!               drop first token ──► on-others text? ──yes──► holder = line minus suffix
//!                                          │ no
//!                                          ▼
//!                                       ignored
//! ```
//!
//! Deaths are recorded alongside as marker entries so that a consumer can
//! tell a buff that was lost to a death from one that is still running.

mod buffs;


pub use buffs::{BuffRecord, BuffWindowEntry, BuffWindowTracker, DEATH_MARKER};
