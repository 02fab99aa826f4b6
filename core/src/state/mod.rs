//! Character identity and allegiance
//!
//! The registry is the only owner of character state. Other trackers refer
//! to characters by name and never hold a record.

mod character;
mod registry;


pub use character::{CanonicalName, CharacterRecord, Relationship};
pub use registry::{CharacterRegistry, HeuristicRules};
