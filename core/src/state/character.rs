use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use serde::Serialize;

/// Inferred allegiance of a character relative to the logging player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Relationship {
    #[default]
    Unknown,
    Friend,
    Foe,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CharacterRecord {
    pub name: String,
    /// Set once, from a roster line or a single-class spell; never replaced.
    pub class: Option<String>,
    pub level: Option<u8>,
    pub owner: Option<String>,
    pub is_player: bool,
    pub relationship: Relationship,
    /// Last time this character traded blows with a known player.
    pub last_aggro: Option<NaiveDateTime>,
}

impl CharacterRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub(crate) fn mark_player_friend(&mut self) {
        self.is_player = true;
        self.relationship = Relationship::Friend;
    }

    pub(crate) fn set_class_once(&mut self, class: &str) {
        if self.class.is_none() && !class.is_empty() {
            self.class = Some(class.to_string());
        }
    }
}

static CORPSE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:'s|`s) corpse\d*$").expect("valid corpse pattern"));

static COMPANION_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<owner>.+?)(?:'s|`s) (?:pet|warder)$").expect("valid companion pattern")
});

/// Registry key for a name as it appears in the log, plus the owner implied
/// by a "`s pet" / "`s warder" suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalName<'a> {
    pub name: &'a str,
    pub owner: Option<&'a str>,
}

impl<'a> CanonicalName<'a> {
    pub fn parse(raw: &'a str) -> Self {
        let trimmed = raw.trim();
        let name = match CORPSE_SUFFIX.find(trimmed) {
            Some(m) => trimmed[..m.start()].trim_end(),
            None => trimmed,
        };
        // Companions keep their full name as key: the owner is a separate record.
        let owner = COMPANION_SUFFIX
            .captures(name)
            .and_then(|caps| caps.name("owner"))
            .map(|m| m.as_str());
        Self { name, owner }
    }
}
