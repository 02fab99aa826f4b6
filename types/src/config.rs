use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Engine
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level configuration consumed by `eqlog-core`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub classifier: ClassifierSettings,
    pub heuristics: HeuristicSettings,
    pub buffs: BuffSettings,
    pub loot: LootSettings,
    pub spell_table: SpellTableLayout,
}

// ─────────────────────────────────────────────────────────────────────────────
// Classifier
// ─────────────────────────────────────────────────────────────────────────────

/// Log lines older than this were written before the heal/damage message
/// revision and are not understood by the recognizers.
pub fn log_format_revision() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2019, 4, 17)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Name of the character that wrote the log. Required before classifying.
    pub player: Option<String>,
    pub server: Option<String>,
    pub min_date: NaiveDateTime,
    pub max_date: Option<NaiveDateTime>,
    /// Exact (case-sensitive) message texts to drop, e.g. vendor spam.
    pub ignore: Vec<String>,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            player: None,
            server: None,
            min_date: log_format_revision(),
            max_date: None,
            ignore: Vec::new(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Character heuristics
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicSettings {
    /// Consider texts that leave the relationship untouched (own pet, charmed mob).
    pub friendly_con_phrases: Vec<String>,
    /// Chat channels that do not imply group membership.
    pub public_chat_channels: Vec<String>,
    /// Grammar of names the game generates for summoned pets.
    pub pet_name_pattern: String,
    /// Exact messages a pet says when acknowledging its owner.
    pub pet_ack_phrases: Vec<String>,
    /// "Attacking <target> Master." style acknowledgements.
    pub pet_attack_prefix: String,
    pub pet_attack_suffix: String,
}

impl Default for HeuristicSettings {
    fn default() -> Self {
        Self {
            friendly_con_phrases: strings(&["regards you as an ally", "looks upon you warmly"]),
            public_chat_channels: strings(&["tell", "say", "shout"]),
            pet_name_pattern: r"^[GJKLVXZ](?:[aeo][bknrs]){0,2}(?:ab|ar|as|ek|er|ib|n|obn|tik|tek)$"
                .to_string(),
            pet_ack_phrases: strings(&[
                "Following you, Master.",
                "Sorry, Master..calming down.",
                "Guarding with my life..oh splendid one.",
                "By your command, master.",
                "Changing position, Master.",
            ]),
            pet_attack_prefix: "Attacking ".to_string(),
            pet_attack_suffix: " Master.".to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Buffs
// ─────────────────────────────────────────────────────────────────────────────

/// Hand-written landed text for a spell whose reference strings are missing
/// or shared with too many other spells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticEmote {
    pub spell: String,
    /// Text printed after the recipient's name.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuffSettings {
    /// Canonical names of spells whose landing is worth tracking.
    pub notable_spells: Vec<String>,
    pub synthetic_emotes: Vec<SyntheticEmote>,
}

impl Default for BuffSettings {
    fn default() -> Self {
        Self {
            notable_spells: strings(&[
                "Spirit of Vesagran",
                "Prophet's Gift of the Ruchu",
                "Fierce Eye",
                "Auspice of the Hunter",
                "Boastful Bellow",
                "Arcane Destruction",
                "Spire of Arcanum",
                "Frenzied Burnout",
                "Dichotomic Fury",
            ]),
            synthetic_emotes: vec![
                SyntheticEmote {
                    spell: "Intensity of the Resolute".to_string(),
                    text: "is filled with the intensity of the resolute.".to_string(),
                },
                SyntheticEmote {
                    spell: "Glyph of Destruction".to_string(),
                    text: "is marked by a glyph of destruction.".to_string(),
                },
            ],
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Loot
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LootSettings {
    /// Include the built-in tradeskill/trade-material ignore list.
    pub use_builtin_ignore: bool,
    /// Extra item names to ignore on top of the built-in list.
    pub ignored_items: Vec<String>,
}

impl Default for LootSettings {
    fn default() -> Self {
        Self {
            use_builtin_ignore: true,
            ignored_items: Vec::new(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Spell reference tables
// ─────────────────────────────────────────────────────────────────────────────

/// Column layout of the caret-delimited spell tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellTableLayout {
    pub id: usize,
    pub name: usize,
    pub buff_duration: usize,
    pub target_type: usize,
    /// First of 16 consecutive per-class minimum level columns.
    pub first_class_level: usize,
    pub not_castable_level: u16,
    pub comment_prefix: String,
    /// Appended to the primary table's file stem to locate the display strings.
    pub strings_suffix: String,
    pub landed_on_self: usize,
    pub landed_on_others: usize,
}

impl Default for SpellTableLayout {
    fn default() -> Self {
        Self {
            id: 0,
            name: 1,
            buff_duration: 17,
            target_type: 98,
            first_class_level: 104,
            not_castable_level: 255,
            comment_prefix: "#".to_string(),
            strings_suffix: "_str".to_string(),
            landed_on_self: 3,
            landed_on_others: 4,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_yields_defaults() {
        let config: EngineConfig = toml::from_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.classifier.min_date, log_format_revision());
        assert_eq!(config.spell_table.first_class_level, 104);
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let toml = r#"
[classifier]
player = "Rumstil"
server = "erollisi"
ignore = ["Buying Bone Chips, paying well!"]

[heuristics]
public_chat_channels = ["tell", "say", "shout", "ooc"]
"#;
        let config: EngineConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.classifier.player.as_deref(), Some("Rumstil"));
        assert_eq!(config.classifier.ignore.len(), 1);
        assert_eq!(config.classifier.min_date, log_format_revision());
        assert_eq!(config.heuristics.public_chat_channels.len(), 4);
        assert_eq!(
            config.heuristics.pet_ack_phrases,
            HeuristicSettings::default().pet_ack_phrases
        );
    }

    #[test]
    fn test_dates_parse_from_toml() {
        let toml = r#"
[classifier]
min_date = "2020-01-01T00:00:00"
max_date = "2020-12-31T23:59:59"
"#;
        let config: EngineConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.classifier.min_date.to_string(), "2020-01-01 00:00:00");
        assert!(config.classifier.max_date.is_some());
    }

    #[test]
    fn test_synthetic_emotes_round_trip() {
        let settings = BuffSettings::default();
        let text = toml::to_string(&settings).unwrap();
        let back: BuffSettings = toml::from_str(&text).unwrap();
        assert_eq!(back, settings);
    }
}
