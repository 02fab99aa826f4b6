use std::sync::{Arc, LazyLock};

use chrono::NaiveDateTime;
use eqlog_types::HeuristicSettings;
use hashbrown::{HashMap, HashSet};
use regex::Regex;

use super::character::{CanonicalName, CharacterRecord, Relationship};
use crate::combat_log::{EventKind, LogEvent};
use crate::context::ConfigError;
use crate::game_data::{Class, SpellRecord, SpellReference};
use crate::signal_processor::EventSubscriber;

static LEADER_CLAIM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^My leader is (?P<owner>\S+?)\.$").expect("valid leader pattern"));

/// Fixed phrase tables and name grammar the evidence rules consult.
#[derive(Debug, Clone)]
pub struct HeuristicRules {
    friendly_con_phrases: HashSet<String>,
    /// Lowercase.
    public_chat_channels: HashSet<String>,
    pet_name: Regex,
    pet_ack_phrases: HashSet<String>,
    pet_attack_prefix: String,
    pet_attack_suffix: String,
}

impl HeuristicRules {
    pub fn from_settings(settings: &HeuristicSettings) -> Result<Self, ConfigError> {
        let pet_name = Regex::new(&settings.pet_name_pattern).map_err(|e| ConfigError::Pattern {
            pattern: settings.pet_name_pattern.clone(),
            source: e,
        })?;
        Ok(Self {
            friendly_con_phrases: settings.friendly_con_phrases.iter().cloned().collect(),
            public_chat_channels: settings
                .public_chat_channels
                .iter()
                .map(|c| c.to_lowercase())
                .collect(),
            pet_name,
            pet_ack_phrases: settings.pet_ack_phrases.iter().cloned().collect(),
            pet_attack_prefix: settings.pet_attack_prefix.clone(),
            pet_attack_suffix: settings.pet_attack_suffix.clone(),
        })
    }

    pub fn is_pet_name(&self, name: &str) -> bool {
        self.pet_name.is_match(name)
    }

    fn is_pet_ack(&self, message: &str) -> bool {
        self.pet_ack_phrases.contains(message)
            || (message.len() > self.pet_attack_prefix.len() + self.pet_attack_suffix.len()
                && message.starts_with(&self.pet_attack_prefix)
                && message.ends_with(&self.pet_attack_suffix))
    }
}

/// One record per character seen in the log, updated by each event in
/// arrival order.
///
/// Evidence only ever comes from the current and earlier events; the
/// relationship of a name can therefore change over a session (charms,
/// charm breaks, NPC names reused after a death).
pub struct CharacterRegistry {
    characters: HashMap<String, CharacterRecord>,
    spells: Arc<SpellReference>,
    rules: HeuristicRules,
}

impl CharacterRegistry {
    pub fn new(spells: Arc<SpellReference>, settings: &HeuristicSettings) -> Result<Self, ConfigError> {
        Ok(Self::with_rules(spells, HeuristicRules::from_settings(settings)?))
    }

    pub fn with_rules(spells: Arc<SpellReference>, rules: HeuristicRules) -> Self {
        Self {
            characters: HashMap::new(),
            spells,
            rules,
        }
    }

    /// Swap in a reloaded spell reference.
    pub fn set_spells(&mut self, spells: Arc<SpellReference>) {
        self.spells = spells;
    }

    pub fn rules(&self) -> &HeuristicRules {
        &self.rules
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Records
    // ─────────────────────────────────────────────────────────────────────────

    /// The record for `name`, created on first use. Corpse suffixes are
    /// stripped; a "`s pet" / "`s warder" suffix seeds the owner.
    pub fn get_or_create(&mut self, name: &str) -> &mut CharacterRecord {
        let canonical = CanonicalName::parse(name);
        self.characters.entry_ref(canonical.name).or_insert_with(|| {
            tracing::trace!(name = canonical.name, owner = ?canonical.owner, "New character");
            CharacterRecord {
                owner: canonical.owner.map(str::to_string),
                ..CharacterRecord::new(canonical.name)
            }
        })
    }

    pub fn get(&self, name: &str) -> Option<&CharacterRecord> {
        self.characters.get(CanonicalName::parse(name).name)
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CharacterRecord> {
        self.characters.values()
    }

    /// Names flagged as player characters.
    pub fn players(&self) -> impl Iterator<Item = &str> {
        self.characters
            .values()
            .filter(|r| r.is_player)
            .map(|r| r.name.as_str())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Own relationship, or the owner's when the record's is unknown.
    pub fn get_type(&self, name: &str) -> Relationship {
        let Some(record) = self.get(name) else {
            return Relationship::Unknown;
        };
        match (record.relationship, &record.owner) {
            (Relationship::Unknown, Some(owner)) => self
                .get(owner)
                .map_or(Relationship::Unknown, |o| o.relationship),
            (rel, _) => rel,
        }
    }

    pub fn get_class(&self, name: &str) -> Option<&str> {
        self.get(name)?.class.as_deref()
    }

    pub fn get_owner(&self, name: &str) -> Option<&str> {
        self.get(name)?.owner.as_deref()
    }

    pub fn get_level(&self, name: &str) -> Option<u8> {
        self.get(name)?.level
    }

    /// Decide which of two combatants is the foe, updating both records.
    ///
    /// Returns `None` for a self-hit, when neither side's allegiance is
    /// known, or when an ambiguous pair cannot be broken.
    pub fn get_foe(&mut self, a: &str, b: &str) -> Option<String> {
        let a = CanonicalName::parse(a).name.to_string();
        let b = CanonicalName::parse(b).name.to_string();
        if a == b {
            return None;
        }
        self.get_or_create(&a);
        self.get_or_create(&b);

        use Relationship::*;
        let foe = match (self.get_type(&a), self.get_type(&b)) {
            (Unknown, Unknown) => return None,
            (Friend, Friend) | (Foe, Foe) => {
                let foe = self.break_tie(&a, &b)?;
                tracing::debug!(a = %a, b = %b, foe = %foe, "Resolved ambiguous relationship");
                foe
            }
            (Friend, _) | (_, Foe) => b.clone(),
            (Foe, _) | (_, Friend) => a.clone(),
        };
        let friend = if foe == a { &b } else { &a };

        self.get_or_create(&foe).relationship = Foe;
        self.get_or_create(friend).relationship = Friend;
        Some(foe)
    }

    /// Pick the side of a same-polarity pair that should be the foe.
    fn break_tie(&self, a: &str, b: &str) -> Option<String> {
        let (ra, rb) = (self.get(a)?, self.get(b)?);
        if ra.is_player != rb.is_player {
            return Some(if ra.is_player { b } else { a }.to_string());
        }
        let foe = match (ra.last_aggro, rb.last_aggro) {
            (Some(ta), Some(tb)) if ta != tb => {
                if ta > tb {
                    a
                } else {
                    b
                }
            }
            (Some(_), None) => a,
            (None, Some(_)) => b,
            _ => return None,
        };
        Some(foe.to_string())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Evidence
    // ─────────────────────────────────────────────────────────────────────────

    pub fn handle_event(&mut self, event: &LogEvent) {
        match &event.kind {
            EventKind::LogOpen { player, .. } => self.get_or_create(player).mark_player_friend(),
            EventKind::Who { name, level, class, .. } => {
                let class = class.as_deref().and_then(Class::parse);
                let record = self.get_or_create(name);
                record.mark_player_friend();
                if level.is_some() {
                    record.level = *level;
                }
                if let Some(class) = class {
                    record.set_class_once(class.name());
                }
            }
            EventKind::Party { name, .. } => self.get_or_create(name).mark_player_friend(),
            EventKind::Loot { looter, .. } => self.get_or_create(looter).mark_player_friend(),
            EventKind::Con { name, level, faction } => self.handle_con(name, *level, faction),
            EventKind::Chat { channel, source, message } => self.handle_chat(channel, source, message),
            EventKind::Heal { source, target, spell, .. } => {
                self.handle_heal(source.as_deref(), target, spell.as_deref())
            }
            EventKind::Cast { source, spell } => self.handle_cast(source, spell),
            EventKind::Hit { source, target, .. } | EventKind::Miss { source, target, .. } => {
                self.handle_melee(source, target, event.timestamp)
            }
            EventKind::Death { name, killer } => {
                if let Some(killer) = killer {
                    self.get_or_create(killer);
                }
                let record = self.get_or_create(name);
                record.last_aggro = None;
                if !record.is_player {
                    record.relationship = Relationship::Unknown;
                }
            }
            EventKind::Rot { source: Some(source), .. } => {
                self.get_or_create(source);
            }
            EventKind::Rot { source: None, .. } | EventKind::Zone { .. } | EventKind::RawText { .. } => {}
        }
    }

    fn handle_con(&mut self, name: &str, level: Option<u8>, faction: &str) {
        let friendly = self.rules.friendly_con_phrases.contains(faction);
        let record = self.get_or_create(name);
        if level.is_some() {
            record.level = level;
        }
        if !friendly {
            record.relationship = Relationship::Foe;
        }
    }

    fn handle_chat(&mut self, channel: &str, source: &str, message: &str) {
        if !self.rules.public_chat_channels.contains(channel) {
            self.get_or_create(source).mark_player_friend();
        } else if self.rules.is_pet_name(source) {
            self.get_or_create(source).relationship = Relationship::Friend;
        } else {
            self.get_or_create(source);
        }

        if let Some(caps) = LEADER_CLAIM.captures(message) {
            let owner = &caps["owner"];
            self.get_or_create(owner).mark_player_friend();
            let speaker = self.get_or_create(source);
            speaker.owner = Some(owner.to_string());
            speaker.relationship = Relationship::Friend;
            tracing::debug!(pet = source, owner, "Ownership claimed in chat");
        }

        if self.rules.is_pet_ack(message) {
            self.get_or_create(source).relationship = Relationship::Friend;
        }
    }

    fn handle_heal(&mut self, source: Option<&str>, target: &str, spell: Option<&str>) {
        let pet_spell = spell
            .and_then(|s| self.spells.get_spell(s))
            .is_some_and(SpellRecord::is_pet_target);

        let target = self.get_or_create(target);
        let Some(source) = source else {
            return;
        };
        let healer = CanonicalName::parse(source).name;

        if pet_spell && !target.is_player && target.owner.is_none() && target.name != healer {
            tracing::debug!(pet = %target.name, owner = healer, "Owner inferred from pet heal");
            target.owner = Some(healer.to_string());
        }

        let polarity = if target.is_player {
            Relationship::Friend
        } else {
            target.relationship
        };
        let healer = self.get_or_create(healer);
        if polarity != Relationship::Unknown {
            healer.relationship = polarity;
        }
    }

    fn handle_cast(&mut self, source: &str, spell: &str) {
        let class = self.spells.get_spell(spell).and_then(SpellRecord::single_class);
        let caster = self.get_or_create(source);
        if let Some(class) = class {
            caster.set_class_once(class.name());
        }
    }

    fn handle_melee(&mut self, source: &str, target: &str, timestamp: NaiveDateTime) {
        let target_is_player = self.get_or_create(target).is_player;
        let attacker = self.get_or_create(source);
        if target_is_player {
            attacker.last_aggro = Some(timestamp);
        }
    }
}

impl EventSubscriber for CharacterRegistry {
    fn handle_event(&mut self, event: &LogEvent) {
        CharacterRegistry::handle_event(self, event);
    }
}
