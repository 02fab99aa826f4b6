use chrono::NaiveDateTime;
use eqlog_types::BuffSettings;
use hashbrown::HashMap;

use crate::combat_log::{EventKind, LogEvent};
use crate::game_data::SpellReference;
use crate::signal_processor::EventSubscriber;

/// Spell name recorded for a character's death.
pub const DEATH_MARKER: &str = "*Died";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuffRecord {
    pub holder: String,
    /// Canonical spell name, or [`DEATH_MARKER`].
    pub spell: String,
    pub timestamp: NaiveDateTime,
    pub duration_ticks: u32,
}

/// One landing, relative to the start of a query window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuffWindowEntry {
    pub spell: String,
    pub seconds: i64,
}

#[derive(Debug, Clone)]
struct EmoteSpell {
    name: String,
    duration_ticks: u32,
    /// Text printed after the recipient's name, as it appears in the log.
    on_others: Option<String>,
}

/// Landed-text lookup for the notable spells.
#[derive(Debug, Clone, Default)]
struct EmoteIndex {
    spells: Vec<EmoteSpell>,
    on_self: HashMap<String, usize>,
    /// Keyed by the landed-on-others text with any leading "'s" removed, so
    /// that it can be looked up with the line minus its first token.
    on_others: HashMap<String, usize>,
}

impl EmoteIndex {
    fn build(spells: &SpellReference, settings: &BuffSettings) -> Self {
        let mut index = Self::default();

        for name in &settings.notable_spells {
            let Some(record) = spells.get_spell(name) else {
                tracing::debug!(spell = %name, "Notable spell missing from reference");
                continue;
            };
            index.insert(
                EmoteSpell {
                    name: record.name.clone(),
                    duration_ticks: record.duration_ticks,
                    on_others: record.landed_on_others.clone(),
                },
                record.landed_on_self.as_deref(),
            );
        }

        for emote in &settings.synthetic_emotes {
            let (name, duration_ticks) = match spells.get_spell(&emote.spell) {
                Some(record) => (record.name.clone(), record.duration_ticks),
                None => (emote.spell.clone(), 0),
            };
            index.insert(
                EmoteSpell {
                    name,
                    duration_ticks,
                    on_others: Some(emote.text.clone()),
                },
                None,
            );
        }
        index
    }

    fn insert(&mut self, spell: EmoteSpell, on_self: Option<&str>) {
        let idx = self.spells.len();
        if let Some(text) = on_self
            && let Some(prev) = self.on_self.insert(text.to_string(), idx)
        {
            tracing::debug!(
                spell = %spell.name,
                replaced = %self.spells[prev].name,
                "Landed-on-self text shared by two notable spells"
            );
        }
        if let Some(text) = &spell.on_others
            && let Some(prev) = self.on_others.insert(others_key(text).to_string(), idx)
        {
            tracing::debug!(
                spell = %spell.name,
                replaced = %self.spells[prev].name,
                "Landed-on-others text shared by two notable spells"
            );
        }
        self.spells.push(spell);
    }

    fn len(&self) -> usize {
        self.spells.len()
    }
}

fn others_key(text: &str) -> &str {
    let text = text.trim_start();
    text.strip_prefix("'s")
        .or_else(|| text.strip_prefix("`s"))
        .unwrap_or(text)
        .trim()
}

/// Records when notable buffs land and when characters die.
///
/// Third-party buff expiry is never logged, so records are only removed by
/// [`purge`](Self::purge). Landed-on-self text is credited to the player the
/// line was classified for.
pub struct BuffWindowTracker {
    emotes: EmoteIndex,
    buffs: Vec<BuffRecord>,
}

impl BuffWindowTracker {
    pub fn new(spells: &SpellReference, settings: &BuffSettings) -> Self {
        let emotes = EmoteIndex::build(spells, settings);
        tracing::debug!(spells = emotes.len(), "Built buff emote index");
        Self {
            emotes,
            buffs: Vec::new(),
        }
    }

    pub fn handle_event(&mut self, event: &LogEvent) {
        match &event.kind {
            EventKind::Death { name, .. } => self.buffs.push(BuffRecord {
                holder: name.clone(),
                spell: DEATH_MARKER.to_string(),
                timestamp: event.timestamp,
                duration_ticks: 0,
            }),
            EventKind::RawText { text, player } => {
                if let Some(record) = self.match_emote(text, player, event.timestamp) {
                    tracing::debug!(holder = %record.holder, spell = %record.spell, "Buff landed");
                    self.buffs.push(record);
                }
            }
            _ => {}
        }
    }

    fn match_emote(&self, text: &str, player: &str, timestamp: NaiveDateTime) -> Option<BuffRecord> {
        let (holder, idx) = if let Some(&idx) = self.emotes.on_self.get(text) {
            if player.is_empty() {
                return None;
            }
            (player.to_string(), idx)
        } else {
            // Only the first token is taken as the name, so multi-word names
            // leave part of the name in the lookup key and miss.
            let (_, rest) = text.split_once(char::is_whitespace)?;
            let idx = *self.emotes.on_others.get(rest.trim())?;
            let suffix = self.emotes.spells[idx].on_others.as_deref()?;
            let holder = text.strip_suffix(suffix)?.trim();
            if holder.is_empty() {
                return None;
            }
            (holder.to_string(), idx)
        };

        let spell = &self.emotes.spells[idx];
        Some(BuffRecord {
            holder,
            spell: spell.name.clone(),
            timestamp,
            duration_ticks: spell.duration_ticks,
        })
    }

    /// Drop every record stamped before `cutoff`.
    pub fn purge(&mut self, cutoff: NaiveDateTime) {
        let before = self.buffs.len();
        self.buffs.retain(|b| b.timestamp >= cutoff);
        tracing::trace!(removed = before - self.buffs.len(), "Purged buff records");
    }

    /// Landings on `name` within `[from, to]`, as whole seconds after `from`
    /// plus `offset`. Each call starts a fresh pass over the records.
    pub fn get<'a>(
        &'a self,
        name: &'a str,
        from: NaiveDateTime,
        to: NaiveDateTime,
        offset: i64,
    ) -> impl Iterator<Item = BuffWindowEntry> + Clone + 'a {
        self.buffs
            .iter()
            .filter(move |b| b.holder == name && b.timestamp >= from && b.timestamp <= to)
            .map(move |b| BuffWindowEntry {
                spell: b.spell.clone(),
                seconds: (b.timestamp - from).num_seconds() + offset,
            })
    }

    pub fn records(&self) -> &[BuffRecord] {
        &self.buffs
    }

    pub fn len(&self) -> usize {
        self.buffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffs.is_empty()
    }
}

impl EventSubscriber for BuffWindowTracker {
    fn handle_event(&mut self, event: &LogEvent) {
        BuffWindowTracker::handle_event(self, event);
    }
}
