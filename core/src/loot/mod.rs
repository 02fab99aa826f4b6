//! Item drop correlation
//!
//! Pairs each loot (or rot) message with the zone and server it happened on
//! so downstream consumers can build an item-to-mob table. Common tradeskill
//! materials drop from everything and are filtered out.

use chrono::NaiveDateTime;
use eqlog_types::LootSettings;
use hashbrown::HashSet;
use phf::phf_set;

use crate::combat_log::{EventKind, LogEvent};
use crate::signal_processor::{EventSubscriber, LootSubscriber, Subscribers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LootRecord {
    pub item: String,
    pub mob: String,
    pub zone: String,
    pub server: Option<String>,
    pub timestamp: NaiveDateTime,
}

/// Drop counts, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LootStats {
    pub emitted: u64,
    pub ignored_items: u64,
    pub missing_context: u64,
}

/// Trade materials that drop from nearly any mob.
static BUILTIN_IGNORE: phf::Set<&'static str> = phf_set! {
    "Bone Chip",
    "Bone Chips",
    "Spider Silk",
    "Spider Legs",
    "Rat Whiskers",
    "Rat Ears",
    "Snake Scales",
    "Snake Egg",
    "Bat Wing",
    "Bat Fur",
    "Bear Meat",
    "Wolf Meat",
    "Rabbit Meat",
    "Giant Frog Meat",
    "Fire Beetle Eye",
    "Zombie Skin",
    "Ruined Wolf Pelt",
    "Low Quality Wolf Skin",
    "Medium Quality Wolf Skin",
    "High Quality Wolf Skin",
    "Ruined Bear Pelt",
    "Low Quality Bear Skin",
    "Medium Quality Bear Skin",
    "High Quality Bear Skin",
    "Ruined Cat Pelt",
    "Low Quality Cat Pelt",
    "Medium Quality Cat Pelt",
    "High Quality Cat Pelt",
    "Silk Swatch",
    "Crushed Topaz",
    "Crushed Lava Rock",
    "Tattered Cloth Sandal",
    "Rusty Dagger",
    "Rusty Short Sword",
    "Rusty Long Sword",
    "Rusty Broad Sword",
    "Rusty Bastard Sword",
    "Rusty Two Handed Sword",
    "Rusty Axe",
    "Rusty Mace",
    "Rusty Scimitar",
    "Cracked Staff",
    "Water Flask",
    "Bottle of Milk",
    "Loaf of Bread",
    "Muffin",
    "Blue Diamond",
    "Black Sapphire",
    "Diamond",
    "Ruby",
    "Emerald",
    "Sapphire",
    "Star Ruby",
    "Jacinth",
    "Fire Opal",
    "Opal",
    "Pearl",
    "Peridot",
    "Topaz",
    "Jade",
    "Amber",
    "Carnelian",
    "Bloodstone",
    "Malachite",
    "Lapis Lazuli",
    "Hematite",
    "Turquoise",
    "Cat's Eye Agate",
    "Onyx",
    "Black Pearl",
    "Diamond Coin",
    "Diamond Coins",
    "Flawed Aligned Ore",
    "Flawed Ethereal Energy",
    "Fine Runic Hide",
    "Crude Runic Hide",
    "Energized Muramite Shard",
};

/// Server names whose drops are not representative of the live game.
static NON_STANDARD_SERVERS: phf::Set<&'static str> = phf_set! {
    "test",
    "beta",
    "stage",
};

/// Whether drops seen on `server` can be trusted for item-to-mob tables.
pub fn is_standard_server(server: Option<&str>) -> bool {
    match server.map(str::trim) {
        Some(name) if !name.is_empty() => {
            !NON_STANDARD_SERVERS.contains(name.to_ascii_lowercase().as_str())
        }
        _ => false,
    }
}

pub struct LootCorrelator {
    zone: Option<String>,
    server: Option<String>,
    use_builtin_ignore: bool,
    ignored_items: HashSet<String>,
    subscribers: Subscribers<dyn LootSubscriber>,
    stats: LootStats,
}

impl LootCorrelator {
    pub fn new(settings: &LootSettings, server: Option<String>) -> Self {
        Self {
            zone: None,
            server,
            use_builtin_ignore: settings.use_builtin_ignore,
            ignored_items: settings.ignored_items.iter().cloned().collect(),
            subscribers: Subscribers::default(),
            stats: LootStats::default(),
        }
    }

    pub fn subscribe(&mut self, subscriber: Box<dyn LootSubscriber>) {
        self.subscribers.push(subscriber);
    }

    pub fn zone(&self) -> Option<&str> {
        self.zone.as_deref()
    }

    pub fn server(&self) -> Option<&str> {
        self.server.as_deref()
    }

    pub fn stats(&self) -> LootStats {
        self.stats
    }

    pub fn is_ignored(&self, item: &str) -> bool {
        (self.use_builtin_ignore && BUILTIN_IGNORE.contains(item)) || self.ignored_items.contains(item)
    }

    pub fn handle_event(&mut self, event: &LogEvent) {
        match &event.kind {
            EventKind::Zone { name } => self.zone = Some(name.clone()),
            EventKind::LogOpen { server, .. } => {
                if server.is_some() {
                    self.server = server.clone();
                }
            }
            EventKind::Loot { item, mob, .. } => self.correlate(item, mob.as_deref(), event.timestamp),
            EventKind::Rot { item, source } => self.correlate(item, source.as_deref(), event.timestamp),
            _ => {}
        }
    }

    fn correlate(&mut self, item: &str, mob: Option<&str>, timestamp: NaiveDateTime) {
        if self.is_ignored(item) {
            self.stats.ignored_items += 1;
            return;
        }
        let (Some(zone), Some(mob)) = (self.zone.as_deref(), mob) else {
            tracing::trace!(item, "Loot without zone or corpse");
            self.stats.missing_context += 1;
            return;
        };

        let record = LootRecord {
            item: item.to_string(),
            mob: mob.to_string(),
            zone: zone.to_string(),
            server: self.server.clone(),
            timestamp,
        };
        self.stats.emitted += 1;
        self.subscribers.dispatch(&record);
    }
}

impl EventSubscriber for LootCorrelator {
    fn handle_event(&mut self, event: &LogEvent) {
        LootCorrelator::handle_event(self, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use chrono::NaiveDate;

    fn at(secs: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 3, 21)
            .unwrap()
            .and_hms_opt(20, 0, secs)
            .unwrap()
    }

    fn correlator() -> (LootCorrelator, Rc<RefCell<Vec<LootRecord>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut c = LootCorrelator::new(&LootSettings::default(), None);
        c.subscribe(Box::new(move |r: &LootRecord| sink.borrow_mut().push(r.clone())));
        (c, seen)
    }

    fn send(c: &mut LootCorrelator, secs: u32, kind: EventKind) {
        c.handle_event(&LogEvent::new(at(secs), kind));
    }

    fn loot(item: &str, mob: Option<&str>) -> EventKind {
        EventKind::Loot {
            looter: "Rumstil".into(),
            item: item.into(),
            mob: mob.map(str::to_string),
            quantity: 1,
        }
    }

    fn enter(c: &mut LootCorrelator) {
        send(
            c,
            0,
            EventKind::LogOpen {
                server: Some("erollisi".into()),
                player: "Rumstil".into(),
            },
        );
        send(
            c,
            1,
            EventKind::Zone {
                name: "Kael Drakkel".into(),
            },
        );
    }

    #[test]
    fn test_emits_with_context() {
        let (mut c, seen) = correlator();
        enter(&mut c);
        send(&mut c, 2, loot("Rune of Rikkukin", Some("Vulak`Aerr")));

        assert_eq!(
            *seen.borrow(),
            vec![LootRecord {
                item: "Rune of Rikkukin".into(),
                mob: "Vulak`Aerr".into(),
                zone: "Kael Drakkel".into(),
                server: Some("erollisi".into()),
                timestamp: at(2),
            }]
        );
        assert_eq!(c.stats().emitted, 1);
    }

    #[test]
    fn test_ignored_item_never_emits() {
        let (mut c, seen) = correlator();
        enter(&mut c);
        send(&mut c, 2, loot("Bone Chip", Some("a kobold")));
        assert!(seen.borrow().is_empty());

        send(&mut c, 3, loot("Bone Chipped Amulet", Some("a kobold")));
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(c.stats().ignored_items, 1);
    }

    #[test]
    fn test_missing_zone_or_mob_drops() {
        let (mut c, seen) = correlator();
        send(&mut c, 0, loot("Rune of Rikkukin", Some("Vulak`Aerr")));
        send(
            &mut c,
            1,
            EventKind::Zone {
                name: "Kael Drakkel".into(),
            },
        );
        send(&mut c, 2, loot("Rune of Rikkukin", None));
        send(
            &mut c,
            3,
            EventKind::Rot {
                source: None,
                item: "Rune of Rikkukin".into(),
            },
        );
        assert!(seen.borrow().is_empty());
        assert_eq!(c.stats().missing_context, 3);
    }

    #[test]
    fn test_rot_with_source_emits() {
        let (mut c, seen) = correlator();
        enter(&mut c);
        send(
            &mut c,
            2,
            EventKind::Rot {
                source: Some("a kobold".into()),
                item: "Kobold Ear Ring".into(),
            },
        );
        assert_eq!(seen.borrow()[0].mob, "a kobold");
    }

    #[test]
    fn test_configured_ignore_list() {
        let settings = LootSettings {
            use_builtin_ignore: false,
            ignored_items: vec!["Rune of Rikkukin".into()],
        };
        let c = LootCorrelator::new(&settings, None);
        assert!(c.is_ignored("Rune of Rikkukin"));
        assert!(!c.is_ignored("Bone Chip"));
    }

    #[test]
    fn test_zone_and_server_tracking() {
        let (mut c, _) = correlator();
        enter(&mut c);
        assert_eq!(c.zone(), Some("Kael Drakkel"));
        assert_eq!(c.server(), Some("erollisi"));

        // a log opened without a known server keeps the previous one
        send(
            &mut c,
            5,
            EventKind::LogOpen {
                server: None,
                player: "Rumstil".into(),
            },
        );
        assert_eq!(c.server(), Some("erollisi"));
    }

    #[test]
    fn test_standard_servers() {
        for name in ["test", "Beta", "STAGE"] {
            assert!(!is_standard_server(Some(name)), "{name}");
        }
        assert!(!is_standard_server(None));
        assert!(!is_standard_server(Some("")));
        assert!(is_standard_server(Some("erollisi")));
        assert!(is_standard_server(Some("Vox")));
    }
}
