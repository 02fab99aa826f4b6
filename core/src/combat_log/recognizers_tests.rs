//! Tests for the recognizer table
//!
//! One fixture per recognizer, checked for exclusivity against every other
//! recognizer, plus field extraction for each event kind.

use super::event::{EventKind, PartyStatus};
use super::recognizers::{LineContext, RECOGNIZERS, recognize};

const CTX: LineContext<'static> = LineContext {
    player: "Rumstil",
    server: Some("erollisi"),
};

/// (recognizer name, a line it must accept)
const FIXTURES: &[(&str, &str)] = &[
    ("melee", "A kobold hits YOU for 12 points of damage."),
    ("melee", "Soandso slashes a kobold for 1207 points of damage. (Critical)"),
    ("spell_damage", "You hit a kobold for 5210 points of fire damage by Ethereal Incineration."),
    ("dot_damage", "A kobold has taken 720 damage from your Bane of Rumstil Rk. II."),
    ("dot_damage", "A kobold has taken 300 damage from Nargul's Venom by Soandso."),
    ("miss", "A kobold tries to hit YOU, but YOU dodge!"),
    ("heal", "Soandso healed you for 4500 (12000) hit points by Word of Vivification."),
    ("heal", "Rumstil has healed itself over time for 300 hit points by Elixir of the Ardent."),
    ("heal_unattributed", "You have been healed for 180 points."),
    ("cast", "You begin casting Complete Heal."),
    ("cast", "Soandso begins singing Spirit of Vesagran."),
    ("cast_hidden", "Soandso begins to cast a spell. <Complete Heal>"),
    ("chat", "Soandso tells the group, 'incoming'"),
    ("chat", "Guard Hanlon says, 'Hail, citizen.'"),
    ("chat", "You told Soandso, '[queued], hey there'"),
    ("chat", "Soandso tells general:3, 'WTS Rune of Rikkukin'"),
    ("death", "A kobold has been slain by Soandso!"),
    ("death", "You have slain a kobold!"),
    ("death", "Soandso died."),
    ("loot", "--You have looted a Bone Chip from a kobold's corpse.--"),
    ("loot", "--Soandso has looted 2 Diamond Coins from Vulak`Aerr's corpse.--"),
    (
        "rot",
        "No one was interested in the 1 item(s): Rusty Dagger. These items can be randomed again or will be available to everyone after the corpse unlocks.",
    ),
    ("con", "a kobold scowls at you, ready to attack -- what would you like your tombstone to say? (Lvl: 3)"),
    ("con", "Xebab regards you as an ally -- looks kind of dangerous."),
    ("who", "[110 Arch Convoker (Magician)] Soandso (Halfling) <Force of Will> ZONE: pok"),
    ("who", "[ANONYMOUS] Soandso"),
    ("party", "Soandso has joined the group."),
    ("party", "You have left the raid."),
    ("zone", "You have entered The Plane of Knowledge."),
    ("log_open", "Welcome to EverQuest!"),
];

fn accepted_by(text: &str) -> Vec<&'static str> {
    RECOGNIZERS
        .iter()
        .filter(|r| (r.parse)(text, &CTX).is_some())
        .map(|r| r.name)
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Table invariants
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_every_fixture_accepted_by_exactly_its_recognizer() {
    for (name, line) in FIXTURES {
        assert_eq!(accepted_by(line), vec![*name], "line: {line}");
    }
}

#[test]
fn test_every_recognizer_has_a_fixture() {
    for r in RECOGNIZERS {
        assert!(
            FIXTURES.iter().any(|(name, _)| *name == r.name),
            "no fixture for {}",
            r.name
        );
    }
}

#[test]
fn test_unmatched_text_is_rejected_by_all() {
    for line in [
        "You are out of food and drink.",
        "Your target is out of range, get closer!",
        "You have entered an area where levitation effects do not function.",
        "You have entered an Arena (PvP) area.",
        "",
    ] {
        assert!(accepted_by(line).is_empty(), "line: {line}");
        assert_eq!(recognize(line, &CTX), None);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Field extraction
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_melee_substitutes_player() {
    let kind = recognize("A kobold hits YOU for 12 points of damage.", &CTX).unwrap();
    assert_eq!(
        kind,
        EventKind::Hit {
            source: "A kobold".into(),
            target: "Rumstil".into(),
            amount: 12,
            damage_type: None,
            spell: None,
        }
    );
}

#[test]
fn test_spell_damage_fields() {
    let kind = recognize(
        "Soandso hit a kobold for 5210 points of fire damage by Ethereal Incineration Rk. II. (Critical)",
        &CTX,
    )
    .unwrap();
    let EventKind::Hit { source, damage_type, spell, amount, .. } = kind else {
        panic!("expected hit");
    };
    assert_eq!(source, "Soandso");
    assert_eq!(amount, 5210);
    assert_eq!(damage_type.as_deref(), Some("fire"));
    assert_eq!(spell.as_deref(), Some("Ethereal Incineration Rk. II"));
}

#[test]
fn test_own_dot_is_attributed_to_player() {
    let kind = recognize("A kobold has taken 720 damage from your Bane of Rumstil.", &CTX).unwrap();
    let EventKind::Hit { source, target, spell, .. } = kind else {
        panic!("expected hit");
    };
    assert_eq!(source, "Rumstil");
    assert_eq!(target, "A kobold");
    assert_eq!(spell.as_deref(), Some("Bane of Rumstil"));
}

#[test]
fn test_miss_defense_strips_target() {
    let kind = recognize("A kobold tries to hit YOU, but YOU dodge!", &CTX).unwrap();
    assert_eq!(
        kind,
        EventKind::Miss {
            source: "A kobold".into(),
            target: "Rumstil".into(),
            verb: "hit".into(),
            defense: "dodge".into(),
        }
    );

    let kind = recognize("Soandso tries to slash a kobold, but misses!", &CTX).unwrap();
    let EventKind::Miss { defense, .. } = kind else {
        panic!("expected miss");
    };
    assert_eq!(defense, "misses");
}

#[test]
fn test_heal_reflexive_target_is_source() {
    let kind = recognize(
        "Soandso has healed itself over time for 300 hit points by Elixir of the Ardent.",
        &CTX,
    )
    .unwrap();
    assert_eq!(
        kind,
        EventKind::Heal {
            source: Some("Soandso".into()),
            target: "Soandso".into(),
            spell: Some("Elixir of the Ardent".into()),
            amount: 300,
        }
    );
}

#[test]
fn test_heal_without_spell() {
    let kind = recognize("Soandso healed you for 100 hit points.", &CTX).unwrap();
    let EventKind::Heal { target, spell, .. } = kind else {
        panic!("expected heal");
    };
    assert_eq!(target, "Rumstil");
    assert_eq!(spell, None);
}

#[test]
fn test_unattributed_heal_has_no_source() {
    let kind = recognize("You have been healed for 180 points.", &CTX).unwrap();
    let EventKind::Heal { source, target, .. } = kind else {
        panic!("expected heal");
    };
    assert_eq!(source, None);
    assert_eq!(target, "Rumstil");
}

#[test]
fn test_cast_keeps_rank() {
    let kind = recognize("You begin casting Complete Heal Rk. II.", &CTX).unwrap();
    assert_eq!(
        kind,
        EventKind::Cast {
            source: "Rumstil".into(),
            spell: "Complete Heal Rk. II".into(),
        }
    );
}

#[test]
fn test_chat_channels() {
    let cases = [
        ("Soandso tells the group, 'incoming'", "group", "Soandso"),
        ("Soandso tells the raid,  'stack up'", "raid", "Soandso"),
        ("Soandso tells you, 'hi'", "tell", "Soandso"),
        ("You say to your guild, 'grats'", "guild", "Rumstil"),
        ("Soandso shouts, 'train to zone'", "shout", "Soandso"),
        ("Soandso tells General:3, 'hi'", "general", "Soandso"),
        ("Xebab says 'Following you, Master.'", "say", "Xebab"),
        ("Guard Hanlon says, 'Hail, citizen.'", "say", "Guard Hanlon"),
    ];
    for (line, channel, speaker) in cases {
        let Some(EventKind::Chat { channel: c, source, .. }) = recognize(line, &CTX) else {
            panic!("not chat: {line}");
        };
        assert_eq!(c, channel, "line: {line}");
        assert_eq!(source, speaker, "line: {line}");
    }
}

#[test]
fn test_chat_message_keeps_inner_quotes() {
    let Some(EventKind::Chat { message, .. }) =
        recognize("Soandso says, 'it's a trap, don't pull'", &CTX)
    else {
        panic!("not chat");
    };
    assert_eq!(message, "it's a trap, don't pull");
}

#[test]
fn test_death_forms() {
    assert_eq!(
        recognize("You have been slain by a kobold!", &CTX),
        Some(EventKind::Death {
            name: "Rumstil".into(),
            killer: Some("a kobold".into()),
        })
    );
    assert_eq!(
        recognize("You have slain a kobold!", &CTX),
        Some(EventKind::Death {
            name: "a kobold".into(),
            killer: Some("Rumstil".into()),
        })
    );
    assert_eq!(
        recognize("Soandso died.", &CTX),
        Some(EventKind::Death {
            name: "Soandso".into(),
            killer: None,
        })
    );
}

#[test]
fn test_loot_fields() {
    assert_eq!(
        recognize("--Soandso has looted 2 Diamond Coins from Vulak`Aerr's corpse.--", &CTX),
        Some(EventKind::Loot {
            looter: "Soandso".into(),
            item: "Diamond Coins".into(),
            mob: Some("Vulak`Aerr".into()),
            quantity: 2,
        })
    );
    assert_eq!(
        recognize("--You have looted an Ancient Scale.--", &CTX),
        Some(EventKind::Loot {
            looter: "Rumstil".into(),
            item: "Ancient Scale".into(),
            mob: None,
            quantity: 1,
        })
    );
}

#[test]
fn test_con_level_and_faction() {
    let kind = recognize(
        "a kobold scowls at you, ready to attack -- what would you like your tombstone to say? (Lvl: 3)",
        &CTX,
    )
    .unwrap();
    assert_eq!(
        kind,
        EventKind::Con {
            name: "a kobold".into(),
            level: Some(3),
            faction: "scowls at you, ready to attack".into(),
        }
    );
}

#[test]
fn test_con_phrase_inside_chat_is_chat() {
    let kind = recognize("Soandso says, 'a kobold regards you as an ally'", &CTX).unwrap();
    assert_eq!(kind.name(), "chat");
}

#[test]
fn test_who_class_from_title() {
    let kind = recognize(
        "[110 Arch Convoker (Magician)] Soandso (Halfling) <Force of Will> ZONE: pok",
        &CTX,
    )
    .unwrap();
    assert_eq!(
        kind,
        EventKind::Who {
            name: "Soandso".into(),
            level: Some(110),
            class: Some("Magician".into()),
            race: Some("Halfling".into()),
            guild: Some("Force of Will".into()),
        }
    );

    let Some(EventKind::Who { class, level, .. }) = recognize("[60 Cleric] Healbot (Dwarf)", &CTX)
    else {
        panic!("not who");
    };
    assert_eq!(class.as_deref(), Some("Cleric"));
    assert_eq!(level, Some(60));
}

#[test]
fn test_party_status() {
    assert_eq!(
        recognize("You have left the raid.", &CTX),
        Some(EventKind::Party {
            name: "Rumstil".into(),
            status: PartyStatus::LeftRaid,
        })
    );
    assert_eq!(
        recognize("Soandso has joined the group.", &CTX),
        Some(EventKind::Party {
            name: "Soandso".into(),
            status: PartyStatus::JoinedGroup,
        })
    );
}

#[test]
fn test_log_open_carries_context() {
    assert_eq!(
        recognize("Welcome to EverQuest!", &CTX),
        Some(EventKind::LogOpen {
            server: Some("erollisi".into()),
            player: "Rumstil".into(),
        })
    );
}
