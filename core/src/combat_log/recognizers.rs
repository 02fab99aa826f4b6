//! Line recognizers
//!
//! Every recognizer is a pure function from message text to an optional
//! [`EventKind`]. They are tried in table order and the first hit wins, so
//! the table is ordered by how often each kind shows up in a raid log:
//!
//! ```text
//!   melee ─► spell_damage ─► dot_damage ─► miss ─► heal ─► ... ─► log_open
//!     │           │               │          │       │
//!     └───────────┴───── first Some(..) returned ────┘   none ─► RawText
//! ```
//!
//! The patterns are written so that no two recognizers accept the same line.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::event::{EventKind, PartyStatus};

/// Names the recognizers need to resolve self references.
#[derive(Debug, Clone, Copy)]
pub struct LineContext<'a> {
    pub player: &'a str,
    pub server: Option<&'a str>,
}

impl LineContext<'_> {
    /// Replace second-person references with the logging player's name.
    fn actor(&self, raw: &str) -> String {
        match raw {
            "You" | "you" | "YOU" | "yourself" | "Yourself" | "YOURSELF" => self.player.to_string(),
            _ => raw.to_string(),
        }
    }
}

pub struct Recognizer {
    pub name: &'static str,
    pub parse: fn(&str, &LineContext<'_>) -> Option<EventKind>,
}

pub static RECOGNIZERS: &[Recognizer] = &[
    Recognizer { name: "melee", parse: parse_melee },
    Recognizer { name: "spell_damage", parse: parse_spell_damage },
    Recognizer { name: "dot_damage", parse: parse_dot_damage },
    Recognizer { name: "miss", parse: parse_miss },
    Recognizer { name: "heal", parse: parse_heal },
    Recognizer { name: "heal_unattributed", parse: parse_unattributed_heal },
    Recognizer { name: "cast", parse: parse_cast },
    Recognizer { name: "cast_hidden", parse: parse_hidden_cast },
    Recognizer { name: "chat", parse: parse_chat },
    Recognizer { name: "death", parse: parse_death },
    Recognizer { name: "loot", parse: parse_loot },
    Recognizer { name: "rot", parse: parse_rot },
    Recognizer { name: "con", parse: parse_con },
    Recognizer { name: "who", parse: parse_who },
    Recognizer { name: "party", parse: parse_party },
    Recognizer { name: "zone", parse: parse_zone },
    Recognizer { name: "log_open", parse: parse_log_open },
];

/// Run the table against `text`, returning the first match.
pub fn recognize(text: &str, ctx: &LineContext<'_>) -> Option<EventKind> {
    RECOGNIZERS.iter().find_map(|r| (r.parse)(text, ctx))
}

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap()
}

/// Optional trailing modifier list such as " (Critical)" or " (Lucky Crippling Blow)".
const MODIFIERS: &str = r"(?: \([^)]*\))?";

// ─────────────────────────────────────────────────────────────────────────────
// Damage
// ─────────────────────────────────────────────────────────────────────────────

const MELEE_VERBS: &str = "hits?|slash(?:es)?|pierces?|crush(?:es)?|punch(?:es)?|kicks?|bash(?:es)?|\
backstabs?|bites?|claws?|gores?|stings?|mauls?|slams?|strikes?|smash(?:es)?|shoots?|stabs?|rends?|\
sweeps?|frenz(?:y|ies) on";

static MELEE: LazyLock<Regex> = LazyLock::new(|| {
    regex(&format!(
        r"^(?P<src>.+?) (?:{MELEE_VERBS}) (?P<tgt>.+?) for (?P<amt>\d+) points? of damage\.{MODIFIERS}$"
    ))
});

static SPELL_DAMAGE: LazyLock<Regex> = LazyLock::new(|| {
    regex(&format!(
        r"^(?P<src>.+?) hit (?P<tgt>.+?) for (?P<amt>\d+) points? of (?P<kind>[\w-]+) damage by (?P<spell>.+?)\.{MODIFIERS}$"
    ))
});

static DOT_DAMAGE: LazyLock<Regex> = LazyLock::new(|| {
    regex(&format!(
        r"^(?P<tgt>.+?) (?:has|have) taken (?P<amt>\d+) damage from (?:your (?P<own>.+?)|(?P<spell>.+?) by (?P<src>.+?))\.{MODIFIERS}$"
    ))
});

fn parse_melee(text: &str, ctx: &LineContext<'_>) -> Option<EventKind> {
    let caps = MELEE.captures(text)?;
    Some(EventKind::Hit {
        source: ctx.actor(&caps["src"]),
        target: ctx.actor(&caps["tgt"]),
        amount: caps["amt"].parse().ok()?,
        damage_type: None,
        spell: None,
    })
}

fn parse_spell_damage(text: &str, ctx: &LineContext<'_>) -> Option<EventKind> {
    let caps = SPELL_DAMAGE.captures(text)?;
    Some(EventKind::Hit {
        source: ctx.actor(&caps["src"]),
        target: ctx.actor(&caps["tgt"]),
        amount: caps["amt"].parse().ok()?,
        damage_type: Some(caps["kind"].to_string()),
        spell: Some(caps["spell"].to_string()),
    })
}

fn parse_dot_damage(text: &str, ctx: &LineContext<'_>) -> Option<EventKind> {
    let caps = DOT_DAMAGE.captures(text)?;
    let (source, spell) = match caps.name("own") {
        Some(own) => (ctx.player.to_string(), own.as_str()),
        None => (ctx.actor(&caps["src"]), caps.name("spell")?.as_str()),
    };
    Some(EventKind::Hit {
        source,
        target: ctx.actor(&caps["tgt"]),
        amount: caps["amt"].parse().ok()?,
        damage_type: None,
        spell: Some(spell.to_string()),
    })
}

static MISS: LazyLock<Regex> = LazyLock::new(|| {
    regex(&format!(
        r"^(?P<src>.+?) tr(?:y|ies) to (?P<verb>\w+(?: on)?) (?P<tgt>.+?), but (?P<def>.+?)!{MODIFIERS}$"
    ))
});

fn parse_miss(text: &str, ctx: &LineContext<'_>) -> Option<EventKind> {
    let caps = MISS.captures(text)?;
    let target = &caps["tgt"];
    let def = &caps["def"];
    // "but YOU dodge" / "but a kobold parries": keep only the defense itself
    let defense = def
        .strip_prefix(target)
        .map(str::trim_start)
        .filter(|d| !d.is_empty())
        .unwrap_or(def);
    Some(EventKind::Miss {
        source: ctx.actor(&caps["src"]),
        target: ctx.actor(target),
        verb: caps["verb"].to_string(),
        defense: defense.to_string(),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Healing and casting
// ─────────────────────────────────────────────────────────────────────────────

static HEAL: LazyLock<Regex> = LazyLock::new(|| {
    regex(&format!(
        r"^(?P<src>.+?) (?:has |have )?healed (?P<tgt>.+?)(?: over time)? for (?P<amt>\d+)(?: \(\d+\))? hit points?(?: by (?P<spell>.+?))?\.{MODIFIERS}$"
    ))
});

static UNATTRIBUTED_HEAL: LazyLock<Regex> = LazyLock::new(|| {
    regex(r"^You have been healed for (?P<amt>\d+) (?:hit )?points?(?: by (?P<spell>.+?))?\.$")
});

fn parse_heal(text: &str, ctx: &LineContext<'_>) -> Option<EventKind> {
    let caps = HEAL.captures(text)?;
    let source = ctx.actor(&caps["src"]);
    let target = match &caps["tgt"] {
        "itself" | "himself" | "herself" | "themselves" => source.clone(),
        other => ctx.actor(other),
    };
    Some(EventKind::Heal {
        source: Some(source),
        target,
        spell: caps.name("spell").map(|m| m.as_str().to_string()),
        amount: caps["amt"].parse().ok()?,
    })
}

fn parse_unattributed_heal(text: &str, ctx: &LineContext<'_>) -> Option<EventKind> {
    let caps = UNATTRIBUTED_HEAL.captures(text)?;
    Some(EventKind::Heal {
        source: None,
        target: ctx.player.to_string(),
        spell: caps.name("spell").map(|m| m.as_str().to_string()),
        amount: caps["amt"].parse().ok()?,
    })
}

static CAST: LazyLock<Regex> =
    LazyLock::new(|| regex(r"^(?P<src>.+?) begins? (?:casting|singing) (?P<spell>.+?)\.$"));

static HIDDEN_CAST: LazyLock<Regex> = LazyLock::new(|| {
    regex(r"^(?P<src>.+?) begins to (?:cast a spell|sing a song)\. <(?P<spell>.+)>$")
});

fn parse_cast(text: &str, ctx: &LineContext<'_>) -> Option<EventKind> {
    cast_from(CAST.captures(text)?, ctx)
}

fn parse_hidden_cast(text: &str, ctx: &LineContext<'_>) -> Option<EventKind> {
    cast_from(HIDDEN_CAST.captures(text)?, ctx)
}

fn cast_from(caps: Captures<'_>, ctx: &LineContext<'_>) -> Option<EventKind> {
    Some(EventKind::Cast {
        source: ctx.actor(&caps["src"]),
        spell: caps["spell"].to_string(),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat
// ─────────────────────────────────────────────────────────────────────────────

static CHAT: LazyLock<Regex> = LazyLock::new(|| {
    regex(
        r"^(?P<src>.+?) (?P<verb>says out of character|says|shouts|auctions|tells you|tells the (?:group|guild|raid|fellowship)|tells [^\s,']+:\d+|say out of character|say to your (?:guild|raid)|say|shout|auction|tell your (?:party|raid)|tell [^\s,']+:\d+|told [^,']+),?\s*'(?P<msg>.*)'$",
    )
});

/// Lowercase channel implied by the chat verb.
fn chat_channel(verb: &str) -> String {
    let channel = match verb {
        "says" | "say" => "say",
        "shouts" | "shout" => "shout",
        "auctions" | "auction" => "auction",
        "says out of character" | "say out of character" => "ooc",
        "tells you" => "tell",
        "tells the group" | "tell your party" => "group",
        "tells the guild" | "say to your guild" => "guild",
        "tells the raid" | "tell your raid" | "say to your raid" => "raid",
        "tells the fellowship" => "fellowship",
        v if v.starts_with("told ") => "tell",
        v => {
            // "tells general:3" / "tell general:3"
            let name = v.split_once(' ').map_or(v, |(_, rest)| rest);
            let name = name.split_once(':').map_or(name, |(chan, _)| chan);
            return name.to_lowercase();
        }
    };
    channel.to_string()
}

fn parse_chat(text: &str, ctx: &LineContext<'_>) -> Option<EventKind> {
    let caps = CHAT.captures(text)?;
    Some(EventKind::Chat {
        channel: chat_channel(&caps["verb"]),
        source: ctx.actor(&caps["src"]),
        message: caps["msg"].to_string(),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Deaths, loot
// ─────────────────────────────────────────────────────────────────────────────

static SLAIN_BY: LazyLock<Regex> =
    LazyLock::new(|| regex(r"^(?P<victim>.+?) (?:has|have) been slain by (?P<killer>.+?)!$"));
static YOU_SLEW: LazyLock<Regex> = LazyLock::new(|| regex(r"^You have slain (?P<victim>.+?)!$"));
static DIED: LazyLock<Regex> = LazyLock::new(|| regex(r"^(?P<victim>.+?) died\.$"));

fn parse_death(text: &str, ctx: &LineContext<'_>) -> Option<EventKind> {
    if let Some(caps) = SLAIN_BY.captures(text) {
        return Some(EventKind::Death {
            name: ctx.actor(&caps["victim"]),
            killer: Some(ctx.actor(&caps["killer"])),
        });
    }
    if let Some(caps) = YOU_SLEW.captures(text) {
        return Some(EventKind::Death {
            name: caps["victim"].to_string(),
            killer: Some(ctx.player.to_string()),
        });
    }
    let caps = DIED.captures(text)?;
    Some(EventKind::Death {
        name: ctx.actor(&caps["victim"]),
        killer: None,
    })
}

static LOOT: LazyLock<Regex> = LazyLock::new(|| {
    regex(
        r"^--(?P<looter>.+?) (?:has|have) looted (?P<qty>an?|\d+) (?P<item>.+?)(?: from (?P<mob>.+?)(?:'s|`s) corpse)?\.--$",
    )
});

fn parse_loot(text: &str, ctx: &LineContext<'_>) -> Option<EventKind> {
    let caps = LOOT.captures(text)?;
    let quantity = match &caps["qty"] {
        "a" | "an" => 1,
        n => n.parse().ok()?,
    };
    Some(EventKind::Loot {
        looter: ctx.actor(&caps["looter"]),
        item: caps["item"].to_string(),
        mob: caps.name("mob").map(|m| m.as_str().to_string()),
        quantity,
    })
}

static ROT: LazyLock<Regex> = LazyLock::new(|| {
    regex(
        r"^No one was interested in the \d+ item\(s\): (?P<item>.+?)\. These items can be randomed again or will be available to everyone after the corpse unlocks\.$",
    )
});

fn parse_rot(text: &str, _ctx: &LineContext<'_>) -> Option<EventKind> {
    let caps = ROT.captures(text)?;
    Some(EventKind::Rot {
        source: None,
        item: caps["item"].to_string(),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Consider, who, party, zone
// ─────────────────────────────────────────────────────────────────────────────

static CON: LazyLock<Regex> = LazyLock::new(|| {
    regex(
        r"^(?P<name>.+?) (?P<faction>regards you as an ally|looks upon you warmly|kindly considers you|judges you amiably|regards you indifferently|looks your way apprehensively|glowers at you dubiously|glares at you threateningly|scowls at you, ready to attack)(?: -- [^'(]+?)?(?: \(Lvl: (?P<level>\d+)\))?$",
    )
});

fn parse_con(text: &str, ctx: &LineContext<'_>) -> Option<EventKind> {
    let caps = CON.captures(text)?;
    Some(EventKind::Con {
        name: ctx.actor(&caps["name"]),
        level: caps.name("level").and_then(|m| m.as_str().parse().ok()),
        faction: caps["faction"].to_string(),
    })
}

static WHO: LazyLock<Regex> = LazyLock::new(|| {
    regex(
        r"^\[(?:(?P<level>\d+) (?P<title>[^\]]+)|ANONYMOUS)\] (?P<name>[A-Za-z]+)(?: \((?P<race>[^)]+)\))?(?: <(?P<guild>[^>]+)>)?(?: .*)?$",
    )
});

fn parse_who(text: &str, _ctx: &LineContext<'_>) -> Option<EventKind> {
    let caps = WHO.captures(text)?;
    // "Arch Convoker (Magician)" carries the class in parentheses
    let class = caps.name("title").map(|m| {
        let title = m.as_str();
        title
            .strip_suffix(')')
            .and_then(|t| t.rsplit_once(" ("))
            .map_or(title, |(_, class)| class)
            .to_string()
    });
    Some(EventKind::Who {
        name: caps["name"].to_string(),
        level: caps.name("level").and_then(|m| m.as_str().parse().ok()),
        class,
        race: caps.name("race").map(|m| m.as_str().to_string()),
        guild: caps.name("guild").map(|m| m.as_str().to_string()),
    })
}

static PARTY: LazyLock<Regex> = LazyLock::new(|| {
    regex(r"^(?P<name>.+?) (?:has|have) (?P<action>joined|left) the (?P<kind>group|raid)\.$")
});

fn parse_party(text: &str, ctx: &LineContext<'_>) -> Option<EventKind> {
    let caps = PARTY.captures(text)?;
    let status = match (&caps["action"], &caps["kind"]) {
        ("joined", "group") => PartyStatus::JoinedGroup,
        ("left", "group") => PartyStatus::LeftGroup,
        ("joined", _) => PartyStatus::JoinedRaid,
        _ => PartyStatus::LeftRaid,
    };
    Some(EventKind::Party {
        name: ctx.actor(&caps["name"]),
        status,
    })
}

static ZONE: LazyLock<Regex> = LazyLock::new(|| regex(r"^You have entered (?P<zone>.+?)\.$"));

/// "You have entered ..." messages that are not zone changes.
const NOT_ZONES: &[&str] = &["an area where", "an Arena (PvP) area", "the Drunken Monkey stance"];

fn parse_zone(text: &str, _ctx: &LineContext<'_>) -> Option<EventKind> {
    let caps = ZONE.captures(text)?;
    let zone = &caps["zone"];
    if NOT_ZONES.iter().any(|p| zone.starts_with(p)) {
        return None;
    }
    Some(EventKind::Zone {
        name: zone.to_string(),
    })
}

fn parse_log_open(text: &str, ctx: &LineContext<'_>) -> Option<EventKind> {
    (text == "Welcome to EverQuest!").then(|| EventKind::LogOpen {
        server: ctx.server.map(str::to_string),
        player: ctx.player.to_string(),
    })
}
