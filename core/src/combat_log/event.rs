use chrono::NaiveDateTime;

/// One classified log line.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub timestamp: NaiveDateTime,
    pub kind: EventKind,
}

impl LogEvent {
    pub fn new(timestamp: NaiveDateTime, kind: EventKind) -> Self {
        Self { timestamp, kind }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyStatus {
    JoinedGroup,
    LeftGroup,
    JoinedRaid,
    LeftRaid,
}

/// Every kind of line the classifier understands. Each line maps to exactly
/// one variant; lines no recognizer accepts become `RawText`.
///
/// Names are as printed except that self references ("You", "yourself")
/// are replaced by the logging player's name.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    RawText {
        text: String,
        /// Logging player at the time the line was classified.
        player: String,
    },
    LogOpen {
        server: Option<String>,
        player: String,
    },
    Who {
        name: String,
        level: Option<u8>,
        class: Option<String>,
        race: Option<String>,
        guild: Option<String>,
    },
    Con {
        name: String,
        level: Option<u8>,
        faction: String,
    },
    Party {
        name: String,
        status: PartyStatus,
    },
    Chat {
        /// Lowercase channel: "tell", "say", "shout", "group", "guild", "raid",
        /// "fellowship", "ooc", "auction", or a custom channel name.
        channel: String,
        source: String,
        message: String,
    },
    Heal {
        /// Absent when the game does not name the healer.
        source: Option<String>,
        target: String,
        spell: Option<String>,
        amount: u32,
    },
    Cast {
        source: String,
        spell: String,
    },
    Hit {
        source: String,
        target: String,
        amount: u32,
        /// Resist type of spell damage ("fire", "magic", ...); `None` for melee.
        damage_type: Option<String>,
        spell: Option<String>,
    },
    Miss {
        source: String,
        target: String,
        verb: String,
        /// "misses", "dodges", "parries", ...
        defense: String,
    },
    Death {
        name: String,
        killer: Option<String>,
    },
    Loot {
        looter: String,
        item: String,
        /// Corpse the item came from, without the corpse suffix.
        mob: Option<String>,
        quantity: u32,
    },
    Rot {
        source: Option<String>,
        item: String,
    },
    Zone {
        name: String,
    },
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::RawText { .. } => "raw_text",
            EventKind::LogOpen { .. } => "log_open",
            EventKind::Who { .. } => "who",
            EventKind::Con { .. } => "con",
            EventKind::Party { .. } => "party",
            EventKind::Chat { .. } => "chat",
            EventKind::Heal { .. } => "heal",
            EventKind::Cast { .. } => "cast",
            EventKind::Hit { .. } => "hit",
            EventKind::Miss { .. } => "miss",
            EventKind::Death { .. } => "death",
            EventKind::Loot { .. } => "loot",
            EventKind::Rot { .. } => "rot",
            EventKind::Zone { .. } => "zone",
        }
    }
}
