use serde::{Deserialize, Serialize};

/// Playable classes, in the column order of the spell table's level fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Class {
    Warrior,
    Cleric,
    Paladin,
    Ranger,
    ShadowKnight,
    Druid,
    Monk,
    Bard,
    Rogue,
    Shaman,
    Necromancer,
    Wizard,
    Magician,
    Enchanter,
    Beastlord,
    Berserker,
}

impl Class {
    pub const ALL: [Class; 16] = [
        Class::Warrior,
        Class::Cleric,
        Class::Paladin,
        Class::Ranger,
        Class::ShadowKnight,
        Class::Druid,
        Class::Monk,
        Class::Bard,
        Class::Rogue,
        Class::Shaman,
        Class::Necromancer,
        Class::Wizard,
        Class::Magician,
        Class::Enchanter,
        Class::Beastlord,
        Class::Berserker,
    ];

    pub fn from_index(index: usize) -> Option<Class> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Bit in a `SpellRecord::classes` mask.
    pub fn bit(self) -> u16 {
        1 << self.index()
    }

    pub fn name(self) -> &'static str {
        match self {
            Class::Warrior => "Warrior",
            Class::Cleric => "Cleric",
            Class::Paladin => "Paladin",
            Class::Ranger => "Ranger",
            Class::ShadowKnight => "Shadow Knight",
            Class::Druid => "Druid",
            Class::Monk => "Monk",
            Class::Bard => "Bard",
            Class::Rogue => "Rogue",
            Class::Shaman => "Shaman",
            Class::Necromancer => "Necromancer",
            Class::Wizard => "Wizard",
            Class::Magician => "Magician",
            Class::Enchanter => "Enchanter",
            Class::Beastlord => "Beastlord",
            Class::Berserker => "Berserker",
        }
    }

    /// Parse a class name as printed by the game. Accepts both "Shadow Knight"
    /// and "Shadowknight".
    pub fn parse(name: &str) -> Option<Class> {
        let squashed: String = name
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.name().replace(' ', "").to_ascii_lowercase() == squashed)
    }

    /// Classes whose bit is set in `mask`.
    pub fn from_mask(mask: u16) -> impl Iterator<Item = Class> {
        Self::ALL.into_iter().filter(move |c| mask & c.bit() != 0)
    }
}

impl std::fmt::Display for Class {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
