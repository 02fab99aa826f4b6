//! Static spell metadata
//!
//! Loaded from two caret-delimited tables shipped with the game client:
//! - **Definitions** (`spells_us.txt`): id, name, targeting, duration and the
//!   per-class minimum casting level columns
//! - **Display strings** (`spells_us_str.txt`): the landed-on-self and
//!   landed-on-others texts, keyed by the same id
//!
//! Spell tiers ("Rk. II", "III", "(3)") share their targeting and landed
//! texts, so only the first-loaded rank of each canonical name is kept.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use encoding_rs::WINDOWS_1252;
use eqlog_types::SpellTableLayout;
use hashbrown::HashMap;
use regex::Regex;

use super::Class;

/// Target type codes used by the definitions table.
pub mod target_type {
    pub const SINGLE: u16 = 5;
    pub const SELF: u16 = 6;
    pub const GROUP: u16 = 41;
    pub const PET: u16 = 14;
}

static RANK_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+(?:\(\d+\)|\d+|Rk\.\s*[IVXLC]+|[IVXLC]+)$").expect("valid rank pattern")
});

/// Strip a trailing rank marker from a spell name.
///
/// ```
/// use eqlog_core::game_data::canonical_spell_name;
/// assert_eq!(canonical_spell_name("Spirit of Vesagran Rk. III"), "Spirit of Vesagran");
/// assert_eq!(canonical_spell_name("Complete Heal"), "Complete Heal");
/// ```
pub fn canonical_spell_name(name: &str) -> &str {
    let name = name.trim();
    match RANK_SUFFIX.find(name) {
        Some(m) => &name[..m.start()],
        None => name,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellRecord {
    pub id: u32,
    /// Rank-stripped name; the key of the name index.
    pub name: String,
    /// Name exactly as it appeared in the table.
    pub display_name: String,
    /// One bit per `Class` that can cast the spell.
    pub classes: u16,
    pub class_count: u8,
    pub target_type: u16,
    /// Base buff duration in 6 second ticks.
    pub duration_ticks: u32,
    pub landed_on_self: Option<String>,
    pub landed_on_others: Option<String>,
}

impl SpellRecord {
    pub fn is_pet_target(&self) -> bool {
        self.target_type == target_type::PET
    }

    pub fn can_cast(&self, class: Class) -> bool {
        self.classes & class.bit() != 0
    }

    pub fn eligible_classes(&self) -> impl Iterator<Item = Class> {
        Class::from_mask(self.classes)
    }

    /// The caster's class, when exactly one class can cast this spell.
    pub fn single_class(&self) -> Option<Class> {
        if self.class_count != 1 {
            return None;
        }
        self.eligible_classes().next()
    }
}

/// Counters from the last load, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpellLoadStats {
    pub rows: usize,
    pub retained: usize,
    pub malformed: usize,
    pub uncastable: usize,
    pub duplicate_ranks: usize,
    pub strings_attached: usize,
}

enum RowRejection {
    Malformed,
    Uncastable,
}

/// Spell metadata indexed by id and by canonical name.
///
/// Lookups during a `reload` are not supported; the engine is single-threaded.
#[derive(Debug, Clone, Default)]
pub struct SpellReference {
    layout: SpellTableLayout,
    records: Vec<SpellRecord>,
    by_id: HashMap<u32, usize>,
    by_name: HashMap<String, usize>,
    stats: SpellLoadStats,
}

impl SpellReference {
    pub fn new(layout: SpellTableLayout) -> Self {
        Self {
            layout,
            ..Default::default()
        }
    }

    /// Load the definitions table at `path` and its companion strings table.
    /// Missing or unreadable files leave the reference empty.
    pub fn load(path: &Path) -> Self {
        Self::load_with_layout(path, SpellTableLayout::default())
    }

    pub fn load_with_layout(path: &Path, layout: SpellTableLayout) -> Self {
        let mut reference = Self::new(layout);
        reference.reload(path);
        reference
    }

    /// Rebuild both indices from disk. The new indices replace the old ones
    /// in a single assignment once fully built.
    pub fn reload(&mut self, path: &Path) {
        let Some(spells) = read_table(path) else {
            tracing::warn!(path = %path.display(), "Spell table missing, spell lookups disabled");
            *self = Self::new(self.layout.clone());
            return;
        };

        let strings = strings_path(path, &self.layout).and_then(|p| {
            let table = read_table(&p);
            if table.is_none() {
                tracing::debug!(path = %p.display(), "No spell strings table");
            }
            table
        });

        let fresh = Self::from_tables(&spells, strings.as_deref(), self.layout.clone());
        tracing::info!(
            path = %path.display(),
            retained = fresh.stats.retained,
            malformed = fresh.stats.malformed,
            strings = fresh.stats.strings_attached,
            "Loaded spell reference"
        );
        *self = fresh;
    }

    /// Build from in-memory table contents.
    pub fn from_tables(spells: &str, strings: Option<&str>, layout: SpellTableLayout) -> Self {
        let mut reference = Self::new(layout.clone());

        for line in data_lines(spells, &layout.comment_prefix) {
            reference.stats.rows += 1;
            match parse_spell_row(line, &layout) {
                Ok(record) => reference.insert(record),
                Err(RowRejection::Malformed) => {
                    reference.stats.malformed += 1;
                    tracing::debug!(row = line, "Skipping malformed spell row");
                }
                Err(RowRejection::Uncastable) => reference.stats.uncastable += 1,
            }
        }

        if let Some(strings) = strings {
            reference.attach_strings(strings);
        }

        reference
    }

    fn insert(&mut self, record: SpellRecord) {
        // First-loaded rank wins
        if self.by_name.contains_key(&record.name) {
            self.stats.duplicate_ranks += 1;
            return;
        }
        let idx = self.records.len();
        self.by_id.insert(record.id, idx);
        self.by_name.insert(record.name.clone(), idx);
        self.records.push(record);
        self.stats.retained += 1;
    }

    fn attach_strings(&mut self, strings: &str) {
        let layout = &self.layout;
        for line in data_lines(strings, &layout.comment_prefix) {
            let fields: Vec<&str> = line.split('^').collect();
            if fields.len() < 4 {
                continue;
            }
            let Some(id) = fields.first().and_then(|f| f.trim().parse::<u32>().ok()) else {
                continue;
            };
            let Some(&idx) = self.by_id.get(&id) else {
                continue;
            };
            let record = &mut self.records[idx];
            record.landed_on_self = non_empty(fields.get(layout.landed_on_self));
            record.landed_on_others = non_empty(fields.get(layout.landed_on_others));
            self.stats.strings_attached += 1;
        }
    }

    /// Look up a spell by name; rank suffixes are ignored.
    pub fn get_spell(&self, name: &str) -> Option<&SpellRecord> {
        self.by_name
            .get(canonical_spell_name(name))
            .map(|&idx| &self.records[idx])
    }

    pub fn get_by_id(&self, id: u32) -> Option<&SpellRecord> {
        self.by_id.get(&id).map(|&idx| &self.records[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpellRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> SpellLoadStats {
        self.stats
    }

    pub fn layout(&self) -> &SpellTableLayout {
        &self.layout
    }
}

fn data_lines<'a>(table: &'a str, comment_prefix: &'a str) -> impl Iterator<Item = &'a str> {
    table
        .lines()
        .filter(move |l| !l.trim().is_empty() && !l.starts_with(comment_prefix))
}

fn parse_spell_row(line: &str, layout: &SpellTableLayout) -> Result<SpellRecord, RowRejection> {
    let fields: Vec<&str> = line.split('^').collect();
    let required = [
        layout.id,
        layout.name,
        layout.buff_duration,
        layout.target_type,
        layout.first_class_level + Class::ALL.len() - 1,
    ]
    .into_iter()
    .max()
    .unwrap_or_default();
    if fields.len() <= required {
        return Err(RowRejection::Malformed);
    }

    let id = fields[layout.id]
        .trim()
        .parse::<u32>()
        .map_err(|_| RowRejection::Malformed)?;
    let display_name = fields[layout.name].trim();
    if display_name.is_empty() {
        return Err(RowRejection::Malformed);
    }

    let mut classes = 0u16;
    let mut class_count = 0u8;
    for class in Class::ALL {
        let level = fields[layout.first_class_level + class.index()]
            .trim()
            .parse::<u16>()
            .unwrap_or(layout.not_castable_level);
        if level != layout.not_castable_level {
            classes |= class.bit();
            class_count += 1;
        }
    }
    if class_count == 0 {
        return Err(RowRejection::Uncastable);
    }

    Ok(SpellRecord {
        id,
        name: canonical_spell_name(display_name).to_string(),
        display_name: display_name.to_string(),
        classes,
        class_count,
        target_type: fields[layout.target_type].trim().parse().unwrap_or_default(),
        duration_ticks: fields[layout.buff_duration].trim().parse().unwrap_or_default(),
        landed_on_self: None,
        landed_on_others: None,
    })
}

/// `spells_us.txt` -> `spells_us_str.txt`
fn strings_path(path: &Path, layout: &SpellTableLayout) -> Option<PathBuf> {
    let stem = path.file_stem()?.to_str()?;
    let file_name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}{}.{ext}", layout.strings_suffix),
        None => format!("{stem}{}", layout.strings_suffix),
    };
    Some(path.with_file_name(file_name))
}

fn read_table(path: &Path) -> Option<String> {
    match fs::read(path) {
        Ok(bytes) => {
            let (text, _, had_errors) = WINDOWS_1252.decode(&bytes);
            if had_errors {
                tracing::debug!(path = %path.display(), "Spell table contained undecodable bytes");
            }
            Some(text.into_owned())
        }
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Failed to read spell table");
            None
        }
    }
}

fn non_empty(field: Option<&&str>) -> Option<String> {
    field
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .map(str::to_string)
}
