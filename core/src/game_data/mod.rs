mod classes;
mod spells;

pub use classes::Class;
pub use spells::{SpellLoadStats, SpellRecord, SpellReference, canonical_spell_name, target_type};

#[cfg(test)]
pub(crate) use spells::test_tables;
