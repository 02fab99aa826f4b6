use std::cell::{Ref, RefCell, RefMut};
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use eqlog_types::EngineConfig;

use super::ConfigError;
use crate::combat_log::{ClassifyContext, ClassifyError, LogClassifier, LogEvent};
use crate::effects::BuffWindowTracker;
use crate::game_data::SpellReference;
use crate::loot::LootCorrelator;
use crate::signal_processor::{EventSubscriber, LootSubscriber};
use crate::state::CharacterRegistry;

/// A classifier wired to the character registry, buff tracker and loot
/// correlator, in that order. Downstream subscribers added later see each
/// event after all three trackers have applied it.
pub struct ParsingSession {
    classifier: LogClassifier,
    characters: Rc<RefCell<CharacterRegistry>>,
    buffs: Rc<RefCell<BuffWindowTracker>>,
    loot: Rc<RefCell<LootCorrelator>>,
}

impl ParsingSession {
    pub fn new(config: &EngineConfig, spells: Arc<SpellReference>) -> Result<Self, ConfigError> {
        Self::with_context(config, spells, ClassifyContext::from_settings(&config.classifier))
    }

    /// Session for a log file; player and server default to the ones in its
    /// `eqlog_<Player>_<server>.txt` name.
    pub fn for_log_file(
        config: &EngineConfig,
        spells: Arc<SpellReference>,
        path: &Path,
    ) -> Result<Self, ConfigError> {
        let mut context = ClassifyContext::from_settings(&config.classifier);
        if !context.apply_log_filename(path) {
            tracing::debug!(path = %path.display(), "Log file name does not identify a player");
        }
        Self::with_context(config, spells, context)
    }

    fn with_context(
        config: &EngineConfig,
        spells: Arc<SpellReference>,
        context: ClassifyContext,
    ) -> Result<Self, ConfigError> {
        let characters = Rc::new(RefCell::new(CharacterRegistry::new(
            Arc::clone(&spells),
            &config.heuristics,
        )?));
        let buffs = Rc::new(RefCell::new(BuffWindowTracker::new(&spells, &config.buffs)));
        let loot = Rc::new(RefCell::new(LootCorrelator::new(
            &config.loot,
            context.server.clone(),
        )));

        let mut classifier = LogClassifier::new(context);
        classifier.subscribe(Box::new(Rc::clone(&characters)));
        classifier.subscribe(Box::new(Rc::clone(&buffs)));
        classifier.subscribe(Box::new(Rc::clone(&loot)));

        Ok(Self {
            classifier,
            characters,
            buffs,
            loot,
        })
    }

    /// Register a subscriber to receive classified events
    pub fn add_subscriber(&mut self, subscriber: Box<dyn EventSubscriber>) {
        self.classifier.subscribe(subscriber);
    }

    /// Register a subscriber to receive loot records
    pub fn add_loot_subscriber(&mut self, subscriber: Box<dyn LootSubscriber>) {
        self.loot.borrow_mut().subscribe(subscriber);
    }

    /// Classify a single line and dispatch the event
    pub fn process_line(&mut self, line: &str) -> Result<Option<LogEvent>, ClassifyError> {
        self.classifier.classify(line)
    }

    /// Process multiple lines, returning how many produced an event
    pub fn process_lines<'a, I>(&mut self, lines: I) -> Result<usize, ClassifyError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut count = 0;
        for line in lines {
            if self.classifier.classify(line)?.is_some() {
                count += 1;
            }
        }
        Ok(count)
    }

    pub fn classifier(&self) -> &LogClassifier {
        &self.classifier
    }

    pub fn classifier_mut(&mut self) -> &mut LogClassifier {
        &mut self.classifier
    }

    pub fn characters(&self) -> Ref<'_, CharacterRegistry> {
        self.characters.borrow()
    }

    /// Mutable access, e.g. for `get_foe`.
    pub fn characters_mut(&self) -> RefMut<'_, CharacterRegistry> {
        self.characters.borrow_mut()
    }

    pub fn buffs(&self) -> Ref<'_, BuffWindowTracker> {
        self.buffs.borrow()
    }

    pub fn buffs_mut(&self) -> RefMut<'_, BuffWindowTracker> {
        self.buffs.borrow_mut()
    }

    pub fn loot(&self) -> Ref<'_, LootCorrelator> {
        self.loot.borrow()
    }

    /// Swap in a reloaded spell reference for class and owner inference.
    pub fn set_spells(&mut self, spells: Arc<SpellReference>) {
        self.characters.borrow_mut().set_spells(spells);
    }
}
