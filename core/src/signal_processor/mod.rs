//! Fan-out of classified events and loot records
//!
//! Consumers register with the producer and are called synchronously, in
//! registration order, before the producer returns:
//!
//! ```text
//!   LogClassifier ──LogEvent──► EventSubscriber (registry, buffs, loot, ...)
//!                                      │
//!   LootCorrelator ◄───────────────────┘ ──LootRecord──► LootSubscriber
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::combat_log::LogEvent;
use crate::loot::LootRecord;

/// Receives every event the classifier emits.
pub trait EventSubscriber {
    fn handle_event(&mut self, event: &LogEvent);
}

/// Shared subscribers: the pipeline keeps a handle for queries while the
/// classifier holds another for dispatch.
impl<S: EventSubscriber + ?Sized> EventSubscriber for Rc<RefCell<S>> {
    fn handle_event(&mut self, event: &LogEvent) {
        self.borrow_mut().handle_event(event);
    }
}

/// Receives every loot record the correlator emits.
pub trait LootSubscriber {
    fn handle_loot(&mut self, record: &LootRecord);
}

impl<F: FnMut(&LootRecord)> LootSubscriber for F {
    fn handle_loot(&mut self, record: &LootRecord) {
        self(record);
    }
}

/// Ordered list of subscribers of one kind.
pub struct Subscribers<T: ?Sized> {
    entries: Vec<Box<T>>,
}

impl<T: ?Sized> Default for Subscribers<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T: ?Sized> Subscribers<T> {
    pub fn push(&mut self, subscriber: Box<T>) {
        self.entries.push(subscriber);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> Subscribers<dyn EventSubscriber + 'a> {
    pub fn dispatch(&mut self, event: &LogEvent) {
        for subscriber in &mut self.entries {
            subscriber.handle_event(event);
        }
    }
}

impl<'a> Subscribers<dyn LootSubscriber + 'a> {
    pub fn dispatch(&mut self, record: &LootRecord) {
        for subscriber in &mut self.entries {
            subscriber.handle_loot(record);
        }
    }
}
