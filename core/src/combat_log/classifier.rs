use encoding_rs::WINDOWS_1252;

use super::context::ClassifyContext;
use super::event::{EventKind, LogEvent};
use super::recognizers::{LineContext, RECOGNIZERS, Recognizer};
use super::timestamp::parse_timestamp;
use super::ClassifyError;
use crate::signal_processor::{EventSubscriber, Subscribers};

/// Turns raw log lines into [`LogEvent`]s and hands each one to the
/// registered subscribers before returning it.
pub struct LogClassifier {
    context: ClassifyContext,
    recognizers: &'static [Recognizer],
    subscribers: Subscribers<dyn EventSubscriber>,
    lines_seen: u64,
    lines_classified: u64,
}

impl LogClassifier {
    pub fn new(context: ClassifyContext) -> Self {
        Self::with_recognizers(context, RECOGNIZERS)
    }

    /// Use a custom recognizer table, tried in slice order.
    pub fn with_recognizers(context: ClassifyContext, recognizers: &'static [Recognizer]) -> Self {
        Self {
            context,
            recognizers,
            subscribers: Subscribers::default(),
            lines_seen: 0,
            lines_classified: 0,
        }
    }

    pub fn context(&self) -> &ClassifyContext {
        &self.context
    }

    /// Adjust player, server, date range or ignore list between lines.
    pub fn context_mut(&mut self) -> &mut ClassifyContext {
        &mut self.context
    }

    /// Register a subscriber. Subscribers are called in registration order.
    pub fn subscribe(&mut self, subscriber: Box<dyn EventSubscriber>) {
        self.subscribers.push(subscriber);
    }

    /// Lines passed to `classify` / lines that produced an event.
    pub fn counts(&self) -> (u64, u64) {
        (self.lines_seen, self.lines_classified)
    }

    /// Classify one line without notifying subscribers.
    ///
    /// Returns `Ok(None)` when the line has no timestamp prefix, falls outside
    /// the configured date range, or its text is on the ignore list.
    pub fn parse(&self, line: &str) -> Result<Option<LogEvent>, ClassifyError> {
        let Some((timestamp, text)) = parse_timestamp(line) else {
            return Ok(None);
        };
        let player = match self.context.player.as_deref() {
            Some(p) if !p.is_empty() => p,
            _ => return Err(ClassifyError::PlayerNotConfigured),
        };

        if !self.context.in_range(timestamp) || self.context.ignore.contains(text) {
            return Ok(None);
        }

        let ctx = LineContext {
            player,
            server: self.context.server.as_deref(),
        };
        let kind = self
            .recognizers
            .iter()
            .find_map(|r| (r.parse)(text, &ctx))
            .unwrap_or_else(|| EventKind::RawText {
                text: text.to_string(),
                player: player.to_string(),
            });
        Ok(Some(LogEvent::new(timestamp, kind)))
    }

    /// Classify one line and dispatch the resulting event to all subscribers.
    pub fn classify(&mut self, line: &str) -> Result<Option<LogEvent>, ClassifyError> {
        self.lines_seen += 1;
        let event = self.parse(line)?;
        if let Some(event) = &event {
            self.lines_classified += 1;
            self.subscribers.dispatch(event);
        }
        Ok(event)
    }

    /// Classify a line as read from disk. Game logs are Windows-1252.
    pub fn classify_bytes(&mut self, line: &[u8]) -> Result<Option<LogEvent>, ClassifyError> {
        let (text, _, had_errors) = WINDOWS_1252.decode(line);
        if had_errors {
            tracing::debug!(len = line.len(), "Replaced undecodable bytes in log line");
        }
        self.classify(&text)
    }
}
