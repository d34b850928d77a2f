//! In-memory repository of broadcast messages, keyed by source identifier.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::{BroadcastError, Result};
use crate::message::BroadcastMessage;

/// A collection of broadcast messages with schedule-based queries.
///
/// Adding a message whose identifier is already present replaces the old
/// message. Iteration is ordered by identifier.
#[derive(Debug, Clone, Default)]
pub struct BroadcastRepository {
    messages: BTreeMap<String, BroadcastMessage>,
}

impl BroadcastRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message, replacing any message with the same identifier.
    pub fn add(&mut self, message: BroadcastMessage) {
        self.messages
            .insert(message.source_identifier.clone(), message);
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.messages.contains_key(identifier)
    }

    /// # Errors
    /// `NotFound` if no message has this identifier.
    pub fn get(&self, identifier: &str) -> Result<&BroadcastMessage> {
        self.messages
            .get(identifier)
            .ok_or_else(|| BroadcastError::NotFound(identifier.to_string()))
    }

    /// Remove a message. Missing identifiers are ignored unless
    /// `raise_if_missing` is set.
    ///
    /// # Errors
    /// `NotFound` if the identifier is absent and `raise_if_missing` is true.
    pub fn remove(&mut self, identifier: &str, raise_if_missing: bool) -> Result<()> {
        if self.messages.remove(identifier).is_none() && raise_if_missing {
            return Err(BroadcastError::NotFound(identifier.to_string()));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BroadcastMessage> {
        self.messages.values()
    }

    /// Enabled messages whose schedule is active at `now`.
    pub fn iter_active(&self, now: DateTime<Utc>) -> impl Iterator<Item = &BroadcastMessage> {
        self.iter().filter(move |m| m.is_active_at(now))
    }

    /// Messages with an event scheduled after `now`.
    pub fn iter_pending(&self, now: DateTime<Utc>) -> impl Iterator<Item = &BroadcastMessage> {
        self.iter().filter(move |m| m.has_future_events_at(now))
    }

    /// Messages that are neither active nor pending at `now`.
    pub fn iter_stale(&self, now: DateTime<Utc>) -> impl Iterator<Item = &BroadcastMessage> {
        self.iter().filter(move |m| m.is_stale_at(now))
    }
}

impl FromIterator<BroadcastMessage> for BroadcastRepository {
    fn from_iter<I: IntoIterator<Item = BroadcastMessage>>(iter: I) -> Self {
        let mut repo = BroadcastRepository::new();
        for message in iter {
            repo.add(message);
        }
        repo
    }
}
