//! The broadcast message handed to display and delivery systems.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::document::BroadcastDocument;
use crate::error::Result;
use crate::metadata::{is_relevant, NormalizedMetadata};
use crate::scheduler::SchedulingPolicy;

/// A fully parsed broadcast message. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BroadcastMessage {
    /// Opaque identifier of the source document, typically its path.
    pub source_identifier: String,
    /// Summary text, as Markdown.
    pub summary: String,
    /// Body text, as Markdown; `None` when the document has only front matter.
    pub body: Option<String>,
    pub scheduling_policy: SchedulingPolicy,
    /// When false the message is never shown, whatever its schedule.
    pub enabled: bool,
    /// Target environments; `None` means every environment.
    pub env: Option<Vec<String>>,
}

impl BroadcastMessage {
    /// Parse a document into a broadcast message.
    ///
    /// ```
    /// use semaphore_broadcast::{BroadcastMessage, SchedulingPolicy};
    ///
    /// let text = "---\nsummary: Maintenance tonight\n---\n";
    /// let message = BroadcastMessage::parse(text, "broadcasts/maintenance.md").unwrap();
    /// assert_eq!(message.summary, "Maintenance tonight");
    /// assert_eq!(message.body, None);
    /// assert_eq!(message.scheduling_policy, SchedulingPolicy::Perma);
    /// ```
    ///
    /// # Errors
    /// Any error from splitting, normalizing, or scheduling the document.
    pub fn parse(text: &str, source_identifier: &str) -> Result<Self> {
        BroadcastDocument::parse(text, source_identifier)?.to_broadcast()
    }

    /// Assemble a message from already-normalized metadata.
    ///
    /// # Errors
    /// Propagates errors from [`SchedulingPolicy::derive`].
    pub fn from_metadata(
        source_identifier: String,
        metadata: &NormalizedMetadata,
        body: Option<String>,
    ) -> Result<Self> {
        Ok(BroadcastMessage {
            source_identifier,
            summary: metadata.summary().to_string(),
            body,
            scheduling_policy: SchedulingPolicy::derive(metadata)?,
            enabled: metadata.enabled(),
            env: metadata.env().map(<[String]>::to_vec),
        })
    }

    /// Whether the message should be displayed at `now`: enabled and inside
    /// its schedule.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.enabled && self.scheduling_policy.is_active_at(now)
    }

    /// Whether the schedule has an event starting after `now`.
    pub fn has_future_events_at(&self, now: DateTime<Utc>) -> bool {
        self.scheduling_policy.has_future_events_at(now)
    }

    /// Neither currently scheduled nor scheduled for the future.
    pub fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        self.scheduling_policy.is_stale_at(now)
    }

    pub fn is_relevant_to_env(&self, env: &str) -> bool {
        is_relevant(self.env.as_deref(), env)
    }
}
