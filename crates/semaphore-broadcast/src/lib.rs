//! # semaphore-broadcast
//!
//! Broadcast messages from Markdown documents with YAML front matter.
//!
//! Authors write loosely-typed metadata (dates as bare dates or fuzzy text,
//! durations as `"1w 2d"`, timezones by name). This crate coerces those values
//! into canonical `chrono` / `chrono-tz` types, validates them against each
//! other, and reduces them to exactly one [`SchedulingPolicy`].
//!
//! ## Quick start
//!
//! ```rust
//! use semaphore_broadcast::{parse_broadcast, SchedulingPolicy};
//!
//! let text = "---\nsummary: Scheduled maintenance\ntimezone: America/Chicago\ndefer: 2024-01-01\nttl: 1d\n---\n\nDetails here.\n";
//! let message = parse_broadcast(text, "broadcasts/maintenance.md").unwrap();
//! assert_eq!(message.body.as_deref(), Some("Details here.\n"));
//! match message.scheduling_policy {
//!     SchedulingPolicy::OneTime { start, end } => {
//!         assert_eq!(start.to_rfc3339(), "2024-01-01T00:00:00-06:00");
//!         assert_eq!(end.to_rfc3339(), "2024-01-02T00:00:00-06:00");
//!     }
//!     other => panic!("unexpected policy {other:?}"),
//! }
//! ```
//!
//! ## Modules
//!
//! - [`duration`] — compound duration strings → `chrono::Duration`
//! - [`fuzzy`] — year-first fuzzy date/time parsing
//! - [`dst`] — wall-clock times across DST transitions
//! - [`temporal`] — per-field tagged-union inputs and their coercions
//! - [`metadata`] — raw front matter → validated metadata, in ordered stages
//! - [`scheduler`] — the four scheduling policies
//! - [`document`] — front-matter splitting and document parsing
//! - [`message`] — the assembled broadcast message
//! - [`repository`] — in-memory message collection with schedule queries
//! - [`error`] — Error types

pub mod document;
pub mod dst;
pub mod duration;
pub mod error;
pub mod fuzzy;
pub mod message;
pub mod metadata;
pub mod repository;
pub mod scheduler;
pub mod temporal;

pub use document::{is_broadcast_path, split, BroadcastDocument};
pub use duration::parse_duration;
pub use error::BroadcastError;
pub use message::BroadcastMessage;
pub use metadata::{NormalizedMetadata, RawMetadata};
pub use repository::BroadcastRepository;
pub use scheduler::SchedulingPolicy;
pub use temporal::{DurationInput, TimestampInput, TimezoneInput};

/// Parse a document into a [`BroadcastMessage`].
///
/// # Errors
/// Any [`BroadcastError`] raised while splitting, normalizing, or scheduling.
pub fn parse_broadcast(text: &str, source_identifier: &str) -> error::Result<BroadcastMessage> {
    BroadcastMessage::parse(text, source_identifier)
}
