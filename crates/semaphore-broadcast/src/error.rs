//! Error types for broadcast parsing, normalization, and scheduling.

use thiserror::Error;

/// Errors raised while turning a document into a [`BroadcastMessage`].
///
/// Every variant names the front-matter field (where one applies) and the raw
/// value that was rejected, so callers can report a precise diagnostic.
///
/// [`BroadcastMessage`]: crate::message::BroadcastMessage
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BroadcastError {
    #[error("Could not parse a duration from {0:?}")]
    MalformedDuration(String),

    #[error("Unknown timezone: {0:?}")]
    UnknownTimezone(String),

    #[error("Incorrect type for timezone, got {0}")]
    InvalidTimezoneType(String),

    #[error("Could not parse a date for \"{field}\" from {value:?}")]
    InvalidTimestamp { field: &'static str, value: String },

    #[error("Incorrect type for \"{field}\", expected a date or string, got {found}")]
    InvalidTimestampType { field: &'static str, found: String },

    #[error("Incorrect type for \"ttl\", expected a duration string, got {0}")]
    InvalidDurationType(String),

    #[error("Incorrect type for \"{field}\", expected {expected}, got {found}")]
    InvalidFieldType {
        field: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("\"expire\" and \"ttl\" fields cannot be used together")]
    ConflictingExpiry,

    #[error("\"expire\" ({expire}) cannot happen before \"defer\" ({defer})")]
    ExpiryBeforeDefer { defer: String, expire: String },

    #[error("A front matter metadata block is not present in the document")]
    MissingMetadataBlock,

    #[error("Invalid front matter metadata: {0}")]
    InvalidMetadata(String),

    #[error("Required field \"{0}\" is missing")]
    MissingRequiredField(&'static str),

    #[error("{0} is not in the broadcast message repository")]
    NotFound(String),
}

/// Convenience alias used throughout semaphore-broadcast.
pub type Result<T> = std::result::Result<T, BroadcastError>;
