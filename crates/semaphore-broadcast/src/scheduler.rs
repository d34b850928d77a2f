//! Scheduling policies -- when a broadcast should be displayed.
//!
//! A policy is derived once from validated metadata and never changes. Time
//! queries take the evaluation instant as an argument so that the same policy
//! can be evaluated deterministically (and in tests) at any point in time.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

use crate::error::{BroadcastError, Result};
use crate::metadata::NormalizedMetadata;

/// The four mutually exclusive ways a broadcast can be scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchedulingPolicy {
    /// Active within the half-open window `[start, end)`.
    OneTime {
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    },
    /// Active from `start` onward, with no end.
    OpenEnded { start: DateTime<FixedOffset> },
    /// Active immediately, until `end`.
    FixedExpiration { end: DateTime<FixedOffset> },
    /// Always active.
    Perma,
}

impl SchedulingPolicy {
    /// Select the policy implied by the `defer`, `expire`, and `ttl` fields.
    ///
    /// | defer | expire | ttl | policy |
    /// |---|---|---|---|
    /// | set | set | -- | `OneTime(defer, expire)` |
    /// | set | -- | set | `OneTime(defer, defer + ttl)` |
    /// | set | -- | -- | `OpenEnded(defer)` |
    /// | -- | set | -- | `FixedExpiration(expire)` |
    /// | -- | -- | -- | `Perma` |
    /// | -- | -- | set | `Perma` (a ttl needs a start to count from) |
    ///
    /// # Errors
    /// `InvalidTimestamp` if `defer + ttl` overflows. `ConflictingExpiry` for
    /// `expire` together with `ttl`, which normalization already rejects.
    pub fn derive(metadata: &NormalizedMetadata) -> Result<Self> {
        let policy = match (metadata.defer(), metadata.expire(), metadata.ttl()) {
            (Some(start), Some(end), None) => SchedulingPolicy::OneTime { start, end },
            (Some(start), None, Some(ttl)) => {
                let end = start.checked_add_signed(ttl).ok_or_else(|| {
                    BroadcastError::InvalidTimestamp {
                        field: "ttl",
                        value: format!("{start} + {ttl}"),
                    }
                })?;
                SchedulingPolicy::OneTime { start, end }
            }
            (Some(start), None, None) => SchedulingPolicy::OpenEnded { start },
            (None, Some(end), None) => SchedulingPolicy::FixedExpiration { end },
            (None, None, None) => SchedulingPolicy::Perma,
            (None, None, Some(ttl)) => {
                tracing::debug!(?ttl, "ttl without defer has no start; scheduling as perma");
                SchedulingPolicy::Perma
            }
            (_, Some(_), Some(_)) => return Err(BroadcastError::ConflictingExpiry),
        };
        tracing::debug!(?policy, "derived scheduling policy");
        Ok(policy)
    }

    /// Start of the first scheduled window, if the policy has one.
    pub fn start(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            SchedulingPolicy::OneTime { start, .. } | SchedulingPolicy::OpenEnded { start } => {
                Some(*start)
            }
            SchedulingPolicy::FixedExpiration { .. } | SchedulingPolicy::Perma => None,
        }
    }

    /// End of the scheduled window, if the policy has one.
    pub fn end(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            SchedulingPolicy::OneTime { end, .. } | SchedulingPolicy::FixedExpiration { end } => {
                Some(*end)
            }
            SchedulingPolicy::OpenEnded { .. } | SchedulingPolicy::Perma => None,
        }
    }

    /// Whether the schedule is active at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        match self {
            SchedulingPolicy::OneTime { start, end } => *start <= now && now < *end,
            SchedulingPolicy::OpenEnded { start } => *start <= now,
            SchedulingPolicy::FixedExpiration { end } => now < *end,
            SchedulingPolicy::Perma => true,
        }
    }

    /// Whether an event starts after `now` (the current event, if any, does
    /// not count).
    pub fn has_future_events_at(&self, now: DateTime<Utc>) -> bool {
        match self.start() {
            Some(start) => start > now,
            None => false,
        }
    }

    /// Neither active nor scheduled for the future.
    pub fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        !(self.is_active_at(now) || self.has_future_events_at(now))
    }
}
