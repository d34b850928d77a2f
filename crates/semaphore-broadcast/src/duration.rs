//! Compound duration strings such as `"1w 2d"`, `"90min"`, or `"1h30m"`.
//!
//! Components must appear in the fixed order weeks, days, hours, minutes,
//! seconds. Each component is optional but at least one is required, and the
//! whole (trimmed) string must match; nothing is ever parsed from a substring.

use std::sync::LazyLock;

use chrono::Duration;
use regex::{Captures, Regex};

use crate::error::{BroadcastError, Result};

static DURATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)^",
        r"(?:(?P<weeks>\d+)\s*(?:weeks|week|w))?\s*",
        r"(?:(?P<days>\d+)\s*(?:days|day|d))?\s*",
        r"(?:(?P<hours>\d+)\s*(?:hours|hour|hr|h))?\s*",
        r"(?:(?P<minutes>\d+)\s*(?:minutes|minute|mins|min|m))?\s*",
        r"(?:(?P<seconds>\d+)\s*(?:seconds|second|secs|sec|s))?",
        r"$",
    ))
    .expect("duration pattern is a valid regex")
});

/// Unit group names paired with the constructor for that unit, in grammar order.
const UNITS: [(&str, fn(i64) -> Option<Duration>); 5] = [
    ("weeks", Duration::try_weeks),
    ("days", Duration::try_days),
    ("hours", Duration::try_hours),
    ("minutes", Duration::try_minutes),
    ("seconds", Duration::try_seconds),
];

/// Parse a compound duration string into a [`Duration`].
///
/// ```
/// use chrono::Duration;
/// use semaphore_broadcast::parse_duration;
///
/// assert_eq!(parse_duration("1h 30m").unwrap(), Duration::minutes(90));
/// assert_eq!(parse_duration("2 weeks").unwrap(), Duration::days(14));
/// assert!(parse_duration("5 fortnights").is_err());
/// ```
///
/// # Errors
/// Returns `BroadcastError::MalformedDuration` when the text is empty, does
/// not match the grammar, lists units out of order, or overflows.
pub fn parse_duration(text: &str) -> Result<Duration> {
    let malformed = || BroadcastError::MalformedDuration(text.to_string());

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(malformed());
    }
    let caps = DURATION_PATTERN.captures(trimmed).ok_or_else(malformed)?;

    let mut total = Duration::zero();
    let mut matched_any = false;
    for (name, unit) in UNITS {
        if let Some(amount) = component(&caps, name) {
            let amount = amount.ok_or_else(malformed)?;
            let part = unit(amount).ok_or_else(malformed)?;
            total = total.checked_add(&part).ok_or_else(malformed)?;
            matched_any = true;
        }
    }

    // Whitespace alone satisfies the all-optional pattern.
    if !matched_any {
        return Err(malformed());
    }
    Ok(total)
}

/// `None` when the group did not participate; `Some(None)` when the digits
/// do not fit in an `i64`.
fn component(caps: &Captures<'_>, name: &str) -> Option<Option<i64>> {
    caps.name(name).map(|m| m.as_str().parse::<i64>().ok())
}
