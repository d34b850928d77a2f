//! Temporal normalization -- coerces loosely-typed front-matter values into
//! canonical timezone, timestamp, and duration types.
//!
//! Each field accepts several raw shapes, modelled as a tagged union
//! ([`TimezoneInput`], [`TimestampInput`], [`DurationInput`]). Each union has an
//! exhaustively matched coercion function. Raw YAML values convert into the
//! unions through `From<serde_yaml::Value>`; shapes that no coercion accepts
//! become an `Unsupported` variant that records what was found.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use serde_yaml::Value;

use crate::duration::parse_duration;
use crate::dst::localize;
use crate::error::{BroadcastError, Result};
use crate::fuzzy::{parse_fuzzy, ParsedDateTime};

/// Raw input for the `timezone` field.
#[derive(Debug, Clone, PartialEq)]
pub enum TimezoneInput {
    /// An already-resolved timezone.
    Zone(Tz),
    /// An IANA timezone name such as `"America/Chicago"`.
    Name(String),
    /// Any other raw shape, described for diagnostics.
    Unsupported(String),
}

/// Raw input for the `defer` and `expire` fields.
#[derive(Debug, Clone, PartialEq)]
pub enum TimestampInput {
    /// A bare calendar date; read as midnight.
    Date(NaiveDate),
    /// A wall-clock date-time without zone information.
    Naive(NaiveDateTime),
    /// A date-time that already carries an offset.
    Aware(DateTime<FixedOffset>),
    /// Free-form text, parsed fuzzily with the year first.
    Text(String),
    /// Any other raw shape, described for diagnostics.
    Unsupported(String),
}

/// Raw input for the `ttl` field.
#[derive(Debug, Clone, PartialEq)]
pub enum DurationInput {
    /// An already-computed duration.
    Value(Duration),
    /// Compound duration text such as `"1w 2d"`.
    Text(String),
    /// Any other raw shape, described for diagnostics.
    Unsupported(String),
}

/// Resolve a timezone input into a [`Tz`].
///
/// Names are matched exactly first, then case-insensitively.
///
/// # Errors
/// `UnknownTimezone` for names that are not in the IANA database;
/// `InvalidTimezoneType` for any non-text raw value.
pub fn coerce_timezone(input: &TimezoneInput) -> Result<Tz> {
    match input {
        TimezoneInput::Zone(tz) => Ok(*tz),
        TimezoneInput::Name(name) => {
            let trimmed = name.trim();
            trimmed
                .parse::<Tz>()
                .or_else(|_| Tz::from_str_insensitive(trimmed))
                .map_err(|_| BroadcastError::UnknownTimezone(name.clone()))
        }
        TimezoneInput::Unsupported(found) => {
            Err(BroadcastError::InvalidTimezoneType(found.clone()))
        }
    }
}

/// Convert a timestamp input into an absolute, offset-aware timestamp.
///
/// Inputs that carry their own offset keep it. Zone-less inputs are read as
/// wall-clock time in `default_tz`, or in UTC when no default is supplied.
///
/// # Errors
/// `InvalidTimestamp` when text cannot be parsed or the result overflows;
/// `InvalidTimestampType` for any raw value that is not a date or text.
pub fn coerce_timestamp(
    field: &'static str,
    input: &TimestampInput,
    default_tz: Option<&Tz>,
) -> Result<DateTime<FixedOffset>> {
    let invalid = |value: String| BroadcastError::InvalidTimestamp { field, value };

    let parsed = match input {
        TimestampInput::Date(date) => ParsedDateTime::Naive(date.and_time(NaiveTime::MIN)),
        TimestampInput::Naive(naive) => ParsedDateTime::Naive(*naive),
        TimestampInput::Aware(dt) => ParsedDateTime::Aware(*dt),
        TimestampInput::Text(text) => parse_fuzzy(text).ok_or_else(|| invalid(text.clone()))?,
        TimestampInput::Unsupported(found) => {
            return Err(BroadcastError::InvalidTimestampType {
                field,
                found: found.clone(),
            })
        }
    };

    match parsed {
        ParsedDateTime::Aware(dt) => Ok(dt),
        ParsedDateTime::Naive(naive) => {
            let tz = default_tz.copied().unwrap_or(Tz::UTC);
            localize(naive, &tz).ok_or_else(|| invalid(naive.to_string()))
        }
    }
}

/// Convert a duration input into a [`Duration`].
///
/// # Errors
/// `MalformedDuration` for text outside the duration grammar;
/// `InvalidDurationType` for any other raw value.
pub fn coerce_duration(input: &DurationInput) -> Result<Duration> {
    match input {
        DurationInput::Value(duration) => Ok(*duration),
        DurationInput::Text(text) => parse_duration(text),
        DurationInput::Unsupported(found) => Err(BroadcastError::InvalidDurationType(found.clone())),
    }
}

impl From<Value> for TimezoneInput {
    fn from(value: Value) -> Self {
        match value {
            Value::String(name) => TimezoneInput::Name(name),
            other => TimezoneInput::Unsupported(describe_value(&other)),
        }
    }
}

impl From<Value> for TimestampInput {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => TimestampInput::Text(text),
            other => TimestampInput::Unsupported(describe_value(&other)),
        }
    }
}

impl From<Value> for DurationInput {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => DurationInput::Text(text),
            other => DurationInput::Unsupported(describe_value(&other)),
        }
    }
}

impl From<Tz> for TimezoneInput {
    fn from(tz: Tz) -> Self {
        TimezoneInput::Zone(tz)
    }
}

impl From<NaiveDate> for TimestampInput {
    fn from(date: NaiveDate) -> Self {
        TimestampInput::Date(date)
    }
}

impl From<NaiveDateTime> for TimestampInput {
    fn from(naive: NaiveDateTime) -> Self {
        TimestampInput::Naive(naive)
    }
}

impl From<DateTime<FixedOffset>> for TimestampInput {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        TimestampInput::Aware(dt)
    }
}

impl From<Duration> for DurationInput {
    fn from(duration: Duration) -> Self {
        DurationInput::Value(duration)
    }
}

/// Short human-readable description of a YAML value, used in type errors.
pub(crate) fn describe_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) => format!("string {s:?}"),
        Value::Sequence(items) => format!("list of {} items", items.len()),
        Value::Mapping(_) => "mapping".to_string(),
        Value::Tagged(tagged) => format!("tagged value {}", tagged.tag),
    }
}
