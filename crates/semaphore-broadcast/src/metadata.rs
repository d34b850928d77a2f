//! Front-matter metadata: raw field inputs, the ordered normalization
//! pipeline, and the cross-field validation rules.
//!
//! # Stage order
//!
//! Normalization runs the stages in [`STAGES`] one after another. `timezone`
//! must be resolved before `defer` and `expire` because zone-less timestamps
//! take it as their default zone. Running them in any other order would read
//! those timestamps as UTC even when the author declared another zone.
//! Cross-field checks run last, and only once every field has coerced.

use chrono::{DateTime, Duration, FixedOffset};
use chrono_tz::Tz;
use serde::Deserialize;
use serde_yaml::Value;

use crate::error::{BroadcastError, Result};
use crate::temporal::{
    coerce_duration, coerce_timestamp, coerce_timezone, describe_value, DurationInput,
    TimestampInput, TimezoneInput,
};

/// Raw input for plain-text fields (`summary`).
#[derive(Debug, Clone, PartialEq)]
pub enum TextInput {
    /// A string value; YAML numbers are stringified into this form.
    Text(String),
    /// Any other raw shape, described for diagnostics.
    Unsupported(String),
}

/// Raw input for the `env` field.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvInput {
    /// A single string, possibly a comma-separated list.
    Single(String),
    /// A YAML list of environment names.
    List(Vec<String>),
    /// Any other raw shape, described for diagnostics.
    Unsupported(String),
}

/// Raw input for the `enabled` flag.
#[derive(Debug, Clone, PartialEq)]
pub enum FlagInput {
    /// A YAML boolean.
    Flag(bool),
    /// Word forms such as `"yes"`, `"off"`, or `"1"`.
    Text(String),
    /// Any other raw shape, described for diagnostics.
    Unsupported(String),
}

/// Metadata as written by the author, one tagged-union input per field.
///
/// `None` means the key was absent (or explicitly `null`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMetadata {
    pub summary: Option<TextInput>,
    pub env: Option<EnvInput>,
    pub timezone: Option<TimezoneInput>,
    pub defer: Option<TimestampInput>,
    pub expire: Option<TimestampInput>,
    pub ttl: Option<DurationInput>,
    pub enabled: Option<FlagInput>,
}

/// Wire shape of the YAML front matter. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FrontMatter {
    summary: Option<Value>,
    env: Option<Value>,
    timezone: Option<Value>,
    defer: Option<Value>,
    expire: Option<Value>,
    ttl: Option<Value>,
    enabled: Option<Value>,
}

impl RawMetadata {
    /// Raw metadata holding only a summary.
    pub fn with_summary(summary: impl Into<String>) -> Self {
        RawMetadata {
            summary: Some(TextInput::Text(summary.into())),
            ..Default::default()
        }
    }

    /// Deserialize a YAML front-matter block.
    ///
    /// An empty block yields empty metadata (which later fails for the missing
    /// `summary`). Values keep their raw shape here; type problems surface
    /// during [`NormalizedMetadata::normalize`].
    ///
    /// # Errors
    /// `InvalidMetadata` if the block is not valid YAML or not a mapping.
    pub fn from_yaml(block: &str) -> Result<Self> {
        if block.trim().is_empty() {
            return Ok(RawMetadata::default());
        }
        let wire: FrontMatter = serde_yaml::from_str(block)
            .map_err(|e| BroadcastError::InvalidMetadata(e.to_string()))?;
        Ok(RawMetadata {
            summary: wire.summary.map(Into::into),
            env: wire.env.map(Into::into),
            timezone: wire.timezone.map(Into::into),
            defer: wire.defer.map(Into::into),
            expire: wire.expire.map(Into::into),
            ttl: wire.ttl.map(Into::into),
            enabled: wire.enabled.map(Into::into),
        })
    }
}

impl From<Value> for TextInput {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => TextInput::Text(s),
            Value::Number(n) => TextInput::Text(n.to_string()),
            other => TextInput::Unsupported(describe_value(&other)),
        }
    }
}

impl From<Value> for EnvInput {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => EnvInput::Single(s),
            Value::Sequence(items) => {
                let mut names = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(s) => names.push(s),
                        Value::Number(n) => names.push(n.to_string()),
                        other => {
                            return EnvInput::Unsupported(format!(
                                "list containing {}",
                                describe_value(&other)
                            ))
                        }
                    }
                }
                EnvInput::List(names)
            }
            other => EnvInput::Unsupported(describe_value(&other)),
        }
    }
}

impl From<Value> for FlagInput {
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(b) => FlagInput::Flag(b),
            Value::String(s) => FlagInput::Text(s),
            Value::Number(n) => FlagInput::Text(n.to_string()),
            other => FlagInput::Unsupported(describe_value(&other)),
        }
    }
}

/// One step of the normalization pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Summary,
    Env,
    Timezone,
    Defer,
    Expire,
    Ttl,
    Enabled,
    CrossField,
}

/// The normalization stages in execution order.
pub const STAGES: [Stage; 8] = [
    Stage::Summary,
    Stage::Env,
    Stage::Timezone,
    Stage::Defer,
    Stage::Expire,
    Stage::Ttl,
    Stage::Enabled,
    Stage::CrossField,
];

/// Validated, canonical broadcast metadata.
///
/// Instances only come out of [`NormalizedMetadata::normalize`], so they always
/// satisfy: `expire` and `ttl` are never both set, and `expire >= defer`
/// whenever both are set.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedMetadata {
    summary: String,
    env: Option<Vec<String>>,
    timezone: Tz,
    defer: Option<DateTime<FixedOffset>>,
    expire: Option<DateTime<FixedOffset>>,
    ttl: Option<Duration>,
    enabled: bool,
}

/// Fields accumulated while the stages run.
#[derive(Debug, Default)]
struct Pending {
    summary: Option<String>,
    env: Option<Vec<String>>,
    timezone: Option<Tz>,
    defer: Option<DateTime<FixedOffset>>,
    expire: Option<DateTime<FixedOffset>>,
    ttl: Option<Duration>,
    enabled: Option<bool>,
}

impl Pending {
    fn run(&mut self, stage: Stage, raw: &RawMetadata) -> Result<()> {
        match stage {
            Stage::Summary => {
                self.summary = Some(normalize_summary(raw.summary.as_ref())?);
            }
            Stage::Env => {
                self.env = raw.env.as_ref().map(normalize_env).transpose()?;
            }
            Stage::Timezone => {
                let tz = match &raw.timezone {
                    Some(input) => coerce_timezone(input)?,
                    None => Tz::UTC,
                };
                self.timezone = Some(tz);
            }
            Stage::Defer => {
                self.defer = raw
                    .defer
                    .as_ref()
                    .map(|input| coerce_timestamp("defer", input, self.timezone.as_ref()))
                    .transpose()?;
            }
            Stage::Expire => {
                self.expire = raw
                    .expire
                    .as_ref()
                    .map(|input| coerce_timestamp("expire", input, self.timezone.as_ref()))
                    .transpose()?;
            }
            Stage::Ttl => {
                self.ttl = raw.ttl.as_ref().map(coerce_duration).transpose()?;
            }
            Stage::Enabled => {
                let enabled = match &raw.enabled {
                    Some(input) => normalize_flag(input)?,
                    None => true,
                };
                self.enabled = Some(enabled);
            }
            Stage::CrossField => self.check_schedule_combinations()?,
        }
        tracing::trace!(?stage, "normalization stage complete");
        Ok(())
    }

    fn check_schedule_combinations(&self) -> Result<()> {
        if self.expire.is_some() && self.ttl.is_some() {
            return Err(BroadcastError::ConflictingExpiry);
        }
        if let (Some(defer), Some(expire)) = (self.defer, self.expire) {
            // Equal instants are a valid zero-length window.
            if expire < defer {
                return Err(BroadcastError::ExpiryBeforeDefer {
                    defer: defer.to_rfc3339(),
                    expire: expire.to_rfc3339(),
                });
            }
        }
        Ok(())
    }
}

impl NormalizedMetadata {
    /// Run every stage in [`STAGES`] over the raw metadata.
    ///
    /// # Errors
    /// The first failing field coercion, or a cross-field rule violation
    /// (`ConflictingExpiry`, `ExpiryBeforeDefer`) once all fields coerced.
    pub fn normalize(raw: &RawMetadata) -> Result<Self> {
        let mut pending = Pending::default();
        for stage in STAGES {
            if let Err(err) = pending.run(stage, raw) {
                tracing::debug!(?stage, error = %err, "metadata normalization failed");
                return Err(err);
            }
        }

        let metadata = NormalizedMetadata {
            summary: pending
                .summary
                .ok_or(BroadcastError::MissingRequiredField("summary"))?,
            env: pending.env,
            timezone: pending.timezone.unwrap_or(Tz::UTC),
            defer: pending.defer,
            expire: pending.expire,
            ttl: pending.ttl,
            enabled: pending.enabled.unwrap_or(true),
        };
        tracing::debug!(
            timezone = %metadata.timezone,
            defer = ?metadata.defer,
            expire = ?metadata.expire,
            ttl = ?metadata.ttl,
            enabled = metadata.enabled,
            "normalized broadcast metadata"
        );
        Ok(metadata)
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Target environments; `None` means every environment.
    pub fn env(&self) -> Option<&[String]> {
        self.env.as_deref()
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn defer(&self) -> Option<DateTime<FixedOffset>> {
        self.defer
    }

    pub fn expire(&self) -> Option<DateTime<FixedOffset>> {
        self.expire
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the broadcast applies to the named environment.
    pub fn is_relevant_to_env(&self, env: &str) -> bool {
        is_relevant(self.env.as_deref(), env)
    }
}

pub(crate) fn is_relevant(targets: Option<&[String]>, env: &str) -> bool {
    match targets {
        None => true,
        Some(names) => names.iter().any(|name| name == env),
    }
}

fn normalize_summary(input: Option<&TextInput>) -> Result<String> {
    match input {
        Some(TextInput::Text(text)) if !text.trim().is_empty() => Ok(text.clone()),
        Some(TextInput::Text(_)) | None => Err(BroadcastError::MissingRequiredField("summary")),
        Some(TextInput::Unsupported(found)) => Err(BroadcastError::InvalidFieldType {
            field: "summary",
            expected: "a string",
            found: found.clone(),
        }),
    }
}

/// Comma-separated text splits into trimmed, non-empty tokens; lists pass
/// through in order.
fn normalize_env(input: &EnvInput) -> Result<Vec<String>> {
    match input {
        EnvInput::Single(text) => Ok(text
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect()),
        EnvInput::List(names) => Ok(names.clone()),
        EnvInput::Unsupported(found) => Err(BroadcastError::InvalidFieldType {
            field: "env",
            expected: "a string or list of strings",
            found: found.clone(),
        }),
    }
}

fn normalize_flag(input: &FlagInput) -> Result<bool> {
    let invalid = |found: String| BroadcastError::InvalidFieldType {
        field: "enabled",
        expected: "a boolean",
        found,
    };
    match input {
        FlagInput::Flag(flag) => Ok(*flag),
        FlagInput::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(invalid(format!("string {text:?}"))),
        },
        FlagInput::Unsupported(found) => Err(invalid(found.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timezone_runs_before_timestamps() {
        let position = |stage| STAGES.iter().position(|s| *s == stage).unwrap();
        assert!(position(Stage::Timezone) < position(Stage::Defer));
        assert!(position(Stage::Timezone) < position(Stage::Expire));
        assert!(position(Stage::Timezone) < position(Stage::Ttl));
        assert_eq!(STAGES.last(), Some(&Stage::CrossField));
    }

    #[test]
    fn env_string_drops_empty_tokens() {
        let env = normalize_env(&EnvInput::Single("prod, ,staging,".into())).unwrap();
        assert_eq!(env, vec!["prod".to_string(), "staging".to_string()]);
    }

    #[test]
    fn flag_words_are_accepted() {
        assert!(normalize_flag(&FlagInput::Text("Yes".into())).unwrap());
        assert!(!normalize_flag(&FlagInput::Text("off".into())).unwrap());
        assert!(normalize_flag(&FlagInput::Text("maybe".into())).is_err());
    }

    #[test]
    fn blank_summary_is_missing() {
        assert_eq!(
            normalize_summary(Some(&TextInput::Text("  ".into()))),
            Err(BroadcastError::MissingRequiredField("summary"))
        );
    }
}
