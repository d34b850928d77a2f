//! Tests for metadata normalization and cross-field validation.

use chrono::{Duration, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use semaphore_broadcast::metadata::{EnvInput, FlagInput, TextInput};
use semaphore_broadcast::{
    BroadcastError, DurationInput, NormalizedMetadata, RawMetadata, TimestampInput,
    TimezoneInput,
};

fn date(y: i32, m: u32, d: u32) -> TimestampInput {
    TimestampInput::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn naive(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

fn text(s: &str) -> TimestampInput {
    TimestampInput::Text(s.to_string())
}

fn base() -> RawMetadata {
    RawMetadata::with_summary("Scheduled maintenance")
}

fn yaml(block: &str) -> Result<NormalizedMetadata, BroadcastError> {
    NormalizedMetadata::normalize(&RawMetadata::from_yaml(block)?)
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

#[test]
fn summary_only_uses_defaults() {
    let meta = NormalizedMetadata::normalize(&base()).unwrap();
    assert_eq!(meta.summary(), "Scheduled maintenance");
    assert_eq!(meta.env(), None);
    assert_eq!(meta.timezone(), chrono_tz::UTC);
    assert_eq!(meta.defer(), None);
    assert_eq!(meta.expire(), None);
    assert_eq!(meta.ttl(), None);
    assert!(meta.enabled());
}

#[test]
fn zone_less_defer_defaults_to_utc() {
    let raw = RawMetadata {
        defer: Some(TimestampInput::Naive(naive(2024, 1, 1, 12, 0))),
        ..base()
    };
    let meta = NormalizedMetadata::normalize(&raw).unwrap();
    let defer = meta.defer().unwrap();
    assert_eq!(defer.offset().local_minus_utc(), 0);
    assert_eq!(defer, Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());
}

#[test]
fn missing_summary_is_reported() {
    let err = NormalizedMetadata::normalize(&RawMetadata::default()).unwrap_err();
    assert_eq!(err, BroadcastError::MissingRequiredField("summary"));
}

// ---------------------------------------------------------------------------
// Timezone handling
// ---------------------------------------------------------------------------

#[test]
fn declared_timezone_applies_to_zone_less_timestamps() {
    let raw = RawMetadata {
        timezone: Some(TimezoneInput::Name("America/Los_Angeles".into())),
        defer: Some(date(2024, 1, 1)),
        expire: Some(text("2024-01-01 17:00")),
        ..base()
    };
    let meta = NormalizedMetadata::normalize(&raw).unwrap();
    assert_eq!(meta.timezone(), chrono_tz::America::Los_Angeles);
    assert_eq!(
        meta.defer().unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()
    );
    assert_eq!(
        meta.expire().unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 2, 1, 0, 0).unwrap()
    );
}

#[test]
fn explicit_offset_wins_over_declared_timezone() {
    let raw = RawMetadata {
        timezone: Some(TimezoneInput::Zone(chrono_tz::Asia::Tokyo)),
        defer: Some(text("2024-06-01T09:00:00+02:00")),
        ..base()
    };
    let meta = NormalizedMetadata::normalize(&raw).unwrap();
    let defer = meta.defer().unwrap();
    assert_eq!(defer.offset(), &FixedOffset::east_opt(2 * 3600).unwrap());
    assert_eq!(defer, Utc.with_ymd_and_hms(2024, 6, 1, 7, 0, 0).unwrap());
}

#[test]
fn timezone_is_resolved_even_when_declared_after_timestamps_in_yaml() {
    let meta = yaml("defer: 2024-07-04 10:00\ntimezone: Europe/Paris\nsummary: Fireworks\n").unwrap();
    assert_eq!(
        meta.defer().unwrap(),
        Utc.with_ymd_and_hms(2024, 7, 4, 8, 0, 0).unwrap()
    );
}

#[test]
fn unknown_timezone_is_rejected() {
    let raw = RawMetadata {
        timezone: Some(TimezoneInput::Name("Mars/Olympus_Mons".into())),
        ..base()
    };
    assert_eq!(
        NormalizedMetadata::normalize(&raw).unwrap_err(),
        BroadcastError::UnknownTimezone("Mars/Olympus_Mons".into())
    );
}

#[test]
fn non_text_timezone_is_a_type_error() {
    let err = yaml("summary: hi\ntimezone: 5\n").unwrap_err();
    assert_eq!(err, BroadcastError::InvalidTimezoneType("number 5".into()));
}

// ---------------------------------------------------------------------------
// Timestamps and durations
// ---------------------------------------------------------------------------

#[test]
fn unparsable_timestamp_is_rejected() {
    let raw = RawMetadata {
        expire: Some(text("whenever you like")),
        ..base()
    };
    assert_eq!(
        NormalizedMetadata::normalize(&raw).unwrap_err(),
        BroadcastError::InvalidTimestamp {
            field: "expire",
            value: "whenever you like".into(),
        }
    );
}

#[test]
fn two_digit_year_timestamps_are_rejected() {
    assert_eq!(
        yaml("summary: outage\ndefer: 24-01-05\n").unwrap_err(),
        BroadcastError::InvalidTimestamp {
            field: "defer",
            value: "24-01-05".into(),
        }
    );
    assert_eq!(
        yaml("summary: outage\nexpire: 24/02/05\n").unwrap_err(),
        BroadcastError::InvalidTimestamp {
            field: "expire",
            value: "24/02/05".into(),
        }
    );
}

#[test]
fn numeric_timestamp_is_a_type_error() {
    let err = yaml("summary: hi\ndefer: 20240101\n").unwrap_err();
    assert!(matches!(
        err,
        BroadcastError::InvalidTimestampType { field: "defer", .. }
    ));
}

#[test]
fn ttl_text_and_value_are_accepted() {
    let raw = RawMetadata {
        ttl: Some(DurationInput::Text("1h 30m".into())),
        ..base()
    };
    assert_eq!(
        NormalizedMetadata::normalize(&raw).unwrap().ttl(),
        Some(Duration::minutes(90))
    );

    let raw = RawMetadata {
        ttl: Some(DurationInput::Value(Duration::days(2))),
        ..base()
    };
    assert_eq!(
        NormalizedMetadata::normalize(&raw).unwrap().ttl(),
        Some(Duration::days(2))
    );
}

#[test]
fn numeric_ttl_is_a_type_error() {
    let err = yaml("summary: hi\nttl: 3600\n").unwrap_err();
    assert_eq!(err, BroadcastError::InvalidDurationType("number 3600".into()));
}

#[test]
fn malformed_ttl_is_rejected() {
    let err = yaml("summary: hi\nttl: 5 fortnights\n").unwrap_err();
    assert_eq!(err, BroadcastError::MalformedDuration("5 fortnights".into()));
}

// ---------------------------------------------------------------------------
// Cross-field rules
// ---------------------------------------------------------------------------

#[test]
fn expire_and_ttl_conflict() {
    let raw = RawMetadata {
        expire: Some(date(2024, 2, 1)),
        ttl: Some(DurationInput::Text("1d".into())),
        ..base()
    };
    assert_eq!(
        NormalizedMetadata::normalize(&raw).unwrap_err(),
        BroadcastError::ConflictingExpiry
    );
}

#[test]
fn expire_and_ttl_conflict_with_defer_present() {
    let raw = RawMetadata {
        defer: Some(date(2024, 1, 1)),
        expire: Some(date(2024, 2, 1)),
        ttl: Some(DurationInput::Text("1d".into())),
        enabled: Some(FlagInput::Flag(false)),
        ..base()
    };
    assert_eq!(
        NormalizedMetadata::normalize(&raw).unwrap_err(),
        BroadcastError::ConflictingExpiry
    );
}

#[test]
fn expire_before_defer_is_rejected() {
    let raw = RawMetadata {
        defer: Some(date(2024, 2, 1)),
        expire: Some(date(2024, 1, 1)),
        ..base()
    };
    assert!(matches!(
        NormalizedMetadata::normalize(&raw).unwrap_err(),
        BroadcastError::ExpiryBeforeDefer { .. }
    ));
}

#[test]
fn expire_equal_to_defer_is_allowed() {
    let raw = RawMetadata {
        defer: Some(date(2024, 1, 1)),
        expire: Some(date(2024, 1, 1)),
        ..base()
    };
    let meta = NormalizedMetadata::normalize(&raw).unwrap();
    assert_eq!(meta.defer(), meta.expire());
}

#[test]
fn expire_before_defer_compares_instants_across_zones() {
    // 09:00 in Tokyo is midnight UTC, earlier than 01:00 UTC.
    let raw = RawMetadata {
        defer: Some(text("2024-01-01T01:00:00Z")),
        expire: Some(text("2024-01-01T09:00:00+09:00")),
        ..base()
    };
    assert!(matches!(
        NormalizedMetadata::normalize(&raw).unwrap_err(),
        BroadcastError::ExpiryBeforeDefer { .. }
    ));
}

#[test]
fn coercion_errors_are_reported_before_cross_field_checks() {
    let raw = RawMetadata {
        expire: Some(date(2024, 2, 1)),
        ttl: Some(DurationInput::Text("soon".into())),
        ..base()
    };
    assert_eq!(
        NormalizedMetadata::normalize(&raw).unwrap_err(),
        BroadcastError::MalformedDuration("soon".into())
    );
}

// ---------------------------------------------------------------------------
// env, enabled, summary
// ---------------------------------------------------------------------------

#[test]
fn env_string_splits_on_commas() {
    let raw = RawMetadata {
        env: Some(EnvInput::Single("prod, staging".into())),
        ..base()
    };
    let meta = NormalizedMetadata::normalize(&raw).unwrap();
    assert_eq!(meta.env(), Some(&["prod".to_string(), "staging".to_string()][..]));
    assert!(meta.is_relevant_to_env("staging"));
    assert!(!meta.is_relevant_to_env("dev"));
}

#[test]
fn env_list_is_unchanged() {
    let meta = yaml("summary: hi\nenv:\n  - prod\n  - staging\n").unwrap();
    assert_eq!(meta.env(), Some(&["prod".to_string(), "staging".to_string()][..]));
}

#[test]
fn absent_env_is_relevant_everywhere() {
    let meta = NormalizedMetadata::normalize(&base()).unwrap();
    assert!(meta.is_relevant_to_env("anything"));
}

#[test]
fn env_mapping_is_a_type_error() {
    let err = yaml("summary: hi\nenv:\n  prod: true\n").unwrap_err();
    assert!(matches!(
        err,
        BroadcastError::InvalidFieldType { field: "env", .. }
    ));
}

#[test]
fn enabled_false_is_kept() {
    let meta = yaml("summary: hi\nenabled: false\n").unwrap();
    assert!(!meta.enabled());
}

#[test]
fn list_summary_is_a_type_error() {
    let raw = RawMetadata {
        summary: Some(TextInput::Unsupported("list of 2 items".into())),
        ..Default::default()
    };
    assert!(matches!(
        NormalizedMetadata::normalize(&raw).unwrap_err(),
        BroadcastError::InvalidFieldType { field: "summary", .. }
    ));
}

// ---------------------------------------------------------------------------
// YAML front matter
// ---------------------------------------------------------------------------

#[test]
fn null_values_are_absent() {
    let meta = yaml("summary: hi\ndefer: ~\nttl: null\n").unwrap();
    assert_eq!(meta.defer(), None);
    assert_eq!(meta.ttl(), None);
}

#[test]
fn unknown_keys_are_ignored() {
    let meta = yaml("summary: hi\ncategory: maintenance\n").unwrap();
    assert_eq!(meta.summary(), "hi");
}

#[test]
fn non_mapping_front_matter_is_invalid() {
    let err = RawMetadata::from_yaml("- just\n- a list\n").unwrap_err();
    assert!(matches!(err, BroadcastError::InvalidMetadata(_)));
}

#[test]
fn empty_front_matter_is_missing_summary() {
    assert_eq!(
        yaml("").unwrap_err(),
        BroadcastError::MissingRequiredField("summary")
    );
}
