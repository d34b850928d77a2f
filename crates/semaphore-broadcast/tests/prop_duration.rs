//! Property-based tests for duration parsing using proptest.

use chrono::Duration;
use proptest::prelude::*;
use semaphore_broadcast::{parse_duration, BroadcastError};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Five component counts, not all zero.
fn arb_components() -> impl Strategy<Value = (i64, i64, i64, i64, i64)> {
    (0i64..=520, 0i64..=400, 0i64..=100, 0i64..=1000, 0i64..=100_000)
        .prop_filter("at least one non-zero component", |(w, d, h, m, s)| {
            w + d + h + m + s > 0
        })
}

fn arb_separator() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just(""), Just(" "), Just("  ")]
}

fn expected(w: i64, d: i64, h: i64, m: i64, s: i64) -> Duration {
    Duration::weeks(w) + Duration::days(d) + Duration::hours(h) + Duration::minutes(m) + Duration::seconds(s)
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn compact_form_roundtrips((w, d, h, m, s) in arb_components()) {
        let text = format!("{w}w{d}d{h}h{m}m{s}s");
        prop_assert_eq!(parse_duration(&text).unwrap(), expected(w, d, h, m, s));
    }

    #[test]
    fn long_form_with_separators((w, d, h, m, s) in arb_components(), sep in arb_separator()) {
        let text = format!("{w}{sep}weeks {d}{sep}days {h}{sep}hours {m}{sep}minutes {s}{sep}seconds");
        prop_assert_eq!(parse_duration(&text).unwrap(), expected(w, d, h, m, s));
    }

    #[test]
    fn alphabetic_garbage_never_parses(word in "[a-z]{0,12}") {
        let result = parse_duration(&word);
        prop_assert!(matches!(result, Err(BroadcastError::MalformedDuration(_))));
    }

    #[test]
    fn reversed_order_never_parses(w in 1i64..100, s in 1i64..100) {
        let text = format!("{s}s{w}w");
        prop_assert!(parse_duration(&text).is_err());
    }
}
