//! Attaching a timezone to a wall-clock time across DST transitions.

use chrono::{DateTime, Duration, FixedOffset, LocalResult, NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;

/// Interpret a naive wall-clock time in `tz`, keeping the resolved offset.
///
/// - A time that occurs once maps to that instant.
/// - A time repeated by a fall-back transition maps to the earlier instant.
/// - A time skipped by a spring-forward transition (e.g. 02:30 on the
///   morning clocks jump to 03:00) is read with the offset in effect before
///   the gap, which lands it the gap's width after the transition.
///
/// Returns `None` only if the result falls outside chrono's representable range.
pub fn localize(naive: NaiveDateTime, tz: &Tz) -> Option<DateTime<FixedOffset>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt.fixed_offset()),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.fixed_offset()),
        LocalResult::None => {
            // Gaps are at most a few hours; a day back is safely before it.
            let before = naive.checked_sub_signed(Duration::days(1))?;
            let offset = tz.offset_from_local_datetime(&before).earliest()?.fix();
            let utc = naive.checked_sub_signed(Duration::seconds(offset.local_minus_utc().into()))?;
            Some(DateTime::from_naive_utc_and_offset(utc, offset))
        }
    }
}
