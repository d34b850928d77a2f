//! Fuzzy, year-first date/time parsing for free-form front-matter values.
//!
//! Strict ISO 8601 / RFC 3339 layouts are tried first. Anything else goes
//! through a token scanner that picks out a date, an optional time of day,
//! and an optional UTC offset, skipping words it does not recognize. This
//! lets authors write values like `"Jan 5, 2024 at 10:30 pm"` or
//! `"starting 2024/01/05 09:00 UTC"`.
//!
//! A calendar date is always required. The scanner never fills in missing
//! date parts from the clock, so the result depends only on the input text.

use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

/// A parsed date-time that may or may not carry zone information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDateTime {
    /// No zone information was present in the text.
    Naive(NaiveDateTime),
    /// The text carried an explicit offset (`Z`, `+02:00`, `UTC`, ...).
    Aware(DateTime<FixedOffset>),
}

const AWARE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

// chrono's `%Y` also takes one- and two-digit years, so the strict layouts
// only run on text that starts with a four-digit year.
static LEADING_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}[-/.]").expect("leading year pattern is a valid regex")
});

static YEAR_FIRST_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})$").expect("year-first date pattern is a valid regex")
});

static MONTH_FIRST_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})[-/.](\d{1,2})[-/.](\d{4})$").expect("month-first date pattern is a valid regex")
});

static TIME_OF_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(\d{1,2}):(\d{2})(?::(\d{2})(?:\.(\d{1,9}))?)?(am|pm)?(z|[+-]\d{2}:?\d{2})?$",
    )
    .expect("time-of-day pattern is a valid regex")
});

static HOUR_MERIDIEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d{1,2})(am|pm)$").expect("hour meridiem pattern is a valid regex")
});

static OFFSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-])(\d{2}):?(\d{2})$").expect("offset pattern is a valid regex")
});

static DAY_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d{1,2})(?:st|nd|rd|th)?$").expect("day number pattern is a valid regex")
});

static YEAR_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}$").expect("year number pattern is a valid regex")
});

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Parse a date/time from free-form text.
///
/// Returns `None` when no complete calendar date can be found or when the
/// values found do not form a valid date, time, or offset.
pub fn parse_fuzzy(text: &str) -> Option<ParsedDateTime> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(parsed) = parse_strict(trimmed) {
        return Some(parsed);
    }
    tracing::trace!(text = trimmed, "falling back to fuzzy date scan");
    scan_tokens(trimmed)
}

fn parse_strict(text: &str) -> Option<ParsedDateTime> {
    if !LEADING_YEAR.is_match(text) {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(ParsedDateTime::Aware(dt));
    }
    for fmt in AWARE_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, fmt) {
            return Some(ParsedDateTime::Aware(dt));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(ParsedDateTime::Naive(dt));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(ParsedDateTime::Naive(date.and_time(NaiveTime::MIN)));
        }
    }
    None
}

/// Date/time parts collected while scanning tokens.
#[derive(Debug, Default)]
struct Fields {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    hour: Option<u32>,
    minute: u32,
    second: u32,
    nanos: u32,
    pm: Option<bool>,
    offset: Option<FixedOffset>,
}

fn scan_tokens(text: &str) -> Option<ParsedDateTime> {
    let mut fields = Fields::default();

    let tokens = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty());
    for token in tokens {
        // ISO-style `2024-01-05T10:00` that the strict layouts rejected.
        if let Some((date, time)) = split_iso_token(token) {
            fields.take_date(date)?;
            fields.take_time(time)?;
            continue;
        }
        fields.take_token(token)?;
    }

    fields.build()
}

fn split_iso_token(token: &str) -> Option<(&str, &str)> {
    let (date, time) = token.split_once(['T', 't'])?;
    if YEAR_FIRST_DATE.is_match(date) && TIME_OF_DAY.is_match(time) {
        Some((date, time))
    } else {
        None
    }
}

impl Fields {
    /// Consume one token. Returns `None` only when a recognized token holds an
    /// impossible value; unknown tokens are skipped.
    fn take_token(&mut self, token: &str) -> Option<()> {
        let lower = token.to_ascii_lowercase();
        if YEAR_FIRST_DATE.is_match(token) || MONTH_FIRST_DATE.is_match(token) {
            return self.take_date(token);
        }
        if TIME_OF_DAY.is_match(token) {
            return self.take_time(token);
        }
        if let Some(caps) = HOUR_MERIDIEM.captures(token) {
            if self.hour.is_none() {
                self.hour = Some(caps[1].parse().ok()?);
                self.pm = Some(caps[2].eq_ignore_ascii_case("pm"));
            }
            return Some(());
        }
        match lower.as_str() {
            "am" | "a.m." => {
                self.pm = Some(false);
                return Some(());
            }
            "pm" | "p.m." => {
                self.pm = Some(true);
                return Some(());
            }
            "z" | "utc" | "gmt" => {
                self.offset = Some(FixedOffset::east_opt(0)?);
                return Some(());
            }
            _ => {}
        }
        if OFFSET.is_match(token) && self.hour.is_some() && self.offset.is_none() {
            self.offset = Some(parse_offset(token)?);
            return Some(());
        }
        if let Some(month) = month_from_name(&lower) {
            if self.month.is_none() {
                self.month = Some(month);
            }
            return Some(());
        }
        if YEAR_NUMBER.is_match(token) {
            if self.year.is_none() {
                self.year = Some(token.parse().ok()?);
            }
            return Some(());
        }
        if let Some(caps) = DAY_NUMBER.captures(token) {
            if self.day.is_none() {
                self.day = Some(caps[1].parse().ok()?);
            }
            return Some(());
        }
        Some(())
    }

    fn take_date(&mut self, token: &str) -> Option<()> {
        let (year, month, day): (i32, u32, u32) = if let Some(caps) = YEAR_FIRST_DATE.captures(token) {
            (caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?)
        } else {
            let caps = MONTH_FIRST_DATE.captures(token)?;
            (caps[3].parse().ok()?, caps[1].parse().ok()?, caps[2].parse().ok()?)
        };
        if self.year.is_none() {
            self.year = Some(year);
            self.month = Some(month);
            self.day = Some(day);
        }
        Some(())
    }

    fn take_time(&mut self, token: &str) -> Option<()> {
        let caps = TIME_OF_DAY.captures(token)?;
        if self.hour.is_some() {
            return Some(());
        }
        self.hour = Some(caps[1].parse().ok()?);
        self.minute = caps[2].parse().ok()?;
        if let Some(sec) = caps.get(3) {
            self.second = sec.as_str().parse().ok()?;
        }
        if let Some(frac) = caps.get(4) {
            // Right-pad to nanoseconds: ".5" is 500_000_000ns.
            let digits = format!("{:0<9}", frac.as_str());
            self.nanos = digits.parse().ok()?;
        }
        if let Some(meridiem) = caps.get(5) {
            self.pm = Some(meridiem.as_str().eq_ignore_ascii_case("pm"));
        }
        if let Some(offset) = caps.get(6) {
            self.offset = Some(if offset.as_str().eq_ignore_ascii_case("z") {
                FixedOffset::east_opt(0)?
            } else {
                parse_offset(offset.as_str())?
            });
        }
        Some(())
    }

    fn build(self) -> Option<ParsedDateTime> {
        let date = NaiveDate::from_ymd_opt(self.year?, self.month?, self.day?)?;

        let hour = match (self.hour, self.pm) {
            (None, _) => 0,
            (Some(h), None) => h,
            (Some(h), Some(pm)) => {
                if h == 0 || h > 12 {
                    return None;
                }
                match (h, pm) {
                    (12, false) => 0,
                    (12, true) => 12,
                    (h, false) => h,
                    (h, true) => h + 12,
                }
            }
        };
        let time = NaiveTime::from_hms_nano_opt(hour, self.minute, self.second, self.nanos)?;
        let naive = date.and_time(time);

        match self.offset {
            Some(offset) => naive
                .and_local_timezone(offset)
                .single()
                .map(ParsedDateTime::Aware),
            None => Some(ParsedDateTime::Naive(naive)),
        }
    }
}

fn month_from_name(word: &str) -> Option<u32> {
    let word = word.trim_end_matches('.');
    if word.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|name| name.starts_with(word))
        .map(|idx| idx as u32 + 1)
}

fn parse_offset(text: &str) -> Option<FixedOffset> {
    let caps = OFFSET.captures(text)?;
    let hours: i32 = caps[2].parse().ok()?;
    let minutes: i32 = caps[3].parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    let seconds = hours * 3600 + minutes * 60;
    match &caps[1] {
        "-" => FixedOffset::west_opt(seconds),
        _ => FixedOffset::east_opt(seconds),
    }
}
