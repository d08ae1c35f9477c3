//! W3C Datetime parsing.
//!
//! Accepts the subset of ISO 8601 used by the sitemap protocol:
//!
//! | Form | Example |
//! |------|---------|
//! | year | `2024` |
//! | year-month | `2024-05` |
//! | full date | `2024-05-17` |
//! | date + hh:mm | `2024-05-17T08:30+02:00` |
//! | date + hh:mm:ss(.s) | `2024-05-17T08:30:15.25Z` |
//!
//! The time-zone designator is optional. Every component is range-checked
//! against the real calendar, so `2023-02-29` is rejected while `2024-02-29`
//! is accepted.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use regex::Regex;

static W3C_DATETIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([0-9]{4})(?:-([0-9]{2})(?:-([0-9]{2})(?:T([0-9]{2}):([0-9]{2})(?::([0-9]{2})(?:\.([0-9]+))?)?(Z|[+-][0-9]{2}:[0-9]{2})?)?)?)?$",
    )
    .unwrap()
});

/// A parsed W3C datetime value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct W3cDateTime {
    /// Calendar date; missing month/day default to the first.
    pub date: NaiveDate,
    /// Time of day when one was given.
    pub time: Option<NaiveTime>,
    /// Offset east of UTC in seconds; `None` when no zone was given.
    pub offset_seconds: Option<i32>,
}

impl W3cDateTime {
    /// Earliest UTC instant the value can denote.
    ///
    /// Values without a zone are read as UTC.
    #[must_use]
    pub fn to_utc(&self) -> DateTime<Utc> {
        let naive = self.date.and_time(self.time.unwrap_or(NaiveTime::MIN));
        let utc = naive.and_utc();
        utc - Duration::seconds(i64::from(self.offset_seconds.unwrap_or(0)))
    }
}

/// Parse a W3C datetime, returning `None` for malformed or impossible values.
#[must_use]
pub fn parse_w3c_datetime(value: &str) -> Option<W3cDateTime> {
    let caps = W3C_DATETIME_RE.captures(value)?;
    // An absent group takes its default; a present one must parse.
    let number = |idx: usize, default: u32| -> Option<u32> {
        caps.get(idx)
            .map_or(Some(default), |m| m.as_str().parse::<u32>().ok())
    };

    let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
    let month = number(2, 1)?;
    let day = number(3, 1)?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    let time = if caps.get(4).is_some() {
        let hour = number(4, 0)?;
        let minute = number(5, 0)?;
        let second = number(6, 0)?;
        Some(NaiveTime::from_hms_opt(hour, minute, second)?)
    } else {
        None
    };

    let offset_seconds = match caps.get(8).map(|m| m.as_str()) {
        None => None,
        Some("Z") => Some(0),
        Some(tz) => Some(parse_offset(tz)?),
    };

    Some(W3cDateTime {
        date,
        time,
        offset_seconds,
    })
}

/// `true` when `value` is a well-formed, calendar-valid W3C datetime.
#[must_use]
pub fn is_w3c_datetime(value: &str) -> bool {
    parse_w3c_datetime(value).is_some()
}

/// Parse a `+hh:mm` / `-hh:mm` designator into signed seconds.
fn parse_offset(tz: &str) -> Option<i32> {
    let sign = if tz.starts_with('-') { -1 } else { 1 };
    let (hours, minutes) = tz.get(1..)?.split_once(':')?;
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(sign * (hours * 3600 + minutes * 60))
}
