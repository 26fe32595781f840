//! Helpers for the `YYYY-MM-DD` / `HH:MM` string fields.
//!
//! Dates and times are persisted as strings and must round-trip unchanged;
//! these helpers parse only at the edges where arithmetic or display
//! formatting is needed.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

pub const DATE_FMT: &str = "%Y-%m-%d";
pub const TIME_FMT: &str = "%H:%M";

/// Combine a date and a time string, if both parse.
pub fn combine(date: &str, time: &str) -> Option<NaiveDateTime> {
    let d = NaiveDate::parse_from_str(date, DATE_FMT).ok()?;
    let t = NaiveTime::parse_from_str(time, TIME_FMT).ok()?;
    Some(d.and_time(t))
}

/// Split a datetime back into `(date, time)` strings.
pub fn split(dt: NaiveDateTime) -> (String, String) {
    (
        dt.format(DATE_FMT).to_string(),
        dt.format(TIME_FMT).to_string(),
    )
}

/// Subtract `minutes` from a `(date, time)` pair. `None` when the pair does
/// not parse or the offset overflows the representable range.
pub fn minus_minutes(date: &str, time: &str, minutes: i64) -> Option<(String, String)> {
    let dt = combine(date, time)?;
    let delta = Duration::try_minutes(minutes)?;
    dt.checked_sub_signed(delta).map(split)
}

/// Format `HH:MM` as 12-hour time with the leading zero stripped
/// ("14:05" → "2:05 PM"). Unparseable input is returned as-is.
pub fn time_12h(time: &str) -> String {
    match NaiveTime::parse_from_str(time, TIME_FMT) {
        Ok(t) => {
            let s = t.format("%I:%M %p").to_string();
            s.strip_prefix('0').map(str::to_string).unwrap_or(s)
        }
        Err(_) => time.to_string(),
    }
}

/// Weekday name ("Friday") for a date string, or the raw string if it does
/// not parse.
pub fn day_name(date: &str) -> String {
    NaiveDate::parse_from_str(date, DATE_FMT)
        .map(|d| d.format("%A").to_string())
        .unwrap_or_else(|_| date.to_string())
}
