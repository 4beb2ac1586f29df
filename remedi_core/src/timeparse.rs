//! Time-of-day string parsing.
//!
//! Medicine records store dose-times as 12-hour display strings
//! (`h:mm AM|PM`). This module converts those into the 24-hour `HH:MM` form
//! the status calculator works with, and into minutes-since-midnight for
//! chronological sorting.
//!
//! Both converters are total: any input that does not match the grammar
//! (including the empty string and as-needed markers) degrades to a defined
//! sentinel instead of failing. Callers treat the sentinels as
//! valid-but-uninformative, not as errors.

/// Sentinel returned by [`to_24_hour`] for unparseable input
pub const SENTINEL_24_HOUR: &str = "00:00";

/// Sentinel returned by [`minutes_since_midnight`] for unparseable input.
///
/// Sorts before every real time of day, which pins as-needed items to the
/// top of a chronologically ordered list.
pub const SENTINEL_MINUTES: i32 = -1;

/// Check whether a time string is an as-needed marker rather than a clock time
pub fn is_as_needed_marker(input: &str) -> bool {
    let trimmed = input.trim();
    trimmed.eq_ignore_ascii_case("as needed")
        || trimmed.eq_ignore_ascii_case("as-needed")
        || trimmed.contains("필요")
}

/// Convert a 12-hour `h:mm AM|PM` string into 24-hour `HH:MM`.
///
/// Hour-of-12 edge cases: `12 AM` maps to `00`, `12 PM` stays `12`, other PM
/// hours add 12, other AM hours pass through. Unparseable input (including
/// as-needed markers) returns `"00:00"`.
pub fn to_24_hour(input: &str) -> String {
    match parse_12_hour(input) {
        Some((hour, minute)) => format!("{:02}:{:02}", hour, minute),
        None => SENTINEL_24_HOUR.to_string(),
    }
}

/// Convert a 12-hour `h:mm AM|PM` string into minutes since midnight.
///
/// Unparseable input (including as-needed markers) returns `-1`.
pub fn minutes_since_midnight(input: &str) -> i32 {
    match parse_12_hour(input) {
        Some((hour, minute)) => (hour * 60 + minute) as i32,
        None => SENTINEL_MINUTES,
    }
}

/// Parse a 24-hour `HH:MM` string into (hour, minute).
///
/// Malformed input degrades to midnight, matching the converter sentinel.
pub fn parse_hhmm(time: &str) -> (u32, u32) {
    fn parse(time: &str) -> Option<(u32, u32)> {
        let (h, m) = time.trim().split_once(':')?;
        let hour: u32 = h.parse().ok()?;
        let minute: u32 = m.parse().ok()?;
        if hour > 23 || minute > 59 {
            return None;
        }
        Some((hour, minute))
    }
    parse(time).unwrap_or((0, 0))
}

/// Parse `h:mm AM|PM` into 24-hour (hour, minute)
fn parse_12_hour(input: &str) -> Option<(u32, u32)> {
    if is_as_needed_marker(input) {
        return None;
    }

    let mut parts = input.split_whitespace();
    let clock = parts.next()?;
    let meridiem = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let (h, m) = clock.split_once(':')?;
    let hour: u32 = h.parse().ok()?;
    let minute: u32 = m.parse().ok()?;
    if !(1..=12).contains(&hour) || minute > 59 {
        return None;
    }

    let hour = if meridiem.eq_ignore_ascii_case("am") {
        if hour == 12 {
            0
        } else {
            hour
        }
    } else if meridiem.eq_ignore_ascii_case("pm") {
        if hour == 12 {
            12
        } else {
            hour + 12
        }
    } else {
        return None;
    };

    Some((hour, minute))
}
