// Tot Tally - Elapsed-Time Formatter

use chrono::{DateTime, Datelike, TimeZone, Timelike};

/// Sentinel shown when a category has no recorded event at all. The caller
/// substitutes this instead of invoking the formatter.
pub const NOT_YET: &str = "not yet";

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Render the gap between two instants as a human phrase.
///
/// Differences are taken field-wise over the calendar components (year,
/// month, day, hour, minute, second), each as an absolute value. This is
/// NOT calendar-aware duration math: crossing a month boundary can
/// overstate the gap, and 90 minutes renders as "1 hour". Weeks are derived
/// as `days / 7` and the day count is not reduced alongside them. Both
/// quirks are load-bearing for display compatibility; do not "fix" them
/// here without changing the callers' expectations.
///
/// Non-full mode renders only the largest non-zero unit ("3 hours ago");
/// full mode joins every non-zero unit, largest to smallest ("1 week,
/// 10 days, 2 hours ago"). A zero difference in every field is "just now".
/// `now` before `then` flips the suffix to "after".
///
/// Both instants must share one reference frame; the query engine converts
/// both into the profile's zone before calling.
pub fn time_elapsed<Tz: TimeZone>(now: &DateTime<Tz>, then: &DateTime<Tz>, full: bool) -> String {
    let year = (now.year() as i64 - then.year() as i64).abs();
    let month = (now.month() as i64 - then.month() as i64).abs();
    let day = (now.day() as i64 - then.day() as i64).abs();
    let hour = (now.hour() as i64 - then.hour() as i64).abs();
    let minute = (now.minute() as i64 - then.minute() as i64).abs();
    let second = (now.second() as i64 - then.second() as i64).abs();

    let week = day / 7;

    let mut parts: Vec<String> = Vec::new();

    if year > 0 {
        parts.push(format!("{} year{}", year, plural(year)));
    }
    if month > 0 {
        parts.push(format!("{} month{}", month, plural(month)));
    }
    if week > 0 {
        parts.push(format!("{} week{}", week, plural(week)));
    }
    if day > 0 {
        parts.push(format!("{} day{}", day, plural(day)));
    }
    if hour > 0 {
        parts.push(format!("{} hour{}", hour, plural(hour)));
    }
    if minute > 0 {
        parts.push(format!("{} minute{}", minute, plural(minute)));
    }
    if second > 0 {
        parts.push(format!("{} second{}", second, plural(second)));
    }

    if parts.is_empty() {
        return "just now".to_string();
    }

    let suffix = if now > then { " ago" } else { " after" };

    if full {
        format!("{}{}", parts.join(", "), suffix)
    } else {
        format!("{}{}", parts[0], suffix)
    }
}
