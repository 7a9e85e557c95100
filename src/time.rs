//! Timestamp helpers: decoding the API's publication time and rendering a
//! "3 hours ago" label for the list.

use chrono::{DateTime, Utc};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;

/// Parse an RFC 3339 timestamp such as `2019-06-08T01:50:26.453Z` into
/// milliseconds since the epoch, UTC.
///
/// The API sends up to nine fractional digits; anything below a millisecond
/// is truncated.  Returns `None` for anything that is not a complete RFC 3339
/// timestamp with an offset.
pub fn parse_publication(raw: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc).timestamp_millis())
}

/// Human-friendly age of `publication` (epoch millis) relative to `now`.
///
/// Picks the largest unit with a non-zero count: years, months (30 days),
/// days, hours, minutes, seconds.  Anything under a second, or in the
/// future, is "just now".
pub fn time_ago(publication: i64, now: DateTime<Utc>) -> String {
    let seconds = (now.timestamp_millis() - publication) / 1000;

    let units = [
        (YEAR, "year"),
        (MONTH, "month"),
        (DAY, "day"),
        (HOUR, "hour"),
        (MINUTE, "minute"),
        (1, "second"),
    ];

    for (size, name) in units {
        let count = seconds / size;
        if count == 1 {
            return format!("1 {name} ago");
        }
        if count > 1 {
            return format!("{count} {name}s ago");
        }
    }

    "just now".to_string()
}
