//! Calendar bucketing and duration formatting
//!
//! Helpers for grouping timestamps into day/month buckets and rendering
//! durations for logs and reports.

use chrono::{DateTime, Utc};

/// Bucket key for a calendar day, `YYYY-MM-DD`
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use workledger_common::time::calendar::day_key;
///
/// let ts = Utc.with_ymd_and_hms(2025, 3, 7, 13, 45, 0).unwrap();
/// assert_eq!(day_key(ts), "2025-03-07");
/// ```
pub fn day_key(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

/// Bucket key for a calendar month, `YYYY-MM`
pub fn month_key(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m").to_string()
}

/// Number of calendar days spanned by a range, inclusive of both ends
///
/// A range that starts and ends on the same day spans one day. Inverted
/// ranges clamp to one day rather than going negative.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use workledger_common::time::calendar::days_spanned;
///
/// let start = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
/// let end = Utc.with_ymd_and_hms(2025, 3, 3, 17, 0, 0).unwrap();
/// assert_eq!(days_spanned(start, end), 3);
/// ```
pub fn days_spanned(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let days = (end.date_naive() - start.date_naive()).num_days() + 1;
    days.max(1)
}

/// Format a minute count into a human-readable string
///
/// # Examples
///
/// ```
/// use workledger_common::time::calendar::format_minutes;
///
/// assert_eq!(format_minutes(5), "5m");
/// assert_eq!(format_minutes(65), "1h 5m");
/// assert_eq!(format_minutes(1500), "1d 1h 0m");
/// ```
pub fn format_minutes(minutes: i64) -> String {
    if minutes < 60 {
        return format!("{minutes}m");
    }

    let days = minutes / 1440;
    let hours = (minutes % 1440) / 60;
    let mins = minutes % 60;

    if days > 0 {
        format!("{days}d {hours}h {mins}m")
    } else {
        format!("{hours}h {mins}m")
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_day_and_month_keys() {
        let ts = Utc.with_ymd_and_hms(2025, 11, 3, 23, 59, 59).unwrap();
        assert_eq!(day_key(ts), "2025-11-03");
        assert_eq!(month_key(ts), "2025-11");
    }

    #[test]
    fn test_days_spanned_same_day() {
        let start = Utc.with_ymd_and_hms(2025, 1, 15, 8, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 1, 15, 20, 0, 0).unwrap();
        assert_eq!(days_spanned(start, end), 1);
    }

    #[test]
    fn test_days_spanned_across_month_boundary() {
        let start = Utc.with_ymd_and_hms(2025, 1, 30, 12, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 2, 2, 0, 0, 0).unwrap();
        assert_eq!(days_spanned(start, end), 4);
    }

    #[test]
    fn test_days_spanned_inverted_clamps() {
        let start = Utc.with_ymd_and_hms(2025, 5, 10, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
        assert_eq!(days_spanned(start, end), 1);
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(0), "0m");
        assert_eq!(format_minutes(59), "59m");
        assert_eq!(format_minutes(60), "1h 0m");
        assert_eq!(format_minutes(90), "1h 30m");
        assert_eq!(format_minutes(1440), "1d 0h 0m");
    }
}
