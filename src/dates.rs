//! Due-date classification and formatting.
//!
//! Pure functions over `(date, now)` pairs. Calendar-day comparison is used
//! throughout (via `date_naive()`) rather than timestamp subtraction, so a
//! due date at exactly midnight classifies the same as one at 11:59 PM on
//! the same day.

use chrono::{DateTime, Duration, Local};

use crate::fields::{DisplayBucket, Severity};

/// Classify a date into a relative calendar-day bucket.
pub fn classify(date: DateTime<Local>, now: DateTime<Local>) -> DisplayBucket {
    let day = date.date_naive();
    let today = now.date_naive();
    if day == today {
        DisplayBucket::Today
    } else if day == today + Duration::days(1) {
        DisplayBucket::Tomorrow
    } else if day == today - Duration::days(1) {
        DisplayBucket::Yesterday
    } else {
        DisplayBucket::Other
    }
}

/// Derive the urgency of a due date.
///
/// A date on a strictly earlier calendar day is overdue; a date on today's
/// calendar date is due today; everything else is normal.
pub fn severity(date: DateTime<Local>, now: DateTime<Local>) -> Severity {
    let day = date.date_naive();
    let today = now.date_naive();
    if day < today {
        Severity::Overdue
    } else if day == today {
        Severity::DueToday
    } else {
        Severity::Normal
    }
}

/// Format a due date with a relative label where one applies:
/// "Today, 3:00 PM", "Tomorrow, 9:15 AM", "Yesterday, 11:00 AM",
/// otherwise "Jun 12, 2025, 3:00 PM".
pub fn format_due(date: DateTime<Local>, now: DateTime<Local>) -> String {
    let time = date.format("%-I:%M %p");
    match classify(date, now) {
        DisplayBucket::Today => format!("Today, {}", time),
        DisplayBucket::Tomorrow => format!("Tomorrow, {}", time),
        DisplayBucket::Yesterday => format!("Yesterday, {}", time),
        DisplayBucket::Other => date.format("%b %-d, %Y, %-I:%M %p").to_string(),
    }
}

/// Days from now until the date, as the ceiling of the second-level
/// difference. Negative for dates in the past. This is the day-window
/// arithmetic used by the filter engine.
pub fn days_from_now(date: DateTime<Local>, now: DateTime<Local>) -> i64 {
    let secs = date.signed_duration_since(now).num_seconds();
    // Integer ceiling of secs / 86400.
    secs.div_euclid(86_400) + i64::from(secs.rem_euclid(86_400) > 0)
}

/// Whole days a date is past due, 0 if it is not in the past.
pub fn days_overdue(date: DateTime<Local>, now: DateTime<Local>) -> i64 {
    let days = now.signed_duration_since(date).num_days();
    days.max(0)
}

/// Parse human-readable due date input from the task form.
///
/// Supports "today", "tomorrow", "in Nd", "YYYY-MM-DD" and
/// "YYYY-MM-DD HH:MM". Bare dates get a 5:00 PM deadline.
pub fn parse_due_input(s: &str, now: DateTime<Local>) -> Option<DateTime<Local>> {
    let s = s.trim().to_lowercase();
    let end_of_day = |d: chrono::NaiveDate| {
        d.and_hms_opt(17, 0, 0)
            .and_then(|dt| dt.and_local_timezone(Local).single())
    };

    match s.as_str() {
        "today" => return end_of_day(now.date_naive()),
        "tomorrow" => return end_of_day(now.date_naive() + Duration::days(1)),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        if let Some(nd) = rest.strip_suffix('d') {
            if let Ok(days) = nd.trim().parse::<i64>() {
                return end_of_day(now.date_naive() + Duration::days(days));
            }
        }
    }

    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M") {
        return dt.and_local_timezone(Local).single();
    }
    chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d")
        .ok()
        .and_then(end_of_day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_classify_buckets() {
        let now = at(2025, 6, 10, 14, 0);
        assert_eq!(classify(at(2025, 6, 10, 9, 0), now), DisplayBucket::Today);
        assert_eq!(classify(at(2025, 6, 11, 9, 0), now), DisplayBucket::Tomorrow);
        assert_eq!(classify(at(2025, 6, 9, 23, 59), now), DisplayBucket::Yesterday);
        assert_eq!(classify(at(2025, 7, 1, 9, 0), now), DisplayBucket::Other);
    }

    #[test]
    fn test_classify_at_midnight_uses_calendar_day() {
        // Midnight on today's date is still today, even though the
        // timestamp difference is almost a full day.
        let now = at(2025, 6, 10, 23, 30);
        assert_eq!(classify(at(2025, 6, 10, 0, 0), now), DisplayBucket::Today);
        assert_eq!(classify(at(2025, 6, 11, 0, 0), now), DisplayBucket::Tomorrow);
    }

    #[test]
    fn test_severity_right_now_is_due_today() {
        let now = at(2025, 6, 10, 14, 0);
        assert_eq!(severity(now, now), Severity::DueToday);
    }

    #[test]
    fn test_severity_25_hours_past_is_overdue() {
        let now = at(2025, 6, 10, 14, 0);
        assert_eq!(severity(at(2025, 6, 9, 13, 0), now), Severity::Overdue);
    }

    #[test]
    fn test_severity_two_days_out_is_normal() {
        let now = at(2025, 6, 10, 14, 0);
        assert_eq!(severity(at(2025, 6, 12, 14, 0), now), Severity::Normal);
    }

    #[test]
    fn test_severity_earlier_today_is_due_today_not_overdue() {
        let now = at(2025, 6, 10, 14, 0);
        assert_eq!(severity(at(2025, 6, 10, 8, 0), now), Severity::DueToday);
    }

    #[test]
    fn test_format_due() {
        let now = at(2025, 6, 10, 14, 0);
        assert_eq!(format_due(at(2025, 6, 10, 15, 0), now), "Today, 3:00 PM");
        assert_eq!(format_due(at(2025, 6, 11, 9, 15), now), "Tomorrow, 9:15 AM");
        assert_eq!(format_due(at(2025, 6, 9, 11, 0), now), "Yesterday, 11:00 AM");
        assert_eq!(format_due(at(2025, 6, 12, 15, 0), now), "Jun 12, 2025, 3:00 PM");
    }

    #[test]
    fn test_days_from_now_rounds_up() {
        let now = at(2025, 6, 10, 14, 0);
        assert_eq!(days_from_now(at(2025, 6, 15, 14, 0), now), 5);
        // A partial day still counts as a day ahead.
        assert_eq!(days_from_now(at(2025, 6, 11, 9, 0), now), 1);
        assert_eq!(days_from_now(now, now), 0);
        assert_eq!(days_from_now(at(2025, 6, 8, 14, 0), now), -2);
    }

    #[test]
    fn test_parse_due_input() {
        let now = at(2025, 6, 10, 14, 0);
        assert_eq!(parse_due_input("today", now), Some(at(2025, 6, 10, 17, 0)));
        assert_eq!(parse_due_input("tomorrow", now), Some(at(2025, 6, 11, 17, 0)));
        assert_eq!(parse_due_input("in 3d", now), Some(at(2025, 6, 13, 17, 0)));
        assert_eq!(parse_due_input("2025-07-01", now), Some(at(2025, 7, 1, 17, 0)));
        assert_eq!(
            parse_due_input("2025-07-01 09:30", now),
            Some(at(2025, 7, 1, 9, 30))
        );
        assert_eq!(parse_due_input("next quarter", now), None);
    }

    #[test]
    fn test_days_overdue() {
        let now = at(2025, 6, 10, 14, 0);
        assert_eq!(days_overdue(at(2025, 6, 7, 14, 0), now), 3);
        assert_eq!(days_overdue(at(2025, 6, 12, 14, 0), now), 0);
    }
}
