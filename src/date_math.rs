/*
Calendar-day arithmetic used by scoring and state transitions.
Deadlines carry no time-of-day, so "now" is reduced to its calendar
day (in its own offset) before comparing.
*/

use chrono::{DateTime, FixedOffset, NaiveDate};

// Signed whole days from today to the deadline.
//
// - deadline tomorrow -> 1
// - deadline today    -> 0
// - deadline passed   -> negative
// - no deadline       -> 0 (same as "due today")
pub fn days_remaining(deadline: Option<NaiveDate>, now: DateTime<FixedOffset>) -> i64 {
    let Some(deadline) = deadline else {
        return 0;
    };
    let today = now.date_naive();
    (deadline - today).num_days()
}

// Fractional days elapsed between two instants.
pub fn days_between(earlier: DateTime<FixedOffset>, later: DateTime<FixedOffset>) -> f64 {
    let ms = (later - earlier).num_milliseconds();
    ms as f64 / (24.0 * 60.0 * 60.0 * 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn time_of_day_is_ignored() {
        let morning = at("2026-03-10T00:05:00+09:00");
        let night = at("2026-03-10T23:55:00+09:00");
        let deadline = Some(date("2026-03-15"));
        assert_eq!(days_remaining(deadline, morning), 5);
        assert_eq!(days_remaining(deadline, night), 5);
    }

    #[test]
    fn today_and_past_deadlines() {
        let now = at("2026-03-10T12:00:00+00:00");
        assert_eq!(days_remaining(Some(date("2026-03-10")), now), 0);
        assert_eq!(days_remaining(Some(date("2026-03-07")), now), -3);
    }

    #[test]
    fn local_offset_decides_the_day() {
        // 2026-03-10 23:30 UTC is already 2026-03-11 in Seoul
        let seoul = at("2026-03-11T08:30:00+09:00");
        assert_eq!(days_remaining(Some(date("2026-03-12")), seoul), 1);
    }

    #[test]
    fn missing_deadline_counts_as_zero() {
        assert_eq!(days_remaining(None, at("2026-03-10T12:00:00+00:00")), 0);
    }

    #[test]
    fn fractional_days_between() {
        let a = at("2026-03-10T00:00:00+00:00");
        let b = at("2026-03-11T12:00:00+00:00");
        assert!((days_between(a, b) - 1.5).abs() < 1e-9);
    }
}
