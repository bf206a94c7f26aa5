//! Test countdown: nearest future test and the days left until it.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::feed::TestEvent;
use crate::time::parse_test_date;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCountdown {
    pub name: String,
    pub at: DateTime<Utc>,
    /// Whole days remaining, counting the current partial day.
    pub days_remaining: i64,
}

/// Earliest test strictly after `now`. Ties keep feed order; unparseable dates are dropped.
pub fn next_test(tests: &[TestEvent], now: DateTime<Utc>, tz: Tz) -> Option<TestCountdown> {
    tests
        .iter()
        .filter_map(|t| match parse_test_date(&t.date, tz) {
            Ok(at) => Some((t, at)),
            Err(e) => {
                tracing::debug!(name = %t.name, error = %e, "dropping test with bad date");
                None
            }
        })
        .filter(|(_, at)| *at > now)
        .min_by_key(|(_, at)| *at)
        .map(|(t, at)| TestCountdown {
            name: t.name.clone(),
            at,
            days_remaining: days_until(now, at),
        })
}

/// `floor((at - now) / 1 day) + 1`, so a test later today reads as 1 day.
pub fn days_until(now: DateTime<Utc>, at: DateTime<Utc>) -> i64 {
    (at - now).num_seconds().div_euclid(SECONDS_PER_DAY) + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tokyo() -> Tz {
        chrono_tz::Asia::Tokyo
    }

    fn test(name: &str, date: &str) -> TestEvent {
        TestEvent {
            name: name.to_string(),
            date: date.to_string(),
        }
    }

    #[test]
    fn no_future_tests() {
        let now = Utc.with_ymd_and_hms(2026, 12, 1, 0, 0, 0).unwrap();
        assert!(next_test(&[], now, tokyo()).is_none());
        assert!(next_test(&[test("Old", "2026-11-02")], now, tokyo()).is_none());
    }

    #[test]
    fn picks_nearest_regardless_of_feed_order() {
        // 2026-10-16 12:00 JST
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 3, 0, 0).unwrap();
        let tests = vec![
            test("Finals", "2027-02-10"),
            test("Midterm", "2026-10-20"),
            test("Quiz", "2026-10-01"),
        ];
        let cd = next_test(&tests, now, tokyo()).unwrap();
        assert_eq!(cd.name, "Midterm");
        // 3 days 21 hours away
        assert_eq!(cd.days_remaining, 4);
    }

    #[test]
    fn same_instant_keeps_feed_order() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 3, 0, 0).unwrap();
        let tests = vec![test("Physics", "2026-10-20"), test("Chemistry", "2026-10-20")];
        assert_eq!(next_test(&tests, now, tokyo()).unwrap().name, "Physics");
    }

    #[test]
    fn bad_dates_are_skipped() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 3, 0, 0).unwrap();
        let tests = vec![test("Broken", "someday"), test("Midterm", "2026-10-20")];
        assert_eq!(next_test(&tests, now, tokyo()).unwrap().name, "Midterm");
    }

    #[test]
    fn test_at_exactly_now_is_past() {
        let now = Utc.with_ymd_and_hms(2026, 10, 20, 0, 0, 0).unwrap();
        assert!(next_test(&[test("Midterm", "2026-10-20")], now, tokyo()).is_none());
    }

    #[test]
    fn date_only_test_lasts_until_utc_midnight() {
        // 2026-11-24 08:00 JST, still 2026-11-23 in UTC
        let now = Utc.with_ymd_and_hms(2026, 11, 23, 23, 0, 0).unwrap();
        let cd = next_test(&[test("Midterm", "2026-11-24")], now, tokyo()).unwrap();
        assert_eq!(cd.name, "Midterm");
        assert_eq!(cd.days_remaining, 1);
    }

    #[test]
    fn day_count_boundaries() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap();
        assert_eq!(days_until(now, now + chrono::Duration::minutes(1)), 1);
        assert_eq!(days_until(now, now + chrono::Duration::days(1)), 2);
        assert_eq!(days_until(now, now + chrono::Duration::hours(47)), 2);
    }
}
