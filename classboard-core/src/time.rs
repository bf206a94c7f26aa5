//! Time utilities: clock-of-day parsing, weekday keys and timezone-aware test dates.

use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;

/// Weekday keys used by the schedule table, indexed from Sunday.
pub const DAY_KEYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub fn day_key(weekday: Weekday) -> &'static str {
    DAY_KEYS[weekday.num_days_from_sunday() as usize]
}

/// Minutes since local midnight, ignoring seconds.
pub fn minutes_of_day<T: Timelike>(t: &T) -> u32 {
    t.hour() * 60 + t.minute()
}

/// Parse a period boundary like "8:50", "08:50" or "08:50:00" into minutes since midnight.
///
/// A trailing seconds field is ignored. Returns `None` for anything that is not
/// `H:MM` within a day ("24:00" is accepted as end of day).
pub fn parse_clock_minutes(s: &str) -> Option<u32> {
    let mut fields = s.trim().splitn(3, ':');
    let h: u32 = fields.next()?.trim().parse().ok()?;
    let m: u32 = fields.next()?.trim().parse().ok()?;
    if m >= 60 || h > 24 || (h == 24 && m != 0) {
        return None;
    }
    Some(h * 60 + m)
}

/// Parse a test date from the feed, returning UTC.
///
/// Accepted forms:
/// - RFC 3339 with offset: "2026-11-02T09:00:00+09:00"
/// - local date-time in `tz`: "2026-11-02T09:00", "2026-11-02T09:00:00", "2026-11-02 09:00"
/// - date only, read as UTC midnight: "2026-11-02"
pub fn parse_test_date(raw: &str, tz: Tz) -> Result<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| anyhow!("invalid test date '{raw}'"))?;
        return Ok(midnight.and_utc());
    }

    let naive = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| anyhow!("invalid test date '{raw}'"))?;

    let local = tz
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| anyhow!("nonexistent local time (DST gap?): {raw} {tz}"))?;

    Ok(local.with_timezone(&Utc))
}

/// Parse an IANA timezone name like "Asia/Tokyo".
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| anyhow!("invalid timezone: {name}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn clock_minutes_accepts_single_digit_hours() {
        assert_eq!(parse_clock_minutes("8:50"), Some(530));
        assert_eq!(parse_clock_minutes("08:50"), Some(530));
        assert_eq!(parse_clock_minutes(" 15:05 "), Some(905));
        assert_eq!(parse_clock_minutes("24:00"), Some(1440));
    }

    #[test]
    fn clock_minutes_ignores_seconds_field() {
        assert_eq!(parse_clock_minutes("08:50:00"), Some(530));
        assert_eq!(parse_clock_minutes("15:05:30"), Some(905));
        assert_eq!(parse_clock_minutes("8:60:00"), None);
    }

    #[test]
    fn clock_minutes_rejects_garbage() {
        assert_eq!(parse_clock_minutes("850"), None);
        assert_eq!(parse_clock_minutes("8:60"), None);
        assert_eq!(parse_clock_minutes("25:00"), None);
        assert_eq!(parse_clock_minutes("ab:cd"), None);
        assert_eq!(parse_clock_minutes(""), None);
    }

    #[test]
    fn day_keys_start_on_sunday() {
        assert_eq!(day_key(Weekday::Sun), "Sun");
        assert_eq!(day_key(Weekday::Wed), "Wed");
        assert_eq!(day_key(Weekday::Sat), "Sat");
    }

    #[test]
    fn minutes_ignore_seconds() {
        let t = NaiveTime::from_hms_opt(9, 41, 59).unwrap();
        assert_eq!(minutes_of_day(&t), 581);
    }

    #[test]
    fn date_only_is_utc_midnight() {
        let tz = parse_timezone("Asia/Tokyo").unwrap();
        let utc = parse_test_date("2026-11-02", tz).unwrap();
        assert_eq!(utc.to_rfc3339(), "2026-11-02T00:00:00+00:00");
    }

    #[test]
    fn offset_dates_ignore_configured_zone() {
        let tz = parse_timezone("America/Chicago").unwrap();
        let utc = parse_test_date("2026-11-02T09:00:00+09:00", tz).unwrap();
        assert_eq!(utc.to_rfc3339(), "2026-11-02T00:00:00+00:00");
    }

    #[test]
    fn local_datetime_uses_zone() {
        let tz = parse_timezone("Asia/Tokyo").unwrap();
        let utc = parse_test_date("2026-11-02T09:30", tz).unwrap();
        assert_eq!(utc.to_rfc3339(), "2026-11-02T00:30:00+00:00");
    }

    #[test]
    fn bad_inputs_error() {
        let tz = parse_timezone("Asia/Tokyo").unwrap();
        assert!(parse_test_date("next tuesday", tz).is_err());
        assert!(parse_timezone("Mars/Olympus").is_err());
    }
}
