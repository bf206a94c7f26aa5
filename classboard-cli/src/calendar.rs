use anyhow::{Context, Result, bail};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use clap::Subcommand;
use classboard_core::storage::KEY_CALENDAR_URL;
use classboard_core::{Feed, KeyValueStore, resolve_periods};
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum CalendarCommand {
    /// Print the saved calendar URL
    Show,

    /// Save the calendar embed/share URL
    SetUrl { url: String },

    /// Forget the saved calendar URL
    ClearUrl,

    /// Export this week's timetable and upcoming tests as iCalendar
    ExportIcs {
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

pub struct CalendarEvent {
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
    pub summary: String,
    pub description: String,
}

pub fn run(
    cmd: CalendarCommand,
    store: &mut dyn KeyValueStore,
    feed: Option<&Feed>,
    class: &str,
    tz: Tz,
) -> Result<()> {
    match cmd {
        CalendarCommand::Show => match store.get(KEY_CALENDAR_URL)? {
            Some(url) => println!("{url}"),
            None => println!("No calendar URL saved. Set one with: classboard calendar set-url <url>"),
        },
        CalendarCommand::SetUrl { url } => {
            let url = url.trim();
            let lower = url.to_ascii_lowercase();
            if !(lower.starts_with("https://") || lower.starts_with("http://")) {
                bail!("calendar URL must start with http:// or https://");
            }
            store.set(KEY_CALENDAR_URL, url)?;
            println!("Saved calendar URL");
        }
        CalendarCommand::ClearUrl => {
            store.remove(KEY_CALENDAR_URL)?;
            println!("Cleared calendar URL");
        }
        CalendarCommand::ExportIcs { out } => {
            let feed = feed.context("feed is required for export")?;
            let now = Utc::now();
            let today = now.with_timezone(&tz).date_naive();
            let mut events = week_events(feed, class, today, tz);
            events.extend(test_events(feed, now, tz));
            let ics = events_to_ics(&events);
            match out {
                Some(path) => {
                    std::fs::write(&path, ics).with_context(|| format!("write {}", path.display()))?;
                    println!("Wrote {} events to {}", events.len(), path.display());
                }
                None => print!("{ics}"),
            }
        }
    }
    Ok(())
}

fn local_to_utc(date: NaiveDate, minutes: u32, tz: Tz) -> Option<DateTime<Utc>> {
    // "24:00" ends at midnight of the next day.
    let (date, minutes) = if minutes >= 24 * 60 {
        (date.succ_opt()?, minutes - 24 * 60)
    } else {
        (date, minutes)
    };
    let time = NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)?;
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Class periods for the Sunday-to-Saturday week containing `today`.
pub fn week_events(feed: &Feed, class: &str, today: NaiveDate, tz: Tz) -> Vec<CalendarEvent> {
    let sunday = today - Duration::days(today.weekday().num_days_from_sunday().into());
    let mut events = Vec::new();

    for offset in 0..7 {
        let date = sunday + Duration::days(offset);
        let day = resolve_periods(
            &feed.time_settings,
            feed.subjects_for(class, date.weekday()),
            0,
        );
        for entry in day.entries() {
            let Some(setting) = feed.time_settings.get(entry.period - 1) else {
                continue;
            };
            let (Some(start), Some(end)) = (setting.start_minutes(), setting.end_minutes()) else {
                continue;
            };
            let (Some(start_utc), Some(end_utc)) =
                (local_to_utc(date, start, tz), local_to_utc(date, end, tz))
            else {
                continue;
            };
            events.push(CalendarEvent {
                start_utc,
                end_utc,
                summary: format!("{}. {}", entry.period, entry.subject),
                description: format!("Class: {class}\nPeriod: {}\n", entry.period),
            });
        }
    }

    events
}

/// Upcoming tests as one-hour events.
pub fn test_events(feed: &Feed, now: DateTime<Utc>, tz: Tz) -> Vec<CalendarEvent> {
    feed.tests
        .iter()
        .filter_map(|t| {
            let at = classboard_core::time::parse_test_date(&t.date, tz).ok()?;
            (at > now).then(|| CalendarEvent {
                start_utc: at,
                end_utc: at + Duration::hours(1),
                summary: format!("Test: {}", t.name),
                description: String::new(),
            })
        })
        .collect()
}

/// Emit a minimal ICS calendar containing VEVENT blocks (DTSTART/DTEND in UTC).
pub fn events_to_ics(events: &[CalendarEvent]) -> String {
    let mut s = String::new();
    s.push_str("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Classboard//EN\r\n");

    for e in events {
        let dtstart = e.start_utc.format("%Y%m%dT%H%M%SZ");
        let dtend = e.end_utc.format("%Y%m%dT%H%M%SZ");

        s.push_str("BEGIN:VEVENT\r\n");
        s.push_str(&format!(
            "UID:{}-{}@classboard\r\n",
            dtstart,
            uid_slug(&e.summary)
        ));
        s.push_str(&format!("DTSTAMP:{}\r\n", dtstart));
        s.push_str(&format!("DTSTART:{}\r\n", dtstart));
        s.push_str(&format!("DTEND:{}\r\n", dtend));
        s.push_str(&format!("SUMMARY:{}\r\n", escape_ics(&e.summary)));
        if !e.description.is_empty() {
            s.push_str(&format!("DESCRIPTION:{}\r\n", escape_ics(&e.description)));
        }
        s.push_str("END:VEVENT\r\n");
    }

    s.push_str("END:VCALENDAR\r\n");
    s
}

fn uid_slug(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect()
}

fn escape_ics(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace(',', "\\,")
        .replace(';', "\\;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use classboard_core::MemoryStore;

    const FEED: &str = r#"{
        "timeSettings": [{"start": "8:50", "end": "9:40"}, {"start": "9:50", "end": "10:40"}],
        "schedules": {"21HR": {"Mon": ["Math", "English"], "Fri": [null, "PE"]}},
        "tests": [{"name": "Midterm", "date": "2026-10-26"}, {"name": "Old", "date": "2026-01-01"}]
    }"#;

    #[test]
    fn week_covers_sunday_to_saturday() {
        let feed: Feed = serde_json::from_str(FEED).unwrap();
        let tz = chrono_tz::Asia::Tokyo;
        // Friday 2026-10-16; its week starts Sunday 2026-10-11.
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let events = week_events(&feed, "21HR", today, tz);
        let summaries: Vec<&str> = events.iter().map(|e| e.summary.as_str()).collect();
        assert_eq!(summaries, vec!["1. Math", "2. English", "2. PE"]);
        // Monday 8:50 JST
        assert_eq!(events[0].start_utc.to_rfc3339(), "2026-10-11T23:50:00+00:00");
    }

    #[test]
    fn only_future_tests_exported() {
        let feed: Feed = serde_json::from_str(FEED).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap();
        let events = test_events(&feed, now, chrono_tz::Asia::Tokyo);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "Test: Midterm");
    }

    #[test]
    fn ics_escapes_text() {
        let ev = CalendarEvent {
            start_utc: Utc.with_ymd_and_hms(2026, 10, 11, 23, 50, 0).unwrap(),
            end_utc: Utc.with_ymd_and_hms(2026, 10, 12, 0, 40, 0).unwrap(),
            summary: "1. Math; algebra, review".to_string(),
            description: String::new(),
        };
        let ics = events_to_ics(&[ev]);
        assert!(ics.contains("DTSTART:20261011T235000Z\r\n"));
        assert!(ics.contains("SUMMARY:1. Math\\; algebra\\, review\r\n"));
        assert!(!ics.contains("DESCRIPTION"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
    }

    #[test]
    fn url_must_be_http() {
        let mut store = MemoryStore::new();
        let tz = chrono_tz::Asia::Tokyo;
        assert!(run(CalendarCommand::SetUrl { url: "javascript:alert(1)".into() }, &mut store, None, "21HR", tz).is_err());
        run(CalendarCommand::SetUrl { url: "https://calendar.example/embed".into() }, &mut store, None, "21HR", tz).unwrap();
        assert_eq!(
            store.get(KEY_CALENDAR_URL).unwrap().as_deref(),
            Some("https://calendar.example/embed")
        );
    }
}
