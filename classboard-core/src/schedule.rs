//! Schedule resolver: today's subject list and which period is active.

use chrono::{DateTime, Datelike, TimeZone};
use serde::{Deserialize, Serialize};

use crate::feed::{Feed, PeriodSetting, subject_at};
use crate::time::minutes_of_day;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodEntry {
    /// 1-based period number.
    pub period: usize,
    pub subject: String,
    pub start: String,
    pub end: String,
    pub is_current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DaySchedule {
    /// The day has no subject list (or an empty one).
    NoClasses,
    Periods(Vec<PeriodEntry>),
}

impl DaySchedule {
    pub fn entries(&self) -> &[PeriodEntry] {
        match self {
            DaySchedule::NoClasses => &[],
            DaySchedule::Periods(entries) => entries,
        }
    }

    pub fn current(&self) -> Option<&PeriodEntry> {
        self.entries().iter().find(|e| e.is_current)
    }
}

/// Resolve a day's periods against the time settings at `now_minutes`.
///
/// A period is listed only when its subject is non-empty and its time setting
/// exists and parses. It is current when `start <= now <= end`.
pub fn resolve_periods(
    settings: &[PeriodSetting],
    subjects: Option<&[Option<String>]>,
    now_minutes: u32,
) -> DaySchedule {
    let Some(subjects) = subjects.filter(|s| !s.is_empty()) else {
        return DaySchedule::NoClasses;
    };

    let entries = (0..subjects.len())
        .filter_map(|i| {
            let subject = subject_at(subjects, i)?;
            let setting = settings.get(i)?;
            let (Some(start), Some(end)) = (setting.start_minutes(), setting.end_minutes()) else {
                tracing::debug!(period = i + 1, start = %setting.start, end = %setting.end, "skipping period with unparseable time");
                return None;
            };
            Some(PeriodEntry {
                period: i + 1,
                subject: subject.to_string(),
                start: setting.start.clone(),
                end: setting.end.clone(),
                is_current: start <= now_minutes && now_minutes <= end,
            })
        })
        .collect();

    DaySchedule::Periods(entries)
}

/// Resolve `class`'s timetable for the local day and time in `now`.
pub fn resolve_day<Tz: TimeZone>(feed: &Feed, class: &str, now: &DateTime<Tz>) -> DaySchedule {
    resolve_periods(
        &feed.time_settings,
        feed.subjects_for(class, now.weekday()),
        minutes_of_day(now),
    )
}
