//! Data feed model: period times, per-class weekly timetables and test dates.
//!
//! Every field defaults to empty so a partial feed still deserializes; malformed
//! entries are skipped later by the resolvers rather than rejected here.

use std::collections::BTreeMap;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::time::{day_key, parse_clock_minutes};

/// Subjects for one weekday, indexed by period. `None`/empty means a free period.
pub type DaySubjects = Vec<Option<String>>;

/// Day key ("Mon", "Tue", ...) to that day's subjects.
pub type WeeklySchedule = BTreeMap<String, DaySubjects>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    #[serde(default)]
    pub time_settings: Vec<PeriodSetting>,
    #[serde(default)]
    pub schedules: BTreeMap<String, WeeklySchedule>,
    #[serde(default)]
    pub tests: Vec<TestEvent>,
}

/// Start/end of one period as written in the feed ("8:50", "09:40").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSetting {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
}

impl PeriodSetting {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn start_minutes(&self) -> Option<u32> {
        parse_clock_minutes(&self.start)
    }

    pub fn end_minutes(&self) -> Option<u32> {
        parse_clock_minutes(&self.end)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestEvent {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date: String,
}

impl Feed {
    pub fn class_schedule(&self, class: &str) -> Option<&WeeklySchedule> {
        self.schedules.get(class)
    }

    /// Subject list for `class` on `weekday`, or `None` when the day (or class) is absent.
    pub fn subjects_for(&self, class: &str, weekday: Weekday) -> Option<&[Option<String>]> {
        self.class_schedule(class)
            .and_then(|week| week.get(day_key(weekday)))
            .map(Vec::as_slice)
    }

    pub fn class_names(&self) -> Vec<&str> {
        self.schedules.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.time_settings.is_empty() && self.schedules.is_empty() && self.tests.is_empty()
    }
}

/// A subject slot counts only when it holds non-blank text.
pub fn subject_at(subjects: &[Option<String>], index: usize) -> Option<&str> {
    subjects
        .get(index)
        .and_then(|s| s.as_deref())
        .filter(|s| !s.trim().is_empty())
}
