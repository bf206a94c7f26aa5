//! Next-event finder: the first period later today that has a subject.

use chrono::{DateTime, Datelike, TimeZone};
use serde::{Deserialize, Serialize};

use crate::feed::{Feed, PeriodSetting, subject_at};
use crate::time::minutes_of_day;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NextClass {
    /// No subject list for today at all.
    NoClassesToday,
    Upcoming {
        period: usize,
        subject: String,
        start: String,
        minutes_until: u32,
    },
    /// Every remaining period has started already, or none has a subject.
    AfterSchool,
}

/// Find the first period whose start is strictly after `now_minutes` and whose
/// slot holds a subject.
pub fn find_next_class(
    settings: &[PeriodSetting],
    subjects: Option<&[Option<String>]>,
    now_minutes: u32,
) -> NextClass {
    let Some(subjects) = subjects else {
        return NextClass::NoClassesToday;
    };

    settings
        .iter()
        .enumerate()
        .find_map(|(i, setting)| {
            let start = setting.start_minutes()?;
            if start <= now_minutes {
                return None;
            }
            let subject = subject_at(subjects, i)?;
            Some(NextClass::Upcoming {
                period: i + 1,
                subject: subject.to_string(),
                start: setting.start.clone(),
                minutes_until: start - now_minutes,
            })
        })
        .unwrap_or(NextClass::AfterSchool)
}

pub fn next_class_at<Tz: TimeZone>(feed: &Feed, class: &str, now: &DateTime<Tz>) -> NextClass {
    find_next_class(
        &feed.time_settings,
        feed.subjects_for(class, now.weekday()),
        minutes_of_day(now),
    )
}
