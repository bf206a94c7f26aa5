//! Everything the dashboard shows for one instant, computed in one place.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::countdown::{TestCountdown, next_test};
use crate::feed::Feed;
use crate::next_class::{NextClass, next_class_at};
use crate::schedule::{DaySchedule, resolve_day};

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub class: String,
    pub local_now: DateTime<Tz>,
    pub schedule: DaySchedule,
    pub next_class: NextClass,
    pub next_test: Option<TestCountdown>,
}

pub fn build_snapshot(feed: &Feed, class: &str, now: DateTime<Utc>, tz: Tz) -> DashboardSnapshot {
    let local_now = now.with_timezone(&tz);
    DashboardSnapshot {
        class: class.to_string(),
        schedule: resolve_day(feed, class, &local_now),
        next_class: next_class_at(feed, class, &local_now),
        next_test: next_test(&feed.tests, now, tz),
        local_now,
    }
}
