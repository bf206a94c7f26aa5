//! classboard-core: timetable, countdown, todo and pomodoro logic for the Classboard dashboard

pub mod countdown;
pub mod feed;
pub mod next_class;
pub mod pomodoro;
pub mod schedule;
pub mod snapshot;
pub mod storage;
pub mod time;
pub mod todo;

pub use countdown::{TestCountdown, days_until, next_test};
pub use feed::{DaySubjects, Feed, PeriodSetting, TestEvent, WeeklySchedule};
pub use next_class::{NextClass, find_next_class, next_class_at};
pub use pomodoro::{Pomodoro, PomodoroState, TickOutcome};
pub use schedule::{DaySchedule, PeriodEntry, resolve_day, resolve_periods};
pub use snapshot::{DashboardSnapshot, build_snapshot};
pub use storage::{DEFAULT_CLASS, KeyValueStore, MemoryStore, selected_class};
pub use todo::{Progress, TodoAction, TodoItem, TodoList, apply_persisted};
