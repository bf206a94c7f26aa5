//! Plain-text wording shared by `classboard status` and the dashboard TUI.

use chrono::DateTime;
use chrono_tz::Tz;
use classboard_core::{
    DashboardSnapshot, DaySchedule, NextClass, PeriodEntry, TestCountdown, TodoList,
};

pub fn clock_time(now: &DateTime<Tz>) -> String {
    now.format("%H:%M:%S").to_string()
}

pub fn clock_date(now: &DateTime<Tz>) -> String {
    now.format("%A, %B %-d, %Y").to_string()
}

/// Headline and detail line for the next-class card.
pub fn next_class_text(next: &NextClass) -> (String, String) {
    match next {
        NextClass::NoClassesToday => ("No classes".to_string(), String::new()),
        NextClass::Upcoming {
            subject,
            start,
            minutes_until,
            ..
        } => (
            subject.clone(),
            format!("starts {start} (in {minutes_until} min)"),
        ),
        NextClass::AfterSchool => (
            "After school".to_string(),
            "Classes are over for today".to_string(),
        ),
    }
}

/// Headline and detail line for the test countdown card.
pub fn test_text(test: Option<&TestCountdown>) -> (String, String) {
    match test {
        None => ("No upcoming tests".to_string(), String::new()),
        Some(t) if t.days_remaining == 1 => (t.name.clone(), "1 day left".to_string()),
        Some(t) => (t.name.clone(), format!("{} days left", t.days_remaining)),
    }
}

pub fn period_line(e: &PeriodEntry) -> String {
    let badge = if e.is_current { "  NOW" } else { "" };
    format!("{:>2}  {:<16} {} - {}{}", e.period, e.subject, e.start, e.end, badge)
}

pub fn schedule_lines(schedule: &DaySchedule) -> Vec<String> {
    match schedule {
        DaySchedule::NoClasses => vec!["No classes today".to_string()],
        DaySchedule::Periods(entries) => entries.iter().map(period_line).collect(),
    }
}

pub fn todo_line(index: usize, done: bool, text: &str) -> String {
    let mark = if done { "x" } else { " " };
    format!("{index:>3}. [{mark}] {text}")
}

pub fn todo_lines(todos: &TodoList) -> Vec<String> {
    todos
        .items()
        .iter()
        .enumerate()
        .map(|(i, t)| todo_line(i, t.done, &t.text))
        .collect()
}

/// Text-mode progress bar, `width` cells wide.
pub fn progress_bar(percent: u32, width: usize) -> String {
    let filled = (percent.min(100) as usize * width + 50) / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

pub fn print_status(snap: &DashboardSnapshot, todos: &TodoList) {
    println!("{}  {}", clock_time(&snap.local_now), clock_date(&snap.local_now));
    println!("Class: {}\n", snap.class);

    println!("## Timetable ({})\n", snap.local_now.format("%A"));
    for line in schedule_lines(&snap.schedule) {
        println!("{line}");
    }

    let (subject, detail) = next_class_text(&snap.next_class);
    println!("\n## Next class\n\n{subject}");
    if !detail.is_empty() {
        println!("{detail}");
    }

    let (name, detail) = test_text(snap.next_test.as_ref());
    println!("\n## Next test\n\n{name}");
    if !detail.is_empty() {
        println!("{detail}");
    }

    let progress = todos.progress();
    println!("\n## Todo  {}  {}\n", progress, progress_bar(progress.percent, 20));
    for line in todo_lines(todos) {
        println!("{line}");
    }
}
