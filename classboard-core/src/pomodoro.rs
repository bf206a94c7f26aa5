//! Pomodoro focus timer: a running/not-running countdown driven by one-second ticks.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::storage::{KEY_POMO_DURATION, KeyValueStore};

pub const DEFAULT_DURATION_MINUTES: u32 = 25;
/// One day; longer sessions are rejected.
pub const MAX_DURATION_MINUTES: u32 = 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PomodoroState {
    /// Full duration loaded, never started since the last reset.
    Ready,
    Running,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running; nothing changed.
    Idle,
    Ticked,
    /// Countdown had already reached zero; timer has been reset.
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pomodoro {
    duration_minutes: u32,
    remaining_seconds: u32,
    state: PomodoroState,
}

impl Default for Pomodoro {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_MINUTES)
    }
}

impl Pomodoro {
    /// A zero duration falls back to the default; anything longer than a day is capped.
    pub fn new(duration_minutes: u32) -> Self {
        let duration_minutes = match duration_minutes {
            0 => DEFAULT_DURATION_MINUTES,
            m => m.min(MAX_DURATION_MINUTES),
        };
        Self {
            duration_minutes,
            remaining_seconds: duration_minutes * 60,
            state: PomodoroState::Ready,
        }
    }

    /// Build from the stored duration; missing or unparseable values use the default.
    pub fn load(store: &dyn KeyValueStore) -> Result<Self> {
        let minutes = store
            .get(KEY_POMO_DURATION)?
            .and_then(|raw| parse_duration(&raw))
            .unwrap_or(DEFAULT_DURATION_MINUTES);
        Ok(Self::new(minutes))
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn state(&self) -> PomodoroState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PomodoroState::Running
    }

    /// Pause when running, otherwise start or resume.
    pub fn toggle(&mut self) -> PomodoroState {
        self.state = match self.state {
            PomodoroState::Running => PomodoroState::Paused,
            PomodoroState::Ready | PomodoroState::Paused => PomodoroState::Running,
        };
        self.state
    }

    /// Advance one second.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_running() {
            return TickOutcome::Idle;
        }
        if self.remaining_seconds > 0 {
            self.remaining_seconds -= 1;
            TickOutcome::Ticked
        } else {
            self.reset();
            TickOutcome::Completed
        }
    }

    pub fn reset(&mut self) {
        self.remaining_seconds = self.duration_minutes * 60;
        self.state = PomodoroState::Ready;
    }

    /// Change the focus length; persists it and resets the countdown.
    pub fn set_duration(&mut self, minutes: u32, store: &mut dyn KeyValueStore) -> Result<()> {
        if minutes == 0 {
            bail!("pomodoro duration must be at least 1 minute");
        }
        if minutes > MAX_DURATION_MINUTES {
            bail!("pomodoro duration must be at most {MAX_DURATION_MINUTES} minutes");
        }
        store.set(KEY_POMO_DURATION, &minutes.to_string())?;
        self.duration_minutes = minutes;
        self.reset();
        Ok(())
    }

    /// Remaining time as `MM:SS`.
    pub fn display(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_seconds / 60,
            self.remaining_seconds % 60
        )
    }

    pub fn button_label(&self) -> &'static str {
        match self.state {
            PomodoroState::Ready => "Start",
            PomodoroState::Running => "Pause",
            PomodoroState::Paused => "Resume",
        }
    }
}

/// Leading-integer parse ("30", "30.5" -> 30); zero, negative or over a day is rejected.
pub fn parse_duration(raw: &str) -> Option<u32> {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits
        .parse::<u32>()
        .ok()
        .filter(|m| (1..=MAX_DURATION_MINUTES).contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn fresh_timer_shows_full_duration() {
        let p = Pomodoro::default();
        assert_eq!(p.display(), "25:00");
        assert_eq!(p.button_label(), "Start");
        assert_eq!(Pomodoro::new(0).duration_minutes(), 25);
    }

    #[test]
    fn toggle_cycles_running_and_paused() {
        let mut p = Pomodoro::new(1);
        assert_eq!(p.toggle(), PomodoroState::Running);
        assert_eq!(p.button_label(), "Pause");
        assert_eq!(p.toggle(), PomodoroState::Paused);
        assert_eq!(p.button_label(), "Resume");
        assert_eq!(p.toggle(), PomodoroState::Running);
    }

    #[test]
    fn ticks_only_while_running() {
        let mut p = Pomodoro::new(1);
        assert_eq!(p.tick(), TickOutcome::Idle);
        p.toggle();
        assert_eq!(p.tick(), TickOutcome::Ticked);
        assert_eq!(p.display(), "00:59");
        p.toggle();
        assert_eq!(p.tick(), TickOutcome::Idle);
        assert_eq!(p.remaining_seconds(), 59);
    }

    #[test]
    fn completes_one_tick_after_zero() {
        let mut p = Pomodoro::new(1);
        p.toggle();
        for _ in 0..60 {
            assert_eq!(p.tick(), TickOutcome::Ticked);
        }
        assert_eq!(p.display(), "00:00");
        assert_eq!(p.tick(), TickOutcome::Completed);
        assert_eq!(p.state(), PomodoroState::Ready);
        assert_eq!(p.display(), "01:00");
    }

    #[test]
    fn set_duration_validates_persists_and_resets() {
        let mut store = MemoryStore::new();
        let mut p = Pomodoro::default();
        p.toggle();
        p.tick();
        assert!(p.set_duration(0, &mut store).is_err());
        p.set_duration(50, &mut store).unwrap();
        assert_eq!(p.display(), "50:00");
        assert_eq!(p.state(), PomodoroState::Ready);
        assert_eq!(Pomodoro::load(&store).unwrap().duration_minutes(), 50);
    }

    #[test]
    fn load_falls_back_on_bad_values() {
        let mut store = MemoryStore::new();
        assert_eq!(Pomodoro::load(&store).unwrap().duration_minutes(), 25);
        store.set(KEY_POMO_DURATION, "abc").unwrap();
        assert_eq!(Pomodoro::load(&store).unwrap().duration_minutes(), 25);
        store.set(KEY_POMO_DURATION, "30.5").unwrap();
        assert_eq!(Pomodoro::load(&store).unwrap().duration_minutes(), 30);
    }

    #[test]
    fn oversized_durations_are_rejected() {
        let mut store = MemoryStore::new();
        let mut p = Pomodoro::default();
        assert!(p.set_duration(u32::MAX, &mut store).is_err());
        assert!(p.set_duration(MAX_DURATION_MINUTES + 1, &mut store).is_err());
        assert_eq!(store.get(KEY_POMO_DURATION).unwrap(), None);
        assert_eq!(p.display(), "25:00");

        p.set_duration(MAX_DURATION_MINUTES, &mut store).unwrap();
        assert_eq!(p.remaining_seconds(), 86_400);

        store.set(KEY_POMO_DURATION, "99999999").unwrap();
        assert_eq!(Pomodoro::load(&store).unwrap().duration_minutes(), 25);
        assert_eq!(Pomodoro::new(u32::MAX).duration_minutes(), MAX_DURATION_MINUTES);
    }
}
