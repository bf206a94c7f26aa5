use anyhow::Result;
use chrono::Utc;
use chrono_tz::Tz;
use classboard_core::{
    Feed, KeyValueStore, Pomodoro, TickOutcome, TodoAction, TodoList, build_snapshot,
};
use classboard_feed::{FeedSource, load_feed_or_default};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Gauge, Paragraph},
};
use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};
use tokio::sync::watch;

use crate::render::{
    clock_date, clock_time, next_class_text, period_line, test_text, todo_line,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Normal,
    AddingTodo,
}

pub struct DashboardApp<'a> {
    store: &'a mut dyn KeyValueStore,
    class: String,
    tz: Tz,
    feed: Feed,
    todos: TodoList,
    pomodoro: Pomodoro,
    selected: usize,
    mode: InputMode,
    input: String,
    notice: Option<String>,
}

impl<'a> DashboardApp<'a> {
    pub fn new(store: &'a mut dyn KeyValueStore, class: String, tz: Tz, feed: Feed) -> Result<Self> {
        let todos = TodoList::load(store)?;
        let pomodoro = Pomodoro::load(store)?;
        Ok(Self {
            store,
            class,
            tz,
            feed,
            todos,
            pomodoro,
            selected: 0,
            mode: InputMode::Normal,
            input: String::new(),
            notice: None,
        })
    }

    pub fn replace_feed(&mut self, feed: Feed) {
        self.feed = feed;
    }

    /// Advance the pomodoro by one second.
    pub fn on_second(&mut self) {
        if self.pomodoro.tick() == TickOutcome::Completed {
            tracing::info!("focus session completed");
            self.notice = Some("Focus time is over!".to_string());
        }
    }

    fn apply_todo(&mut self, action: TodoAction) -> Result<()> {
        if self.todos.apply(action)? {
            self.todos.save(self.store)?;
        }
        self.selected = self.selected.min(self.todos.len().saturating_sub(1));
        Ok(())
    }

    /// Handle one key press. Returns `true` when the dashboard should exit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        if self.mode == InputMode::AddingTodo {
            match code {
                KeyCode::Enter => {
                    let text = std::mem::take(&mut self.input);
                    self.apply_todo(TodoAction::Add(text))?;
                    self.selected = self.todos.len().saturating_sub(1);
                    self.mode = InputMode::Normal;
                }
                KeyCode::Esc => {
                    self.input.clear();
                    self.mode = InputMode::Normal;
                }
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Char(c) => self.input.push(c),
                _ => {}
            }
            return Ok(false);
        }

        self.notice = None;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Char(' ') => {
                self.pomodoro.toggle();
            }
            KeyCode::Char('r') => self.pomodoro.reset(),
            KeyCode::Char('a') => self.mode = InputMode::AddingTodo,
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.todos.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char('x') if !self.todos.is_empty() => {
                self.apply_todo(TodoAction::Toggle(self.selected))?;
            }
            KeyCode::Delete | KeyCode::Char('d') if !self.todos.is_empty() => {
                self.apply_todo(TodoAction::Remove(self.selected))?;
            }
            KeyCode::Char('c') => self.apply_todo(TodoAction::ClearDone)?,
            _ => {}
        }
        Ok(false)
    }

    fn draw(&self, f: &mut Frame) {
        let snap = build_snapshot(&self.feed, &self.class, Utc::now(), self.tz);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(8),
                Constraint::Length(10),
                Constraint::Length(1),
            ])
            .split(f.area());

        let header = Paragraph::new(Text::from(vec![
            Line::from(Span::styled(
                clock_time(&snap.local_now),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
            Line::from(format!("{}   class {}", clock_date(&snap.local_now), snap.class)),
        ]))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("classboard"));
        f.render_widget(header, rows[0]);

        let middle = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(rows[1]);

        let timetable: Vec<Line> = if snap.schedule.entries().is_empty() {
            vec![Line::styled("No classes today", Style::default().fg(Color::Gray))]
        } else {
            snap.schedule
                .entries()
                .iter()
                .map(|e| {
                    if e.is_current {
                        Line::styled(period_line(e), Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
                    } else {
                        Line::raw(period_line(e))
                    }
                })
                .collect()
        };
        f.render_widget(
            Paragraph::new(timetable).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("timetable ({})", snap.local_now.format("%A"))),
            ),
            middle[0],
        );

        let cards = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Length(4), Constraint::Min(4)])
            .split(middle[1]);

        let (subject, detail) = next_class_text(&snap.next_class);
        render_card(f, cards[0], "next class", &subject, &detail);
        let (name, detail) = test_text(snap.next_test.as_ref());
        render_card(f, cards[1], "next test", &name, &detail);

        let pomo_detail = match &self.notice {
            Some(n) => n.clone(),
            None => format!("[space] {}   [r] reset", self.pomodoro.button_label()),
        };
        render_card(f, cards[2], "focus", &self.pomodoro.display(), &pomo_detail);

        self.draw_todos(f, rows[2]);

        let help = match self.mode {
            InputMode::Normal => "q quit  space start/pause  r reset  a add  j/k move  x toggle  d delete  c clear done",
            InputMode::AddingTodo => "Enter save  Esc cancel",
        };
        f.render_widget(
            Paragraph::new(Span::styled(help, Style::default().fg(Color::Gray))),
            rows[3],
        );
    }

    fn draw_todos(&self, f: &mut Frame, area: Rect) {
        let progress = self.todos.progress();
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3)])
            .split(area);

        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("todo"))
            .gauge_style(Style::default().fg(Color::Cyan))
            .percent(progress.percent.min(100) as u16)
            .label(progress.to_string());
        f.render_widget(gauge, parts[0]);

        let mut lines: Vec<Line> = self
            .todos
            .items()
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let mut style = Style::default();
                if t.done {
                    style = style.fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT);
                }
                if i == self.selected && self.mode == InputMode::Normal {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                Line::styled(todo_line(i, t.done, &t.text), style)
            })
            .collect();
        if self.mode == InputMode::AddingTodo {
            lines.push(Line::from(vec![
                Span::styled("new: ", Style::default().fg(Color::Cyan)),
                Span::raw(self.input.clone()),
            ]));
        }

        f.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::LEFT | Borders::RIGHT | Borders::BOTTOM)),
            parts[1],
        );
    }
}

fn render_card(f: &mut Frame, area: Rect, title: &str, headline: &str, detail: &str) {
    let body = Paragraph::new(Text::from(vec![
        Line::from(Span::styled(
            headline.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(detail.to_string(), Style::default().fg(Color::Gray))),
    ]))
    .block(Block::default().borders(Borders::ALL).title(title.to_string()));
    f.render_widget(body, area);
}

/// Run the full-screen dashboard until the user quits.
///
/// The feed is re-read in the background every `refresh` and swapped in between frames.
pub async fn run_dashboard(
    store: &mut dyn KeyValueStore,
    class: String,
    tz: Tz,
    source: FeedSource,
    refresh: Duration,
) -> Result<()> {
    let initial = load_feed_or_default(&source).await;
    let (tx, mut rx) = watch::channel(initial.clone());

    let refresher = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(refresh);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let feed = load_feed_or_default(&source).await;
            if tx.send(feed).is_err() {
                break;
            }
        }
    });

    let mut app = DashboardApp::new(store, class, tz, initial)?;

    let res = run_terminal(&mut app, &mut rx);
    refresher.abort();

    res
}

fn run_terminal(app: &mut DashboardApp<'_>, rx: &mut watch::Receiver<Feed>) -> Result<()> {
    let guard = TerminalGuard::enter(io::stdout())?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let res = tokio::task::block_in_place(|| ui_loop(&mut terminal, app, rx));

    drop(guard);
    terminal.show_cursor()?;
    res
}

/// Raw mode plus alternate screen, undone on drop even when setup fails halfway.
struct TerminalGuard<W: Write> {
    out: W,
    alternate: bool,
}

impl<W: Write> TerminalGuard<W> {
    fn enter(out: W) -> Result<Self> {
        enable_raw_mode()?;
        let mut guard = Self {
            out,
            alternate: false,
        };
        execute!(guard.out, EnterAlternateScreen)?;
        guard.alternate = true;
        Ok(guard)
    }
}

impl<W: Write> Drop for TerminalGuard<W> {
    fn drop(&mut self) {
        if self.alternate {
            let _ = execute!(self.out, LeaveAlternateScreen);
        }
        let _ = disable_raw_mode();
    }
}

fn ui_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut DashboardApp<'_>,
    rx: &mut watch::Receiver<Feed>,
) -> Result<()> {
    let mut last_second = Instant::now();

    loop {
        if rx.has_changed().unwrap_or(false) {
            app.replace_feed(rx.borrow_and_update().clone());
            tracing::debug!("dashboard feed refreshed");
        }

        while last_second.elapsed() >= Duration::from_secs(1) {
            app.on_second();
            last_second += Duration::from_secs(1);
        }

        terminal.draw(|f| app.draw(f))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if app.handle_key(key.code)? {
                    break;
                }
            }
        }
    }

    Ok(())
}
