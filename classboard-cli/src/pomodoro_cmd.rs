use anyhow::Result;
use clap::Subcommand;
use classboard_core::{KeyValueStore, Pomodoro, TickOutcome};
use std::io::{self, Write};
use std::time::Duration;

#[derive(Subcommand, Debug)]
pub enum PomodoroCommand {
    /// Show the configured focus length
    Show,

    /// Change the focus length in minutes (must be > 0)
    SetDuration { minutes: u32 },

    /// Run one focus session in the terminal (Ctrl-C to stop)
    Run,
}

pub async fn run(cmd: PomodoroCommand, store: &mut dyn KeyValueStore) -> Result<()> {
    match cmd {
        PomodoroCommand::Show => {
            let p = Pomodoro::load(store)?;
            println!("Focus length: {} min ({})", p.duration_minutes(), p.display());
        }
        PomodoroCommand::SetDuration { minutes } => {
            let mut p = Pomodoro::load(store)?;
            p.set_duration(minutes, store)?;
            println!("Focus length set to {} min", p.duration_minutes());
        }
        PomodoroCommand::Run => run_session(Pomodoro::load(store)?).await?,
    }
    Ok(())
}

async fn run_session(mut pomo: Pomodoro) -> Result<()> {
    pomo.toggle();
    tracing::info!(minutes = pomo.duration_minutes(), "focus session started");

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    // First tick of a tokio interval fires immediately.
    ticker.tick().await;
    print_remaining(&pomo)?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match pomo.tick() {
                    TickOutcome::Completed => {
                        println!("\r\x07Focus time is over!   ");
                        tracing::info!("focus session completed");
                        return Ok(());
                    }
                    TickOutcome::Ticked | TickOutcome::Idle => print_remaining(&pomo)?,
                }
            }
            _ = &mut ctrl_c => {
                println!("\nStopped with {} left", pomo.display());
                tracing::info!(remaining = pomo.remaining_seconds(), "focus session stopped");
                return Ok(());
            }
        }
    }
}

fn print_remaining(pomo: &Pomodoro) -> Result<()> {
    let mut out = io::stdout();
    write!(out, "\r{}", pomo.display())?;
    out.flush()?;
    Ok(())
}
