use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use classboard_core::storage::KEY_USER_CLASS;
use classboard_core::{KeyValueStore, TodoList, build_snapshot, selected_class};
use classboard_feed::{FeedSource, load_feed_or_default};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod calendar;
mod config;
mod dashboard;
mod pomodoro_cmd;
mod render;
mod state;
mod todo_cmd;

use calendar::CalendarCommand;
use config::{Config, load_config};
use pomodoro_cmd::PomodoroCommand;
use state::FileStore;
use todo_cmd::TodoCommand;

#[derive(Parser, Debug)]
#[command(
    name = "classboard",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("CLASSBOARD_BUILD_SHA"), ")"),
    about = "Student dashboard: timetable, next class, test countdown, todos and a focus timer"
)]
struct Cli {
    /// Feed path or URL (overrides config.toml [feed].source)
    #[arg(long, global = true)]
    feed: Option<String>,

    /// Class to show (overrides the saved class for this run)
    #[arg(long, global = true)]
    class: Option<String>,

    /// Debug logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print today's timetable, next class, next test and todos once
    Status,

    /// Full-screen live dashboard
    Dashboard,

    /// Show or choose the class whose timetable is displayed
    Class {
        #[command(subcommand)]
        command: ClassCommand,
    },

    /// Todo list
    Todo {
        #[command(subcommand)]
        command: TodoCommand,
    },

    /// Pomodoro focus timer
    Pomodoro {
        #[command(subcommand)]
        command: PomodoroCommand,
    },

    /// Calendar link and timetable export
    Calendar {
        #[command(subcommand)]
        command: CalendarCommand,
    },

    /// Config file management
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ClassCommand {
    /// Print the selected class and the classes present in the feed
    Show,

    /// Save the class to display
    Set { class: String },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default ~/.classboard/config.toml if none exists
    Init,

    /// Print the effective configuration
    Show,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = load_config()?;
    let tz = cfg.timezone()?;
    let source = resolve_source(&cli, &cfg)?;
    let mut store = FileStore::open_default()?;
    tracing::debug!(storage = %store.path().display(), %source, "starting");

    let class = match &cli.class {
        Some(c) => c.trim().to_string(),
        None => selected_class(&store, &cfg.display.default_class)?,
    };

    match cli.command.unwrap_or(Command::Status) {
        Command::Status => {
            let feed = load_feed_or_default(&source).await;
            let snap = build_snapshot(&feed, &class, Utc::now(), tz);
            let todos = TodoList::load(&store)?;
            render::print_status(&snap, &todos);
        }

        Command::Dashboard => {
            let refresh = Duration::from_secs(cfg.display.refresh_seconds.max(5));
            dashboard::run_dashboard(&mut store, class, tz, source, refresh).await?;
        }

        Command::Class { command } => match command {
            ClassCommand::Show => {
                println!("Selected class: {class}");
                let feed = load_feed_or_default(&source).await;
                let names = feed.class_names();
                if names.is_empty() {
                    println!("(feed lists no classes)");
                } else {
                    println!("Classes in feed: {}", names.join(", "));
                }
            }
            ClassCommand::Set { class } => set_class(&mut store, &class)?,
        },

        Command::Todo { command } => todo_cmd::run(command, &mut store)?,

        Command::Pomodoro { command } => pomodoro_cmd::run(command, &mut store).await?,

        Command::Calendar { command } => {
            let feed = match command {
                CalendarCommand::ExportIcs { .. } => Some(load_feed_or_default(&source).await),
                _ => None,
            };
            calendar::run(command, &mut store, feed.as_ref(), &class, tz)?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn resolve_source(cli: &Cli, cfg: &Config) -> Result<FeedSource> {
    match &cli.feed {
        Some(s) => s.parse(),
        None => cfg.feed_source(),
    }
}

fn set_class(store: &mut dyn KeyValueStore, class: &str) -> Result<()> {
    let class = class.trim();
    anyhow::ensure!(!class.is_empty(), "class name must not be empty");
    store.set(KEY_USER_CLASS, class)?;
    println!("Class set to {class}");
    Ok(())
}
