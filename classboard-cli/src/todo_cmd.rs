use anyhow::Result;
use clap::Subcommand;
use classboard_core::{KeyValueStore, TodoAction, TodoList, apply_persisted};

use crate::render::{progress_bar, todo_lines};

#[derive(Subcommand, Debug)]
pub enum TodoCommand {
    /// Show the list with completion progress
    List,

    /// Append a new item
    Add {
        /// Item text (words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Flip an item between done and not done
    Toggle { index: usize },

    /// Delete an item; later items move up
    Remove { index: usize },

    /// Delete every completed item
    ClearDone,
}

pub fn run(cmd: TodoCommand, store: &mut dyn KeyValueStore) -> Result<()> {
    let action = match cmd {
        TodoCommand::List => {
            print_list(&TodoList::load(store)?);
            return Ok(());
        }
        TodoCommand::Add { text } => TodoAction::Add(text.join(" ")),
        TodoCommand::Toggle { index } => TodoAction::Toggle(index),
        TodoCommand::Remove { index } => TodoAction::Remove(index),
        TodoCommand::ClearDone => TodoAction::ClearDone,
    };

    tracing::debug!(?action, "applying todo action");
    let list = apply_persisted(store, action)?;
    print_list(&list);
    Ok(())
}

fn print_list(list: &TodoList) {
    let progress = list.progress();
    println!("{}  {}", progress, progress_bar(progress.percent, 20));
    if list.is_empty() {
        println!("(no todos; add one with: classboard todo add <text>)");
        return;
    }
    for line in todo_lines(list) {
        println!("{line}");
    }
}
