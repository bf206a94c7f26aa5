//! Todo list reducer with key-value persistence.

use std::fmt;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::storage::{KEY_TODOS, KeyValueStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoAction {
    Add(String),
    Toggle(usize),
    Remove(usize),
    ClearDone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
    /// 0-100, rounded.
    pub percent: u32,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} done", self.done, self.total)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoList {
    items: Vec<TodoItem>,
}

impl TodoList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<TodoItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Apply one action. Returns whether the list changed.
    ///
    /// Blank additions are ignored; toggling or removing a missing index is an error.
    pub fn apply(&mut self, action: TodoAction) -> Result<bool> {
        match action {
            TodoAction::Add(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Ok(false);
                }
                self.items.push(TodoItem {
                    text: text.to_string(),
                    done: false,
                });
            }
            TodoAction::Toggle(i) => {
                let len = self.items.len();
                let Some(item) = self.items.get_mut(i) else {
                    bail!("no todo at index {i} (list has {len})");
                };
                item.done = !item.done;
            }
            TodoAction::Remove(i) => {
                if i >= self.items.len() {
                    bail!("no todo at index {i} (list has {})", self.items.len());
                }
                self.items.remove(i);
            }
            TodoAction::ClearDone => {
                let before = self.items.len();
                self.items.retain(|t| !t.done);
                return Ok(self.items.len() != before);
            }
        }
        Ok(true)
    }

    pub fn progress(&self) -> Progress {
        let total = self.items.len();
        let done = self.items.iter().filter(|t| t.done).count();
        let percent = if total == 0 {
            0
        } else {
            (done as f64 / total as f64 * 100.0).round() as u32
        };
        Progress {
            done,
            total,
            percent,
        }
    }

    /// Parse a stored list; anything malformed reads as empty.
    pub fn from_json(raw: &str) -> Self {
        match serde_json::from_str::<Vec<TodoItem>>(raw) {
            Ok(items) => Self { items },
            Err(e) => {
                tracing::warn!(error = %e, "stored todos are malformed, starting empty");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.items).context("serialize todos")
    }

    pub fn load(store: &dyn KeyValueStore) -> Result<Self> {
        Ok(store
            .get(KEY_TODOS)?
            .map(|raw| Self::from_json(&raw))
            .unwrap_or_default())
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        store.set(KEY_TODOS, &self.to_json()?)
    }
}

/// Load, apply one action and persist if it changed anything.
pub fn apply_persisted(store: &mut dyn KeyValueStore, action: TodoAction) -> Result<TodoList> {
    let mut list = TodoList::load(store)?;
    if list.apply(action)? {
        list.save(store)?;
    }
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn list(items: &[(&str, bool)]) -> TodoList {
        TodoList::from_items(
            items
                .iter()
                .map(|(text, done)| TodoItem {
                    text: text.to_string(),
                    done: *done,
                })
                .collect(),
        )
    }

    #[test]
    fn add_appends_undone_and_ignores_blank() {
        let mut l = TodoList::new();
        assert!(l.apply(TodoAction::Add("Read ch.3".into())).unwrap());
        assert!(!l.apply(TodoAction::Add("   ".into())).unwrap());
        assert!(!l.apply(TodoAction::Add(String::new())).unwrap());
        assert_eq!(l.items(), &[TodoItem { text: "Read ch.3".into(), done: false }]);
    }

    #[test]
    fn toggle_flips_and_rejects_out_of_range() {
        let mut l = list(&[("a", false)]);
        l.apply(TodoAction::Toggle(0)).unwrap();
        assert!(l.items()[0].done);
        l.apply(TodoAction::Toggle(0)).unwrap();
        assert!(!l.items()[0].done);
        assert!(l.apply(TodoAction::Toggle(1)).is_err());
    }

    #[test]
    fn remove_shifts_later_items() {
        let mut l = list(&[("a", false), ("b", true), ("c", false)]);
        l.apply(TodoAction::Remove(1)).unwrap();
        let texts: Vec<&str> = l.items().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "c"]);
        assert!(l.apply(TodoAction::Remove(2)).is_err());
    }

    #[test]
    fn clear_done_reports_change() {
        let mut l = list(&[("a", true), ("b", false)]);
        assert!(l.apply(TodoAction::ClearDone).unwrap());
        assert!(!l.apply(TodoAction::ClearDone).unwrap());
        assert_eq!(l.len(), 1);
    }

    #[test]
    fn progress_rounds_percent() {
        assert_eq!(TodoList::new().progress(), Progress { done: 0, total: 0, percent: 0 });
        let p = list(&[("a", true), ("b", false), ("c", false)]).progress();
        assert_eq!((p.done, p.total, p.percent), (1, 3, 33));
        let p = list(&[("a", true), ("b", true), ("c", false)]).progress();
        assert_eq!(p.percent, 67);
        assert_eq!(p.to_string(), "2/3 done");
    }

    #[test]
    fn malformed_storage_reads_empty() {
        let mut store = MemoryStore::new();
        store.set(KEY_TODOS, "{not json").unwrap();
        assert!(TodoList::load(&store).unwrap().is_empty());
    }

    #[test]
    fn persisted_cycle() {
        let mut store = MemoryStore::new();
        apply_persisted(&mut store, TodoAction::Add("math hw".into())).unwrap();
        apply_persisted(&mut store, TodoAction::Toggle(0)).unwrap();
        assert_eq!(
            store.get(KEY_TODOS).unwrap().as_deref(),
            Some(r#"[{"text":"math hw","done":true}]"#)
        );
        assert!(apply_persisted(&mut store, TodoAction::Remove(5)).is_err());
    }
}
