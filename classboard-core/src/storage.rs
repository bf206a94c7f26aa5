//! Key-value persistence seam.
//!
//! The dashboard only ever needs string keys mapped to string values; storage
//! backends (a JSON file, memory in tests) live behind this trait.

use std::collections::BTreeMap;

use anyhow::Result;

pub const KEY_USER_CLASS: &str = "userClass";
pub const KEY_TODOS: &str = "todos";
pub const KEY_POMO_DURATION: &str = "pomoDuration";
pub const KEY_CALENDAR_URL: &str = "calEmbedUrl";

/// Class used when none has been chosen yet.
pub const DEFAULT_CLASS: &str = "21HR";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Stored class, or `fallback` when none has been chosen.
pub fn selected_class(store: &dyn KeyValueStore, fallback: &str) -> Result<String> {
    Ok(store
        .get(KEY_USER_CLASS)?
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| fallback.to_string()))
}
