use anyhow::{Context, Result};
use classboard_core::KeyValueStore;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// `$CLASSBOARD_HOME`, or `~/.classboard`.
pub fn classboard_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("CLASSBOARD_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".classboard"))
}

pub fn ensure_classboard_home() -> Result<PathBuf> {
    let dir = classboard_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn storage_path() -> Result<PathBuf> {
    Ok(ensure_classboard_home()?.join("storage.json"))
}

/// String key-value store persisted as one JSON object.
///
/// Every write rewrites the whole file; the data set is a handful of keys.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    pub fn open_default() -> Result<Self> {
        Self::open(storage_path()?)
    }

    /// Missing file reads as empty; a corrupt file is logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let s = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
            match serde_json::from_str(&s) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "storage file is corrupt, starting empty");
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, json).with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        tracing::debug!(key, "storage set");
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            tracing::debug!(key, "storage remove");
            self.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let mut store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("userClass").unwrap(), None);
        store.set("userClass", "22HR").unwrap();
        store.set("pomoDuration", "30").unwrap();
        store.remove("pomoDuration").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("userClass").unwrap().as_deref(), Some("22HR"));
        assert_eq!(reopened.get("pomoDuration").unwrap(), None);
    }

    #[test]
    fn corrupt_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "not json").unwrap();
        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("todos").unwrap(), None);
    }
}
