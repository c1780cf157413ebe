use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::Context;
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::{debug, warn};

/// Synchronous string key/value storage that outlives the process.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String) -> anyhow::Result<()>;
    fn remove(&self, key: &str) -> anyhow::Result<()>;
}

fn lock(entries: &Mutex<HashMap<String, String>>) -> MutexGuard<'_, HashMap<String, String>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> anyhow::Result<()> {
        lock(&self.entries).insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        lock(&self.entries).remove(key);
        Ok(())
    }
}

/// Keeps every entry in one flat JSON object on disk, rewritten on each change.
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(data) => match serde_json::from_str::<HashMap<String, String>>(&data) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Ignoring corrupt cache file {} due to: {}", path.display(), e);
                    HashMap::new()
                }
            },
            Err(e) => {
                debug!("No cache file at {} ({}), starting empty", path.display(), e);
                HashMap::new()
            }
        };

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    /// Callers may hold the session lock, so on a multi-threaded runtime the
    /// write moves the worker's other tasks elsewhere while it blocks.
    fn persist(&self, entries: &HashMap<String, String>) -> anyhow::Result<()> {
        let data = serde_json::to_string_pretty(entries)?;
        let write = || {
            fs::write(&self.path, data)
                .with_context(|| format!("Failed to write cache file {}", self.path.display()))
        };
        match Handle::try_current().map(|handle| handle.runtime_flavor()) {
            Ok(RuntimeFlavor::MultiThread) => tokio::task::block_in_place(write),
            _ => write(),
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> anyhow::Result<()> {
        let mut entries = lock(&self.entries);
        let previous = entries.insert(key.to_string(), value);
        if let Err(e) = self.persist(&entries) {
            match previous {
                Some(previous) => entries.insert(key.to_string(), previous),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        let mut entries = lock(&self.entries);
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.persist(&entries)
    }
}
