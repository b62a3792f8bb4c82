//! Session-scoped key/value storage.
//!
//! Mirrors the browser's `sessionStorage` surface. `FileStorage` keeps the
//! session in a JSON file so a value written before a full navigation (a new
//! webview document, or a restarted process) is readable afterwards.

use crate::error::{ConsoleError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

pub trait SessionStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    fn remove_item(&self, key: &str) -> Result<()>;

    /// Read and remove in one step.
    fn take_item(&self, key: &str) -> Result<Option<String>> {
        let value = self.get_item(key)?;
        if value.is_some() {
            self.remove_item(key)?;
        }
        Ok(value)
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.read().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items.write().remove(key);
        Ok(())
    }

    fn take_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.write().remove(key))
    }
}

/// Session storage persisted as a flat JSON object on disk.
pub struct FileStorage {
    path: PathBuf,
    /// Serializes read-modify-write cycles on the file
    lock: RwLock<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self {
            path,
            lock: RwLock::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// End the session: forget every key.
    pub fn clear(&self) -> Result<()> {
        let _guard = self.lock.write();
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    fn load(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(&raw).map_err(|e| {
            ConsoleError::Storage(format!("{} is not a session file: {}", self.path.display(), e))
        })
    }

    /// Load, or replace a damaged file with an empty session.
    fn load_or_reset(&self) -> Result<HashMap<String, String>> {
        match self.load() {
            Ok(items) => Ok(items),
            Err(ConsoleError::Storage(e)) => {
                tracing::warn!("Resetting session storage: {}", e);
                let items = HashMap::new();
                self.store(&items)?;
                Ok(items)
            }
            Err(e) => Err(e),
        }
    }

    /// Write to a sibling temp file, then rename it over the session file.
    fn store(&self, items: &HashMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(items)?;
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(json.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| ConsoleError::Io(e.error))?;
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.read();
        Ok(self.load()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.write();
        let mut items = self.load_or_reset()?;
        items.insert(key.to_string(), value.to_string());
        self.store(&items)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let _guard = self.lock.write();
        let mut items = self.load_or_reset()?;
        if items.remove(key).is_some() {
            self.store(&items)?;
        }
        Ok(())
    }

    /// A damaged file is reset to an empty session and the read reports
    /// `Ok(None)`: whatever the slot held is unrecoverable.
    fn take_item(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.write();
        let mut items = self.load_or_reset()?;
        let value = items.remove(key);
        if value.is_some() {
            self.store(&items)?;
        }
        Ok(value)
    }
}
