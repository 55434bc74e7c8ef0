//! [`DurableStorage`] implementations.
//!
//! - [`FileStorage`]: JSON file of named entries, survives restarts
//! - [`MemoryStorage`]: process-local map, shared between client instances
//! - [`NoopStorage`]: the capability is absent in this context

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::StorageError;
use crate::traits::DurableStorage;

/// Named entries persisted as a flat JSON object.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// target, so a crash mid-write never leaves a truncated store behind.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    /// Create a store backed by `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(StorageError::ReadFailed {
                    path: self.display_path(),
                    message: e.to_string(),
                })
            }
        };

        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
            path: self.display_path(),
            message: e.to_string(),
        })
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let write_err = |message: String| StorageError::WriteFailed {
            path: self.display_path(),
            message,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(entries).map_err(|e| write_err(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).map_err(|e| write_err(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| write_err(e.to_string()))
    }
}

impl DurableStorage for FileStorage {
    fn load(&self, entry: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock();
        Ok(self.read_entries()?.remove(entry))
    }

    fn store(&self, entry: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(StorageError::Corrupt { path, message }) => {
                tracing::warn!(path = %path, error = %message, "Replacing corrupt credential store");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        entries.insert(entry.to_string(), value.to_string());
        self.write_entries(&entries)
    }
}

/// In-process storage. Share one instance (behind an `Arc`) between clients
/// to model a store that outlives a single client.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DurableStorage for MemoryStorage {
    fn load(&self, entry: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(entry).cloned())
    }

    fn store(&self, entry: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .insert(entry.to_string(), value.to_string());
        Ok(())
    }
}

/// Storage for contexts without a durable store: reads find nothing and
/// writes are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStorage;

impl DurableStorage for NoopStorage {
    fn load(&self, _entry: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn store(&self, _entry: &str, _value: &str) -> Result<(), StorageError> {
        Ok(())
    }

    fn is_persistent(&self) -> bool {
        false
    }
}
