use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use qcos_core::QcosError;

/// A string-to-string persistence store.
///
/// Writes are last-write-wins with no transactional guarantees. Values are
/// opaque text; callers that keep structured data serialize it to JSON.
pub trait KeyValueTextStore {
    /// Look up `key`, returning `None` when it was never set.
    fn get(&self, key: &str) -> Result<Option<String>, QcosError>;

    /// Insert or replace the value stored under `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<(), QcosError>;

    /// Delete `key`, returning whether it was present.
    fn remove(&mut self, key: &str) -> Result<bool, QcosError>;

    /// All keys currently stored, in sorted order.
    fn keys(&self) -> Result<Vec<String>, QcosError>;
}

impl<T: KeyValueTextStore + ?Sized> KeyValueTextStore for &mut T {
    fn get(&self, key: &str) -> Result<Option<String>, QcosError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), QcosError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<bool, QcosError> {
        (**self).remove(key)
    }

    fn keys(&self) -> Result<Vec<String>, QcosError> {
        (**self).keys()
    }
}

/// In-process store backed by a `HashMap`. Nothing survives the process.
///
/// # Examples
///
/// ```
/// use qcos_agent::store::{KeyValueTextStore, MemoryStore};
///
/// let mut store = MemoryStore::default();
/// store.set("greeting", "hello").unwrap();
/// assert_eq!(store.get("greeting").unwrap().as_deref(), Some("hello"));
/// assert_eq!(store.get("missing").unwrap(), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl KeyValueTextStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, QcosError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), QcosError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, QcosError> {
        Ok(self.entries.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>, QcosError> {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

/// Store persisted as one JSON object in a file.
///
/// The file is read once when opened. Every mutation rewrites the whole
/// file, creating its parent directory if needed.
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`QcosError::Store`] if the file exists but cannot be read
    /// or does not contain a JSON object of strings.
    pub fn open(path: &Path) -> Result<Self, QcosError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "store file missing, starting empty");
            return Ok(Self {
                path: path.to_path_buf(),
                entries: BTreeMap::new(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            QcosError::Store(format!("failed to read store from {}: {e}", path.display()))
        })?;
        let entries = if content.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_json::from_str(&content).map_err(|e| {
                QcosError::Store(format!("failed to parse store {}: {e}", path.display()))
            })?
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), QcosError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|e| {
                    QcosError::Store(format!("failed to create {}: {e}", dir.display()))
                })?;
            }
        }

        let content = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, content).map_err(|e| {
            QcosError::Store(format!(
                "failed to write store to {}: {e}",
                self.path.display()
            ))
        })?;
        tracing::debug!(path = %self.path.display(), keys = self.entries.len(), "store flushed");
        Ok(())
    }
}

impl KeyValueTextStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, QcosError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), QcosError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<bool, QcosError> {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.flush()?;
        }
        Ok(removed)
    }

    fn keys(&self) -> Result<Vec<String>, QcosError> {
        Ok(self.entries.keys().cloned().collect())
    }
}
