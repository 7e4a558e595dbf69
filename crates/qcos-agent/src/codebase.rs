use std::collections::BTreeMap;
use std::path::Path;

use qcos_core::QcosError;

use crate::store::KeyValueTextStore;

/// Store key holding the codebase as a JSON object of path to content.
pub const CODEBASE_KEY: &str = "qcos_metaprogramming_codebase";

/// Files larger than this are skipped by [`Codebase::import_dir`] (1 MB).
const MAX_IMPORT_SIZE: u64 = 1_048_576;

const STARTER_INDEX_TSX: &str = "\
import React from 'react';
import ReactDOM from 'react-dom/client';
import App from './App';

const rootElement = document.getElementById('root');
if (!rootElement) {
  throw new Error(\"Could not find root element to mount to\");
}

const root = ReactDOM.createRoot(rootElement);
root.render(
  <React.StrictMode>
    <App />
  </React.StrictMode>
);";

/// Files present in a fresh codebase before anything is saved.
pub fn starter_files() -> BTreeMap<String, String> {
    BTreeMap::from([("index.tsx".to_string(), STARTER_INDEX_TSX.to_string())])
}

/// The editable set of source files, keyed by `/`-separated relative path.
///
/// Every mutation writes the whole map back to the store.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use qcos_agent::codebase::Codebase;
/// use qcos_agent::store::MemoryStore;
///
/// let defaults = BTreeMap::from([("App.tsx".to_string(), "<App/>".to_string())]);
/// let mut codebase = Codebase::load(MemoryStore::default(), defaults).unwrap();
/// codebase.write_file("index.tsx", "render(<App/>)").unwrap();
/// assert_eq!(codebase.paths().collect::<Vec<_>>(), vec!["App.tsx", "index.tsx"]);
/// ```
pub struct Codebase<S: KeyValueTextStore> {
    store: S,
    files: BTreeMap<String, String>,
}

impl<S: KeyValueTextStore> Codebase<S> {
    /// Load the codebase: `defaults` overlaid with whatever was saved.
    ///
    /// Saved entries win over defaults. A saved value that is not a valid
    /// JSON object is ignored with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store itself fails.
    pub fn load(store: S, defaults: BTreeMap<String, String>) -> Result<Self, QcosError> {
        let mut files = defaults;
        if let Some(saved) = store.get(CODEBASE_KEY)? {
            match serde_json::from_str::<BTreeMap<String, String>>(&saved) {
                Ok(saved) => files.extend(saved),
                Err(e) => tracing::warn!("ignoring unreadable saved codebase: {e}"),
            }
        }
        tracing::debug!(files = files.len(), "codebase loaded");
        Ok(Self { store, files })
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Insert or replace `path` and persist.
    pub fn write_file(&mut self, path: &str, content: &str) -> Result<(), QcosError> {
        self.files.insert(path.to_string(), content.to_string());
        self.persist()
    }

    /// Remove `path`, persisting only if it was present.
    pub fn remove_file(&mut self, path: &str) -> Result<bool, QcosError> {
        if self.files.remove(path).is_none() {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Add every UTF-8 text file under `root`, honoring `.gitignore`.
    ///
    /// Files are keyed by their path relative to `root`. Existing entries
    /// with the same path are replaced. Returns the number of files added.
    ///
    /// # Errors
    ///
    /// Returns [`QcosError::FileNotFound`] if `root` does not exist.
    pub fn import_dir(&mut self, root: &Path) -> Result<usize, QcosError> {
        if !root.exists() {
            return Err(QcosError::FileNotFound(root.to_path_buf()));
        }

        let mut imported = 0;
        for entry in ignore::WalkBuilder::new(root).build() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::debug!("skipping unreadable entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            let too_large = std::fs::metadata(path).map_or(true, |m| m.len() > MAX_IMPORT_SIZE);
            if too_large {
                tracing::debug!(path = %path.display(), "skipping large or unreadable file");
                continue;
            }
            let content = match std::fs::read_to_string(path) {
                Ok(c) => c,
                Err(e) => {
                    tracing::debug!(path = %path.display(), "skipping non-text file: {e}");
                    continue;
                }
            };

            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            let key = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            self.files.insert(key, content);
            imported += 1;
        }

        if imported > 0 {
            self.persist()?;
        }
        tracing::info!(root = %root.display(), imported, "imported files into codebase");
        Ok(imported)
    }

    fn persist(&mut self) -> Result<(), QcosError> {
        let json = serde_json::to_string(&self.files)?;
        self.store.set(CODEBASE_KEY, &json)
    }
}
