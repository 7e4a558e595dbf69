use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use qcos_core::QcosError;
use serde::{Deserialize, Serialize};

use crate::store::KeyValueTextStore;

/// Store key holding the library as `{category: [SavedProtocol]}`.
pub const LIBRARY_KEY: &str = "quantumProtocolLibrary";

/// A named Q-Lang snippet kept in the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedProtocol {
    pub name: String,
    pub code: String,
    pub category: String,
    pub saved_at: DateTime<Utc>,
}

impl SavedProtocol {
    /// Create a protocol stamped with the current time.
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            category: category.into(),
            saved_at: Utc::now(),
        }
    }
}

/// Saved protocols grouped by category, persisted through a
/// [`KeyValueTextStore`].
///
/// Names are unique within a category. Categories exist only while they hold
/// at least one protocol.
pub struct ProtocolLibrary<S: KeyValueTextStore> {
    store: S,
    categories: BTreeMap<String, Vec<SavedProtocol>>,
}

impl<S: KeyValueTextStore> ProtocolLibrary<S> {
    /// Load the library from `store`. A corrupt saved value is ignored with a
    /// warning and the library starts empty.
    pub fn load(store: S) -> Result<Self, QcosError> {
        let categories = match store.get(LIBRARY_KEY)? {
            Some(saved) => serde_json::from_str(&saved).unwrap_or_else(|e| {
                tracing::warn!("ignoring unreadable protocol library: {e}");
                BTreeMap::new()
            }),
            None => BTreeMap::new(),
        };
        Ok(Self { store, categories })
    }

    /// Add `protocol` to its category.
    ///
    /// Returns `false` and changes nothing if the category already holds a
    /// protocol with the same name.
    pub fn save(&mut self, protocol: SavedProtocol) -> Result<bool, QcosError> {
        let entries = self.categories.entry(protocol.category.clone()).or_default();
        if entries.iter().any(|p| p.name == protocol.name) {
            return Ok(false);
        }

        tracing::info!(name = %protocol.name, category = %protocol.category, "saving protocol");
        entries.push(protocol);
        self.persist()?;
        Ok(true)
    }

    pub fn find(&self, category: &str, name: &str) -> Option<&SavedProtocol> {
        self.categories
            .get(category)?
            .iter()
            .find(|p| p.name == name)
    }

    /// Remove a protocol, dropping its category once empty.
    pub fn remove(&mut self, category: &str, name: &str) -> Result<bool, QcosError> {
        let Some(entries) = self.categories.get_mut(category) else {
            return Ok(false);
        };
        let before = entries.len();
        entries.retain(|p| p.name != name);
        if entries.len() == before {
            return Ok(false);
        }
        if entries.is_empty() {
            self.categories.remove(category);
        }
        self.persist()?;
        Ok(true)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Every protocol, ordered by category then insertion.
    pub fn iter(&self) -> impl Iterator<Item = &SavedProtocol> {
        self.categories.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    fn persist(&mut self) -> Result<(), QcosError> {
        let json = serde_json::to_string(&self.categories)?;
        self.store.set(LIBRARY_KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn bell_pair() -> SavedProtocol {
        SavedProtocol::new("Bell Pair", "Entanglement", "H q0\nCNOT q0 q1")
    }

    fn bell_pair_at(saved_at: DateTime<Utc>) -> SavedProtocol {
        SavedProtocol {
            saved_at,
            ..bell_pair()
        }
    }

    #[test]
    fn save_then_find() {
        let mut library = ProtocolLibrary::load(MemoryStore::default()).unwrap();
        assert!(library.save(bell_pair()).unwrap());

        let found = library.find("Entanglement", "Bell Pair").unwrap();
        assert_eq!(found.code, "H q0\nCNOT q0 q1");
        assert_eq!(library.categories().collect::<Vec<_>>(), vec!["Entanglement"]);
    }

    #[test]
    fn duplicate_name_in_category_is_rejected() {
        let mut library = ProtocolLibrary::load(MemoryStore::default()).unwrap();
        assert!(library.save(bell_pair()).unwrap());

        let mut dup = bell_pair();
        dup.code = "X q0".into();
        assert!(!library.save(dup).unwrap());
        assert_eq!(library.len(), 1);
        assert_eq!(library.find("Entanglement", "Bell Pair").unwrap().code, "H q0\nCNOT q0 q1");
    }

    #[test]
    fn same_name_in_other_category_is_allowed() {
        let mut library = ProtocolLibrary::load(MemoryStore::default()).unwrap();
        library.save(bell_pair()).unwrap();
        assert!(library
            .save(SavedProtocol::new("Bell Pair", "Teleportation", "H q1"))
            .unwrap());
        assert_eq!(library.len(), 2);
    }

    #[test]
    fn remove_drops_empty_category() {
        let mut library = ProtocolLibrary::load(MemoryStore::default()).unwrap();
        library.save(bell_pair()).unwrap();

        assert!(library.remove("Entanglement", "Bell Pair").unwrap());
        assert!(!library.remove("Entanglement", "Bell Pair").unwrap());
        assert!(library.is_empty());
        assert_eq!(library.categories().count(), 0);
    }

    #[test]
    fn persists_through_store() {
        let mut store = MemoryStore::default();
        {
            let mut library = ProtocolLibrary::load(&mut store).unwrap();
            library.save(bell_pair()).unwrap();
        }

        let saved = store.get(LIBRARY_KEY).unwrap().unwrap();
        assert!(saved.contains("\"savedAt\""));

        let reloaded = ProtocolLibrary::load(store).unwrap();
        assert_eq!(reloaded.iter().count(), 1);
        let found = reloaded.find("Entanglement", "Bell Pair").unwrap();
        assert_eq!(found, &bell_pair_at(found.saved_at));
    }

    #[test]
    fn corrupt_value_loads_empty() {
        let mut store = MemoryStore::default();
        store.set(LIBRARY_KEY, "[1, 2").unwrap();
        let library = ProtocolLibrary::load(store).unwrap();
        assert!(library.is_empty());
    }
}
