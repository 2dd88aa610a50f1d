use std::{collections::HashMap, sync::RwLock};

use crate::{Store, StoreError, StoredValue};

/// A process-local [`Store`] backed by a map.
///
/// Nothing is persisted; each instance is its own namespace.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, StoredValue>>,
}

impl MemoryStore {
    /// Creates a new empty `MemoryStore`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, name: &str) -> Result<Option<StoredValue>, StoreError> {
        Ok(self.entries.read()?.get(name).cloned())
    }

    fn set(&self, name: &str, value: StoredValue) -> Result<(), StoreError> {
        self.entries.write()?.insert(name.to_owned(), value);
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<(), StoreError> {
        self.entries.write()?.remove(name);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<String> = self.entries.read()?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn contains(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.entries.read()?.contains_key(name))
    }
}
