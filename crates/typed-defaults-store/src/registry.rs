use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use thiserror::Error;
use tracing::debug;

use crate::{Store, StoreConfiguration, StoreError};

/// A registry of store handles. One handle is the standard store; any number of named
/// alternatives can be registered next to it. Each handle is an independent namespace.
pub struct StoreRegistry {
    standard: Arc<dyn Store>,
    named: RwLock<HashMap<String, Arc<dyn Store>>>,
}

impl std::fmt::Debug for StoreRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreRegistry").finish()
    }
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum StoreRegistryError {
    #[error("Store {0} is not registered")]
    NotRegistered(String),

    #[error("Store {0} is already registered")]
    AlreadyRegistered(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl StoreRegistry {
    /// Creates a registry around the given standard store.
    pub fn new(standard: Arc<dyn Store>) -> Self {
        StoreRegistry {
            standard,
            named: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a registry whose standard store is opened from `configuration`.
    pub fn open(configuration: StoreConfiguration) -> Result<Self, StoreRegistryError> {
        Ok(Self::new(configuration.open()?))
    }

    /// The standard store.
    pub fn standard(&self) -> Arc<dyn Store> {
        Arc::clone(&self.standard)
    }

    /// Registers a named store. Names are unique; re-registering a name is an error.
    pub fn register(
        &self,
        name: impl Into<String>,
        store: Arc<dyn Store>,
    ) -> Result<(), StoreRegistryError> {
        let name = name.into();
        let mut named = self.named.write().map_err(StoreError::from)?;

        if named.contains_key(&name) {
            return Err(StoreRegistryError::AlreadyRegistered(name));
        }

        debug!("Registered store {name}");
        named.insert(name, store);
        Ok(())
    }

    /// Opens a store from `configuration` and registers it under `name`.
    pub fn register_configuration(
        &self,
        name: impl Into<String>,
        configuration: StoreConfiguration,
    ) -> Result<(), StoreRegistryError> {
        self.register(name, configuration.open()?)
    }

    /// Retrieves a named store.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Store>, StoreRegistryError> {
        self.named
            .read()
            .map_err(StoreError::from)?
            .get(name)
            .map(Arc::clone)
            .ok_or_else(|| StoreRegistryError::NotRegistered(name.to_owned()))
    }

    /// Lists the names of the registered alternative stores.
    pub fn names(&self) -> Result<Vec<String>, StoreRegistryError> {
        let mut names: Vec<String> = self
            .named
            .read()
            .map_err(StoreError::from)?
            .keys()
            .cloned()
            .collect();
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, StoredValue};

    #[test]
    fn test_store_registry() {
        let registry = StoreRegistry::new(Arc::new(MemoryStore::new()));

        assert!(matches!(
            registry.get("sandbox"),
            Err(StoreRegistryError::NotRegistered(name)) if name == "sandbox"
        ));

        registry
            .register("sandbox", Arc::new(MemoryStore::new()))
            .unwrap();
        assert!(matches!(
            registry.register("sandbox", Arc::new(MemoryStore::new())),
            Err(StoreRegistryError::AlreadyRegistered(_))
        ));

        let sandbox = registry.get("sandbox").unwrap();
        sandbox.set("mode", StoredValue::Integer(1)).unwrap();

        assert_eq!(registry.standard().get("mode").unwrap(), None);
        assert_eq!(
            registry.get("sandbox").unwrap().get("mode").unwrap(),
            Some(StoredValue::Integer(1))
        );
        assert_eq!(registry.names().unwrap(), vec!["sandbox"]);
    }

    #[test]
    fn test_register_configuration() {
        let registry = StoreRegistry::open(StoreConfiguration::Memory).unwrap();
        registry
            .register_configuration("scratch", StoreConfiguration::Memory)
            .unwrap();

        registry.standard().set("a", StoredValue::Bool(true)).unwrap();
        assert_eq!(registry.get("scratch").unwrap().get("a").unwrap(), None);
    }
}
