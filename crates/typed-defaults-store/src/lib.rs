#![doc = include_str!("../README.md")]

/// This module provides the store capability trait and the primitive wire types it persists.
pub mod store;

/// This module provides a registry for sharing named store handles.
pub mod registry;

mod configuration;
mod memory;
mod sqlite;

pub use configuration::StoreConfiguration;
pub use memory::MemoryStore;
pub use registry::{StoreRegistry, StoreRegistryError};
pub use sqlite::SqliteStore;
pub use store::{Store, StoreError, StoredValue};
