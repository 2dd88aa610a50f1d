use std::{path::PathBuf, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{MemoryStore, SqliteStore, Store, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
/// Configuration for the store backing a set of preferences.
pub enum StoreConfiguration {
    /// A process-local store. Nothing survives the process.
    Memory,

    /// SQLite configuration, used for persistent preferences.
    Sqlite {
        /// The folder containing the database file. Created if missing.
        folder_path: PathBuf,
        /// The database file name, without extension.
        db_name: String,
        /// The namespace inside the database. Different applications or users sharing a file
        /// should use different domains.
        domain: String,
    },
}

impl StoreConfiguration {
    /// Opens the configured store.
    pub fn open(self) -> Result<Arc<dyn Store>, StoreError> {
        if !self.is_usable() {
            return Err(StoreError::UnsupportedConfiguration(self));
        }

        match self {
            StoreConfiguration::Memory => Ok(Arc::new(MemoryStore::new())),
            StoreConfiguration::Sqlite {
                folder_path,
                db_name,
                domain,
            } => {
                std::fs::create_dir_all(&folder_path)?;
                let path = folder_path.join(format!("{db_name}.sqlite"));

                Ok(Arc::new(SqliteStore::open(path, domain)?))
            }
        }
    }

    fn is_usable(&self) -> bool {
        match self {
            StoreConfiguration::Memory => true,
            StoreConfiguration::Sqlite {
                db_name, domain, ..
            } => !db_name.is_empty() && !db_name.contains(['/', '\\']) && !domain.is_empty(),
        }
    }
}
