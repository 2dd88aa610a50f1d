use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use rusqlite::{types::Value, OptionalExtension};
use tracing::debug;

use crate::{Store, StoreError, StoredValue};

/// A persistent [`Store`] backed by a SQLite database.
///
/// A database file may host several domains. Each domain is an independent namespace, and
/// handles to different domains of the same file share a single connection.
#[derive(Clone)]
pub struct SqliteStore {
    connection: Arc<Mutex<rusqlite::Connection>>,
    domain: String,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("domain", &self.domain)
            .finish()
    }
}

impl SqliteStore {
    /// Opens (or creates) the database at `path` and returns a handle to `domain`.
    pub fn open(path: impl AsRef<Path>, domain: impl Into<String>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let connection = rusqlite::Connection::open(path)?;

        // Set WAL mode for better concurrency
        connection.query_row("PRAGMA journal_mode = WAL;", [], |row| {
            row.get::<_, String>(0)
        })?;

        debug!("Opened preference database at {}", path.display());
        Self::initialize(connection, domain.into())
    }

    /// Opens a private in-memory database and returns a handle to `domain`.
    pub fn open_in_memory(domain: impl Into<String>) -> Result<Self, StoreError> {
        Self::initialize(rusqlite::Connection::open_in_memory()?, domain.into())
    }

    fn initialize(connection: rusqlite::Connection, domain: String) -> Result<Self, StoreError> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS preferences (
                domain TEXT NOT NULL,
                key TEXT NOT NULL,
                kind TEXT NOT NULL,
                value,
                PRIMARY KEY (domain, key)
            );",
            [],
        )?;

        Ok(SqliteStore {
            connection: Arc::new(Mutex::new(connection)),
            domain,
        })
    }

    /// Returns a handle to another domain of the same database.
    pub fn domain(&self, domain: impl Into<String>) -> Self {
        SqliteStore {
            connection: Arc::clone(&self.connection),
            domain: domain.into(),
        }
    }

    /// The name of the namespace this handle addresses.
    pub fn domain_name(&self) -> &str {
        &self.domain
    }
}

fn encode(value: StoredValue) -> (&'static str, Value) {
    let kind = value.kind();
    let value = match value {
        StoredValue::Bool(value) => Value::Integer(i64::from(value)),
        StoredValue::Integer(value) => Value::Integer(value),
        StoredValue::Double(value) => Value::Real(value),
        StoredValue::String(value) => Value::Text(value),
        StoredValue::Data(value) => Value::Blob(value),
    };
    (kind, value)
}

fn decode(kind: &str, value: Value) -> Result<StoredValue, StoreError> {
    match (kind, value) {
        ("bool", Value::Integer(value)) => Ok(StoredValue::Bool(value != 0)),
        ("integer", Value::Integer(value)) => Ok(StoredValue::Integer(value)),
        ("double", Value::Real(value)) => Ok(StoredValue::Double(value)),
        ("double", Value::Integer(value)) => Ok(StoredValue::Double(value as f64)),
        // SQLite binds NaN as NULL.
        ("double", Value::Null) => Ok(StoredValue::Double(f64::NAN)),
        ("string", Value::Text(value)) => Ok(StoredValue::String(value)),
        ("data", Value::Blob(value)) => Ok(StoredValue::Data(value)),
        (kind, _) => Err(StoreError::InvalidKind(kind.to_owned())),
    }
}

impl Store for SqliteStore {
    fn get(&self, name: &str) -> Result<Option<StoredValue>, StoreError> {
        let conn = self.connection.lock()?;
        let row = conn
            .query_row(
                "SELECT kind, value FROM preferences WHERE domain = ?1 AND key = ?2",
                rusqlite::params![self.domain, name],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, Value>(1)?)),
            )
            .optional()?;

        row.map(|(kind, value)| decode(&kind, value)).transpose()
    }

    fn set(&self, name: &str, value: StoredValue) -> Result<(), StoreError> {
        let mut conn = self.connection.lock()?;
        let transaction = conn.transaction()?;

        let (kind, value) = encode(value);

        transaction.execute(
            "INSERT OR REPLACE INTO preferences (domain, key, kind, value) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![self.domain, name, kind, value],
        )?;

        transaction.commit()?;
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<(), StoreError> {
        let mut conn = self.connection.lock()?;
        let transaction = conn.transaction()?;

        transaction.execute(
            "DELETE FROM preferences WHERE domain = ?1 AND key = ?2",
            rusqlite::params![self.domain, name],
        )?;

        transaction.commit()?;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.connection.lock()?;
        let mut stmt = conn.prepare("SELECT key FROM preferences WHERE domain = ?1 ORDER BY key")?;
        let rows = stmt.query_map(rusqlite::params![self.domain], |row| row.get(0))?;

        let mut results = Vec::new();
        for row in rows {
            let key: String = row?;
            results.push(key);
        }

        Ok(results)
    }
}
