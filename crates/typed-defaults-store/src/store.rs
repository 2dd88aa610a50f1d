use std::fmt;

use crate::StoreConfiguration;

/// An error resulting from operations on a store.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// A lock guarding the store was poisoned by a panicking writer.
    #[error("Store lock poisoned")]
    Poisoned,

    /// An internal database error.
    #[error(transparent)]
    Database(#[from] rusqlite::Error),

    /// The store folder could not be created.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The stored kind tag is unknown, or the value does not match it.
    #[error("Invalid stored value of kind '{0}'")]
    InvalidKind(String),

    /// The configuration cannot be opened.
    #[error("Unsupported store configuration: {0:?}")]
    UnsupportedConfiguration(StoreConfiguration),
}

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        StoreError::Poisoned
    }
}

/// A primitive value as persisted by a [`Store`].
///
/// Every preference ends up as exactly one of these. Structured values are folded into
/// [`StoredValue::String`] by the layer above.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    /// A boolean flag.
    Bool(bool),
    /// A signed 64-bit integer.
    Integer(i64),
    /// A 64-bit float.
    Double(f64),
    /// A UTF-8 string.
    String(String),
    /// An opaque byte blob.
    Data(Vec<u8>),
}

impl StoredValue {
    /// The tag used to record the wire type alongside the value.
    pub fn kind(&self) -> &'static str {
        match self {
            StoredValue::Bool(_) => "bool",
            StoredValue::Integer(_) => "integer",
            StoredValue::Double(_) => "double",
            StoredValue::String(_) => "string",
            StoredValue::Data(_) => "data",
        }
    }

    /// Returns the value if it is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StoredValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the value if it is an integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            StoredValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the value as a double. Integers are widened.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            StoredValue::Double(value) => Some(*value),
            StoredValue::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }

    /// Borrows the value if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            StoredValue::String(value) => Some(value),
            _ => None,
        }
    }

    /// Converts into the string, if it is one.
    pub fn into_string(self) -> Option<String> {
        match self {
            StoredValue::String(value) => Some(value),
            _ => None,
        }
    }

    /// Converts into the byte blob, if it is one.
    pub fn into_data(self) -> Option<Vec<u8>> {
        match self {
            StoredValue::Data(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for StoredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoredValue::Bool(value) => write!(f, "{value}"),
            StoredValue::Integer(value) => write!(f, "{value}"),
            StoredValue::Double(value) => write!(f, "{value}"),
            StoredValue::String(value) => write!(f, "{value:?}"),
            StoredValue::Data(value) => write!(f, "<{} bytes>", value.len()),
        }
    }
}

/// This trait represents a key-value namespace, capable of storing and retrieving
/// primitive values by lookup name.
///
/// Absence is reported as `None` and is never conflated with a type's zero value. A store
/// performs no type coercion; whatever was last written under a name is what `get` returns.
pub trait Store: Send + Sync {
    /// Retrieves the entry stored under `name`.
    fn get(&self, name: &str) -> Result<Option<StoredValue>, StoreError>;
    /// Stores `value` under `name`, replacing any previous entry.
    fn set(&self, name: &str, value: StoredValue) -> Result<(), StoreError>;
    /// Removes the entry stored under `name`. Removing a missing entry is not an error.
    fn remove(&self, name: &str) -> Result<(), StoreError>;
    /// Lists the names of all entries in this namespace.
    fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Tests whether any entry exists for `name`, independent of its type.
    fn contains(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.get(name)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_accepts_integer() {
        assert_eq!(StoredValue::Integer(3).as_double(), Some(3.0));
        assert_eq!(StoredValue::Double(0.5).as_double(), Some(0.5));
        assert_eq!(StoredValue::Bool(true).as_double(), None);
    }

    #[test]
    fn test_accessors_reject_other_kinds() {
        assert_eq!(StoredValue::Integer(0).as_bool(), None);
        assert_eq!(StoredValue::Bool(false).as_integer(), None);
        assert_eq!(StoredValue::Data(vec![1]).into_string(), None);
        assert_eq!(StoredValue::String("x".into()).into_data(), None);
    }
}
