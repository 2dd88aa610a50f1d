//! Type-safe preference keys.

use tracing::{debug, warn};
use typed_defaults_store::{Store, StoreError};

use crate::PreferenceValue;

/// Declare a type-safe preference key.
///
/// This macro is the primary way to create preference keys. It associates a lookup name and a
/// default with a value type at compile time. Without an explicit default the type's
/// [`Default`] is used.
///
/// # Example
/// ```rust
/// use typed_defaults::{preference_key, Json};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct AppConfig {
///     theme: String,
///     auto_save: bool,
/// }
///
/// preference_key!(pub const FONT_SIZE: i64 = "font_size", 14);
/// preference_key!(pub const NICKNAME: Option<String> = "nickname");
/// preference_key!(pub const CONFIG: Json<AppConfig> = "app_config");
/// ```
#[macro_export]
macro_rules! preference_key {
    ($vis:vis const $name:ident: $ty:ty = $key:literal) => {
        $vis const $name: $crate::Key<$ty> =
            $crate::Key::new($key, <$ty as ::core::default::Default>::default);
    };
    ($vis:vis const $name:ident: $ty:ty = $key:literal, $default:expr) => {
        $vis const $name: $crate::Key<$ty> = $crate::Key::new($key, || $default);
    };
}

/// Validate that the provided name is usable as a lookup name.
///
/// A lookup name must be non-empty and must not contain NUL bytes. Uniqueness is not checked;
/// two keys sharing a name address the same entry.
pub const fn validate_key_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    if bytes.is_empty() {
        return false;
    }

    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == 0 {
            return false;
        }
        i += 1;
    }
    true
}

/// Type-safe key for preference storage.
///
/// Associates a lookup name and a default value with a value type, so every read and write of
/// the preference goes through the same typed path.
///
/// Use the [`preference_key!`](crate::preference_key) macro to declare keys.
pub struct Key<T> {
    name: &'static str,
    default: fn() -> T,
}

impl<T> Key<T> {
    /// Create a new type-safe key with the given lookup name and default.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty or contains a NUL byte. For keys declared as `const` items this
    /// is a compile-time error.
    pub const fn new(name: &'static str, default: fn() -> T) -> Self {
        assert!(
            validate_key_name(name),
            "Preference key names must be non-empty and must not contain NUL bytes"
        );
        Self { name, default }
    }

    /// Get the lookup name used for storage.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Produce the default value of this key.
    pub fn default_value(&self) -> T {
        (self.default)()
    }

    /// Tests whether the store holds any entry for this key.
    ///
    /// Store failures are logged and reported as `false`.
    pub fn is_set(&self, store: &dyn Store) -> bool {
        store.contains(self.name).unwrap_or_else(|e| {
            warn!("Failed to read preference '{}': {}", self.name, e);
            false
        })
    }

    /// Remove the stored entry, so subsequent reads resolve as if it was never set.
    pub fn remove(&self, store: &dyn Store) -> Result<(), StoreError> {
        store.remove(self.name)
    }
}

impl<T: PreferenceValue> Key<T> {
    /// Read the value of this key.
    ///
    /// Returns the default if the entry is absent or cannot be decoded as `T`. Store failures are
    /// logged and also resolve to the default.
    pub fn get(&self, store: &dyn Store) -> T {
        self.try_get(store).unwrap_or_else(|e| {
            warn!("Failed to read preference '{}': {}", self.name, e);
            self.default_value()
        })
    }

    /// Read the value of this key, surfacing store failures.
    ///
    /// Absent and undecodable entries still resolve to the default, except that absent optional
    /// strings, blobs, URLs and timestamps read as `None`.
    pub fn try_get(&self, store: &dyn Store) -> Result<T, StoreError> {
        let Some(stored) = store.get(self.name)? else {
            return Ok(T::absent(self.default));
        };

        let kind = stored.kind();
        Ok(T::from_stored(stored).unwrap_or_else(|| {
            debug!(
                "Preference '{}' holds an undecodable {} value, using default",
                self.name, kind
            );
            self.default_value()
        }))
    }

    /// Write the value of this key.
    ///
    /// Values without a stored representation (`None` for optional keys) remove the entry.
    pub fn set(&self, store: &dyn Store, value: T) -> Result<(), StoreError> {
        match value.to_stored() {
            Some(stored) => store.set(self.name, stored),
            None => store.remove(self.name),
        }
    }
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Key<T> {}

impl<T> std::fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Key")
            .field("name", &self.name)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use typed_defaults_store::{MemoryStore, StoredValue};

    use super::*;

    preference_key!(const LAUNCHES: i64 = "launches", 5);
    preference_key!(const NICKNAME: Option<String> = "nickname");
    preference_key!(const GREETING: String = "greeting", "hello".to_string());

    #[test]
    fn test_validate_name() {
        assert!(validate_key_name("valid"));
        assert!(validate_key_name("com.example.Valid-Name 2"));
        assert!(!validate_key_name(""));
        assert!(!validate_key_name("nul\0byte"));
    }

    #[test]
    #[should_panic(expected = "must be non-empty")]
    fn test_empty_name_is_fatal() {
        let name: &'static str = Box::leak(String::new().into_boxed_str());
        let _ = Key::<bool>::new(name, || false);
    }

    #[test]
    fn test_name_is_used_verbatim() {
        assert_eq!(LAUNCHES.name(), "launches");

        let store = MemoryStore::new();
        LAUNCHES.set(&store, 9).unwrap();
        assert_eq!(store.get("launches").unwrap(), Some(StoredValue::Integer(9)));
    }

    #[test]
    fn test_defaults() {
        let store = MemoryStore::new();

        assert_eq!(LAUNCHES.get(&store), 5);
        assert_eq!(NICKNAME.get(&store), None);
        assert_eq!(GREETING.get(&store), "hello");
        assert!(!LAUNCHES.is_set(&store));
    }

    #[test]
    fn test_wrong_kind_falls_back_to_default() {
        let store = MemoryStore::new();
        store
            .set("launches", StoredValue::String("many".into()))
            .unwrap();

        assert!(LAUNCHES.is_set(&store));
        assert_eq!(LAUNCHES.get(&store), 5);
        assert_eq!(LAUNCHES.try_get(&store).unwrap(), 5);
    }

    #[test]
    fn test_none_removes_entry() {
        let store = MemoryStore::new();

        NICKNAME.set(&store, Some("ada".into())).unwrap();
        assert_eq!(NICKNAME.get(&store), Some("ada".to_string()));

        NICKNAME.set(&store, None).unwrap();
        assert!(!NICKNAME.is_set(&store));
        assert_eq!(NICKNAME.get(&store), None);
    }

    #[test]
    fn test_remove() {
        let store = MemoryStore::new();

        GREETING.set(&store, "hi".into()).unwrap();
        GREETING.remove(&store).unwrap();
        assert_eq!(GREETING.get(&store), "hello");
    }

    #[test]
    fn test_debug() {
        assert_eq!(
            format!("{LAUNCHES:?}"),
            r#"Key { name: "launches", type: "i64" }"#
        );
    }
}
