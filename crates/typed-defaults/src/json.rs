//! JSON folding for values the store has no native wire type for.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};
use typed_defaults_store::StoredValue;

use crate::PreferenceValue;

/// A structured value persisted as a JSON string.
///
/// Wraps an optional value: `Json(None)` is stored as `null` and is the default of any
/// `Json<T>` key declared without an explicit default. Reads that find an absent entry, a
/// non-string entry or JSON that no longer matches `T` resolve to the key's default.
///
/// # Example
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use typed_defaults::{preference_key, Json, MemoryStore};
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct Profile {
///     name: String,
/// }
///
/// preference_key!(const PROFILE: Json<Profile> = "profile");
///
/// let store = MemoryStore::new();
/// assert_eq!(PROFILE.get(&store), Json(None));
///
/// PROFILE.set(&store, Json::new(Profile { name: "Ada".into() })).unwrap();
/// assert_eq!(PROFILE.get(&store).into_inner().unwrap().name, "Ada");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Json<T>(pub Option<T>);

impl<T> Json<T> {
    /// Wrap a present value.
    pub fn new(value: T) -> Self {
        Json(Some(value))
    }

    /// The "no value" marker.
    pub const fn none() -> Self {
        Json(None)
    }

    /// Whether this is the "no value" marker.
    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    /// Borrow the wrapped value, if any.
    pub fn value(&self) -> Option<&T> {
        self.0.as_ref()
    }

    /// Unwrap into the underlying optional value.
    pub fn into_inner(self) -> Option<T> {
        self.0
    }
}

impl<T: Serialize> Json<T> {
    /// Encode the wrapped value. Encoding failures yield an empty string, which never decodes.
    pub fn encode(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|e| {
            warn!("Failed to encode structured preference: {}", e);
            String::new()
        })
    }
}

impl<T: DeserializeOwned> Json<T> {
    /// Decode a stored string. `null` decodes to `Json(None)`; anything that is not valid JSON
    /// for `Option<T>` is an error.
    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Option<T>>(raw).map(Json)
    }
}

impl<T> Default for Json<T> {
    fn default() -> Self {
        Json(None)
    }
}

impl<T> From<T> for Json<T> {
    fn from(value: T) -> Self {
        Json(Some(value))
    }
}

impl<T: Serialize + DeserializeOwned> PreferenceValue for Json<T> {
    fn to_stored(&self) -> Option<StoredValue> {
        Some(StoredValue::String(self.encode()))
    }

    fn from_stored(value: StoredValue) -> Option<Self> {
        let raw = value.into_string()?;
        match Self::decode(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("Failed to decode structured preference: {}", e);
                None
            }
        }
    }
}

pub(crate) fn encode_json<T: Serialize>(value: &T) -> StoredValue {
    StoredValue::String(serde_json::to_string(value).unwrap_or_else(|e| {
        warn!("Failed to encode preference as JSON: {}", e);
        String::new()
    }))
}

pub(crate) fn decode_json<T: for<'de> Deserialize<'de>>(value: StoredValue) -> Option<T> {
    serde_json::from_str(value.as_str()?).ok()
}
