#![doc = include_str!("../README.md")]

mod defaults;
mod json;
mod key;
mod preference;
mod raw;
mod value;

pub use defaults::{Defaults, Subscription};
pub use json::Json;
pub use key::{validate_key_name, Key};
pub use preference::Preference;
pub use raw::RawRepresentable;
pub use typed_defaults_store::{
    MemoryStore, SqliteStore, Store, StoreConfiguration, StoreError, StoreRegistry,
    StoreRegistryError, StoredValue,
};
pub use value::PreferenceValue;
