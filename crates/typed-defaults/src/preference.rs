use typed_defaults_store::StoreError;

use crate::{Defaults, Key, PreferenceValue, Subscription};

/// An observable cell bound to one preference.
///
/// Reading re-reads the store every time. Writing goes through the owning [`Defaults`], so every
/// subscriber of the lookup name (including subscribers of other cells bound to the same name)
/// is notified before the write returns.
///
/// # Example
/// ```rust
/// use std::sync::{
///     atomic::{AtomicBool, Ordering},
///     Arc,
/// };
/// use typed_defaults::{preference_key, Defaults};
///
/// preference_key!(const DARK_MODE: bool = "dark_mode");
///
/// let dark_mode = Defaults::in_memory().preference(DARK_MODE);
/// let invalidated = Arc::new(AtomicBool::new(false));
///
/// let flag = Arc::clone(&invalidated);
/// let _subscription = dark_mode.subscribe(move |_| flag.store(true, Ordering::SeqCst));
///
/// dark_mode.set(true).unwrap();
/// assert!(dark_mode.get());
/// assert!(invalidated.load(Ordering::SeqCst));
/// ```
pub struct Preference<T> {
    defaults: Defaults,
    key: Key<T>,
}

impl<T: PreferenceValue + 'static> Preference<T> {
    /// Bind `key` to `defaults`.
    pub fn new(defaults: Defaults, key: Key<T>) -> Self {
        Self { defaults, key }
    }

    /// The key this cell reads and writes.
    pub fn key(&self) -> Key<T> {
        self.key
    }

    /// The current value.
    pub fn get(&self) -> T {
        self.defaults.get(self.key)
    }

    /// Write a new value and notify subscribers.
    pub fn set(&self, value: T) -> Result<(), StoreError> {
        self.defaults.set(self.key, value)
    }

    /// Read, modify and write back the value.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> Result<(), StoreError> {
        let mut value = self.get();
        f(&mut value);
        self.set(value)
    }

    /// Remove the stored entry, so the cell reads its default again.
    pub fn reset(&self) -> Result<(), StoreError> {
        self.defaults.remove(self.key)
    }

    /// Tests whether a value is stored for this preference.
    pub fn is_set(&self) -> bool {
        self.defaults.is_set(self.key)
    }

    /// Register `on_change` to receive the new value after every write.
    pub fn subscribe(&self, on_change: impl FnMut(T) + Send + 'static) -> Subscription {
        self.defaults.subscribe(self.key, on_change)
    }
}

impl<T> Clone for Preference<T> {
    fn clone(&self) -> Self {
        Self {
            defaults: self.defaults.clone(),
            key: self.key,
        }
    }
}

impl<T> std::fmt::Debug for Preference<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preference")
            .field("key", &self.key)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    crate::preference_key!(const RECENT: Vec<u8> = "recent");
    crate::preference_key!(const ZOOM: f64 = "zoom", 1.0);

    #[test]
    fn test_update() {
        let recent = Defaults::in_memory().preference(RECENT);

        recent.update(|items| items.push(1)).unwrap();
        recent.update(|items| items.push(2)).unwrap();
        assert_eq!(recent.get(), vec![1, 2]);
    }

    #[test]
    fn test_reset() {
        let zoom = Defaults::in_memory().preference(ZOOM);

        zoom.set(2.5).unwrap();
        assert!(zoom.is_set());

        zoom.reset().unwrap();
        assert!(!zoom.is_set());
        assert_eq!(zoom.get(), 1.0);
    }

    #[test]
    fn test_cells_on_same_key_observe_each_other() {
        let defaults = Defaults::in_memory();
        let first = defaults.preference(ZOOM);
        let second = first.clone();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        let _subscription = first.subscribe(move |zoom| recorder.lock().unwrap().push(zoom));

        second.set(3.0).unwrap();
        second.reset().unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![3.0, 1.0]);
    }
}
