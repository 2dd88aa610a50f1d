//! Shared preference handle with change notification.

use std::{
    cell::RefCell,
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, Weak,
    },
};

use tracing::{debug, warn};
use typed_defaults_store::{MemoryStore, Store, StoreConfiguration, StoreError};

use crate::{Key, Preference, PreferenceValue};

type Callback = Arc<Mutex<Box<dyn FnMut() + Send>>>;

// Unique across every `Defaults`, so the running set below can mix handles.
static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(0);

thread_local! {
    // Subscriptions whose callback is currently running on this thread.
    static RUNNING: RefCell<Vec<u64>> = const { RefCell::new(Vec::new()) };
}

struct RunningGuard(u64);

impl RunningGuard {
    /// Marks `id` as running on this thread, or returns `None` if it already is.
    fn enter(id: u64) -> Option<Self> {
        RUNNING.with(|running| {
            let mut running = running.borrow_mut();
            if running.contains(&id) {
                return None;
            }
            running.push(id);
            Some(RunningGuard(id))
        })
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        RUNNING.with(|running| running.borrow_mut().retain(|id| *id != self.0));
    }
}

#[derive(Default)]
struct Observers {
    by_name: Mutex<HashMap<&'static str, Vec<(u64, Callback)>>>,
}

impl Observers {
    fn insert(self: &Arc<Self>, name: &'static str, callback: Callback) -> Subscription {
        let id = NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed);
        self.by_name
            .lock()
            .expect("Mutex should not be poisoned")
            .entry(name)
            .or_default()
            .push((id, callback));

        Subscription {
            observers: Arc::downgrade(self),
            name,
            id,
        }
    }

    fn remove(&self, name: &str, id: u64) {
        let mut by_name = self.by_name.lock().expect("Mutex should not be poisoned");
        if let Some(callbacks) = by_name.get_mut(name) {
            callbacks.retain(|(existing, _)| *existing != id);
            if callbacks.is_empty() {
                by_name.remove(name);
            }
        }
    }

    fn notify(&self, name: &str) {
        // Callbacks run outside the table lock so they may read, write or subscribe.
        let callbacks: Vec<(u64, Callback)> = self
            .by_name
            .lock()
            .expect("Mutex should not be poisoned")
            .get(name)
            .map(|callbacks| {
                callbacks
                    .iter()
                    .map(|(id, c)| (*id, Arc::clone(c)))
                    .collect()
            })
            .unwrap_or_default();

        for (id, callback) in callbacks {
            // A callback already running on this thread is writing its own preference.
            let Some(_running) = RunningGuard::enter(id) else {
                debug!("Skipping re-entrant notification for preference '{}'", name);
                continue;
            };

            // Another thread may be running it; wait so the latest value is delivered.
            let mut callback = callback.lock().unwrap_or_else(|poisoned| {
                warn!(
                    "A previous notification for preference '{}' panicked, continuing",
                    name
                );
                poisoned.into_inner()
            });
            (*callback)();
        }
    }
}

/// Keeps a change callback registered. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    observers: Weak<Observers>,
    name: &'static str,
    id: u64,
}

impl Subscription {
    /// The lookup name this subscription observes.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Keep the callback registered for as long as the [`Defaults`] it came from lives.
    pub fn detach(mut self) {
        self.observers = Weak::new();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(observers) = self.observers.upgrade() {
            observers.remove(self.name, self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("name", &self.name)
            .finish()
    }
}

/// A store handle paired with change notification.
///
/// Reads go straight to the store. Writes made through a `Defaults` (or any clone of it, or a
/// [`Preference`] created from it) notify every subscriber of the written lookup name before the
/// write returns. Keys that share a lookup name share subscribers. Writes made directly on the
/// underlying store are not observed.
///
/// A subscription's callback never runs concurrently with itself: a write on one thread waits for
/// a notification still running on another.
///
/// # Example
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use typed_defaults::{preference_key, Defaults};
///
/// preference_key!(const VOLUME: i64 = "volume", 50);
///
/// let defaults = Defaults::in_memory();
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let recorder = Arc::clone(&seen);
/// let _subscription = defaults.subscribe(VOLUME, move |volume| {
///     recorder.lock().unwrap().push(volume);
/// });
///
/// defaults.set(VOLUME, 80).unwrap();
/// defaults.remove(VOLUME).unwrap();
/// assert_eq!(*seen.lock().unwrap(), vec![80, 50]);
/// ```
#[derive(Clone)]
pub struct Defaults {
    store: Arc<dyn Store>,
    observers: Arc<Observers>,
}

impl std::fmt::Debug for Defaults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Defaults").finish()
    }
}

impl Defaults {
    /// Wrap a store handle.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            observers: Arc::new(Observers::default()),
        }
    }

    /// Create a handle over a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Open the configured store and wrap it.
    pub fn open(configuration: StoreConfiguration) -> Result<Self, StoreError> {
        Ok(Self::new(configuration.open()?))
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Read a preference. See [`Key::get`].
    pub fn get<T: PreferenceValue>(&self, key: Key<T>) -> T {
        key.get(self.store.as_ref())
    }

    /// Write a preference and notify its subscribers. See [`Key::set`].
    pub fn set<T: PreferenceValue>(&self, key: Key<T>, value: T) -> Result<(), StoreError> {
        key.set(self.store.as_ref(), value)?;
        self.observers.notify(key.name());
        Ok(())
    }

    /// Remove a preference and notify its subscribers.
    pub fn remove<T>(&self, key: Key<T>) -> Result<(), StoreError> {
        key.remove(self.store.as_ref())?;
        self.observers.notify(key.name());
        Ok(())
    }

    /// Tests whether the store holds any entry for `key`.
    pub fn is_set<T>(&self, key: Key<T>) -> bool {
        key.is_set(self.store.as_ref())
    }

    /// Lists the lookup names with a stored entry.
    pub fn keys(&self) -> Result<Vec<String>, StoreError> {
        self.store.keys()
    }

    /// Call `on_change` with the freshly read value after every write of `key`'s lookup name.
    pub fn subscribe<T, F>(&self, key: Key<T>, mut on_change: F) -> Subscription
    where
        T: PreferenceValue + 'static,
        F: FnMut(T) + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let callback: Box<dyn FnMut() + Send> =
            Box::new(move || on_change(key.get(store.as_ref())));

        self.observers.insert(key.name(), Arc::new(Mutex::new(callback)))
    }

    /// Bind `key` to this handle as an observable cell.
    pub fn preference<T: PreferenceValue + 'static>(&self, key: Key<T>) -> Preference<T> {
        Preference::new(self.clone(), key)
    }
}
