//! Persistence port for playground state.
//!
//! The engine only needs a synchronous, string-valued key-value store. Writes
//! are fire-and-forget: a store that cannot persist a value logs the failure
//! and keeps going.

use std::collections::HashMap;

/// Trait for stores that hold the playground's persisted values.
///
/// Implement this trait to back saved queries (and, in the application crate,
/// progress and session flags) with a file, an embedded database or browser
/// storage.
pub trait KeyValueStore {
    /// Read a value.
    ///
    /// # Returns
    /// The stored string, or None if the key was never written
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one.
    fn set(&mut self, key: &str, value: &str);

    /// Remove a key.
    ///
    /// # Returns
    /// true if a value was removed
    fn remove(&mut self, _key: &str) -> bool {
        false
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> bool {
        (**self).remove(key)
    }
}

/// In-memory store for tests and ephemeral sessions
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    values: HashMap<String, String>,
}

impl InMemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with values
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }
}
