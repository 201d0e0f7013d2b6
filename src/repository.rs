//! Repository - keyed in-memory store
//!
//! The primitive every cache is built on: a string-keyed map that remembers
//! insertion order. Keys are unique; `add` never overwrites. Replacing a value
//! always goes through an explicit `update` or `upsert`.

use std::collections::HashMap;

/// A string-keyed store with insertion-ordered keys
#[derive(Debug, Clone)]
pub struct Repository<V> {
    /// Stored values keyed by name
    entries: HashMap<String, V>,
    /// Keys in insertion order (for enumeration)
    keys: Vec<String>,
}

impl<V> Repository<V> {
    /// Create an empty repository
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            keys: Vec::new(),
        }
    }

    /// Insert a value under a new key
    ///
    /// Returns `false` and leaves the repository untouched if the key is
    /// already present.
    pub fn add(&mut self, key: impl Into<String>, value: V) -> bool {
        let key = key.into();
        if self.entries.contains_key(&key) {
            return false;
        }
        self.keys.push(key.clone());
        self.entries.insert(key, value);
        true
    }

    /// Get the value stored under a key
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    /// Get a mutable reference to the value stored under a key
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.entries.get_mut(key)
    }

    /// Check if a key is present
    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Replace the value of an existing key
    ///
    /// Returns `false` if the key is absent. The key keeps its original
    /// position in the ordering.
    pub fn update(&mut self, key: &str, value: V) -> bool {
        match self.entries.get_mut(key) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Insert or replace. Returns `true` if an existing value was replaced.
    pub fn upsert(&mut self, key: impl Into<String>, value: V) -> bool {
        let key = key.into();
        match self.entries.get_mut(&key) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => {
                self.keys.push(key.clone());
                self.entries.insert(key, value);
                false
            }
        }
    }

    /// Remove an entry. Returns whether anything was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        self.take(key).is_some()
    }

    /// Remove an entry and hand back its value
    pub fn take(&mut self, key: &str) -> Option<V> {
        let value = self.entries.remove(key)?;
        self.keys.retain(|k| k != key);
        Some(value)
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
        self.keys.clear();
    }

    /// Keys in insertion order
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the repository is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.keys
            .iter()
            .filter_map(|key| self.entries.get(key).map(|value| (key.as_str(), value)))
    }

    /// Iterate over values in insertion order
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }
}

impl<V> Default for Repository<V> {
    fn default() -> Self {
        Self::new()
    }
}
