//! Key-value storage trait.

use crate::StoreError;

/// A string key-value store that outlives the process.
///
/// Mirrors the browser `localStorage` surface: reads of a missing key return
/// `None`, removing a missing key is not an error.
pub trait KeyValueStore: Send + Sync {
    /// Retrieve a value.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a value.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Whether a value is stored under `key`.
    fn contains(&self, key: &str) -> Result<bool, StoreError> {
        self.get(key).map(|v| v.is_some())
    }
}
