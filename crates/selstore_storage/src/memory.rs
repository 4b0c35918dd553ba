//! In-memory datastore.

use crate::datastore::Datastore;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::collections::HashMap;

/// An in-memory datastore.
///
/// Suitable for:
/// - Unit and integration tests
/// - Embedding where memoized traversals need not outlive the process
///
/// # Thread Safety
///
/// Backed by a `RwLock`; safe to share across threads.
///
/// # Example
///
/// ```rust
/// use selstore_storage::{Datastore, InMemoryDatastore};
///
/// let store = InMemoryDatastore::new();
/// store.put(b"key", b"value").unwrap();
/// assert!(store.has(b"key").unwrap());
/// assert_eq!(store.get(b"key").unwrap(), b"value");
/// ```
#[derive(Debug, Default)]
pub struct InMemoryDatastore {
    entries: RwLock<HashMap<Vec<u8>, Vec<u8>>>,
}

impl InMemoryDatastore {
    /// Creates a new empty datastore.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns all stored keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<Vec<u8>> {
        let mut keys: Vec<_> = self.entries.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl Datastore for InMemoryDatastore {
    fn put(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.entries.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &[u8]) -> StorageResult<Vec<u8>> {
        self.entries
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::not_found(key))
    }

    fn has(&self, key: &[u8]) -> StorageResult<bool> {
        Ok(self.entries.read().contains_key(key))
    }

    fn delete(&self, key: &[u8]) -> StorageResult<bool> {
        Ok(self.entries.write().remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn memory_new_is_empty() {
        let store = InMemoryDatastore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn memory_put_then_get() {
        let store = InMemoryDatastore::new();
        store.put(b"k", b"hello").unwrap();
        assert_eq!(store.get(b"k").unwrap(), b"hello");
        assert!(store.has(b"k").unwrap());
    }

    #[test]
    fn memory_missing_key_is_not_found() {
        let store = InMemoryDatastore::new();
        let err = store.get(b"\x01\x02").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "key not found: 0102");
        assert!(!store.has(b"\x01\x02").unwrap());
    }

    #[test]
    fn memory_put_overwrites() {
        let store = InMemoryDatastore::new();
        store.put(b"k", b"first").unwrap();
        store.put(b"k", b"second").unwrap();
        assert_eq!(store.get(b"k").unwrap(), b"second");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn memory_empty_value_is_stored() {
        let store = InMemoryDatastore::new();
        store.put(b"k", b"").unwrap();
        assert!(store.has(b"k").unwrap());
        assert!(store.get(b"k").unwrap().is_empty());
    }

    #[test]
    fn memory_delete() {
        let store = InMemoryDatastore::new();
        store.put(b"k", b"v").unwrap();
        assert!(store.delete(b"k").unwrap());
        assert!(!store.delete(b"k").unwrap());
        assert!(!store.has(b"k").unwrap());
    }

    #[test]
    fn memory_keys_sorted_and_clear() {
        let store = InMemoryDatastore::new();
        store.put(b"b", b"2").unwrap();
        store.put(b"a", b"1").unwrap();
        assert_eq!(store.keys(), vec![b"a".to_vec(), b"b".to_vec()]);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn memory_shared_across_threads() {
        let store = Arc::new(InMemoryDatastore::new());
        let handles: Vec<_> = (0u8..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.put(&[i], &[i; 4]).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.len(), 8);
        assert_eq!(store.get(&[3]).unwrap(), vec![3; 4]);
    }
}
