//! Datastore trait definition.

use crate::error::StorageResult;

/// A key-value store addressed by opaque byte keys.
///
/// Datastores are **opaque byte stores**: they never interpret keys or
/// values. selstore owns the key layout and the record format.
///
/// # Invariants
///
/// - `get` returns exactly the bytes of the last successful `put` for a key
/// - `put` replaces any previous value (last write wins)
/// - a `put` is all-or-nothing: readers never observe a partial value
/// - implementations must be `Send + Sync`; concurrent calls are allowed
///
/// # Implementors
///
/// - [`super::InMemoryDatastore`] - For tests and embedding
/// - [`super::FileDatastore`] - One file per key in a directory
pub trait Datastore: Send + Sync {
    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn put(&self, key: &[u8], value: &[u8]) -> StorageResult<()>;

    /// Reads the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StorageError::NotFound`] if nothing is stored under
    /// `key`, or another error if the read fails.
    fn get(&self, key: &[u8]) -> StorageResult<Vec<u8>>;

    /// Returns whether a value is stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the check fails.
    fn has(&self, key: &[u8]) -> StorageResult<bool>;

    /// Removes the value under `key`. Returns `true` if one existed.
    ///
    /// Administrative operation; selstore itself never deletes records.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal fails.
    fn delete(&self, key: &[u8]) -> StorageResult<bool>;
}
