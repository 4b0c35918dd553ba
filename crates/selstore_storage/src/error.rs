//! Error types for datastore operations.

use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Result type for datastore operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during datastore operations.
///
/// Cloneable so that callers holding on to a failure (for example a
/// deferred commit error) can hand it out more than once.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(Arc<io::Error>),

    /// No value is stored under the key.
    #[error("key not found: {key_hex}")]
    NotFound {
        /// The missing key, hex-encoded.
        key_hex: String,
    },

    /// Stored data is unreadable.
    #[error("storage corrupted: {0}")]
    Corrupted(String),
}

impl StorageError {
    /// Creates a not-found error for the given key.
    pub fn not_found(key: &[u8]) -> Self {
        Self::NotFound {
            key_hex: hex::encode(key),
        }
    }

    /// Returns true if this is a [`StorageError::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_carries_hex_key() {
        let err = StorageError::not_found(b"\x01\xab");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "key not found: 01ab");
    }

    #[test]
    fn io_errors_convert_and_clone() {
        let err = StorageError::from(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert!(!err.is_not_found());
        let copy = err.clone();
        assert!(matches!(copy, StorageError::Io(ref inner) if inner.kind() == io::ErrorKind::PermissionDenied));
        assert_eq!(copy.to_string(), err.to_string());
        assert!(!StorageError::Corrupted("x".into()).is_not_found());
    }
}
