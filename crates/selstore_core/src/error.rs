//! Error types for selstore core.

use selstore_codec::CodecError;
use selstore_storage::StorageError;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in selstore core operations.
///
/// `Clone` because a recording failure is remembered and handed out again
/// on every later load and on commit.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// The selector could not be canonically encoded into a storage key.
    #[error("key derivation failed: {0}")]
    KeyDerivation(#[source] CodecError),

    /// A storage key could not be split back into root hash and selector.
    #[error("key decoding failed: {message}")]
    KeyDecoding {
        /// Description of the failure.
        message: String,
    },

    /// A traversed link could not be written to the record log.
    #[error("record encoding failed: {message}")]
    RecordEncoding {
        /// Description of the failure.
        message: String,
    },

    /// The record log is truncated or malformed.
    #[error("record decoding failed: {message}")]
    RecordDecoding {
        /// Description of the failure.
        message: String,
    },

    /// Datastore error, propagated verbatim.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl CoreError {
    /// Creates a key decoding error.
    pub fn key_decoding(message: impl Into<String>) -> Self {
        Self::KeyDecoding {
            message: message.into(),
        }
    }

    /// Creates a record encoding error.
    pub fn record_encoding(message: impl Into<String>) -> Self {
        Self::RecordEncoding {
            message: message.into(),
        }
    }

    /// Creates a record decoding error.
    pub fn record_decoding(message: impl Into<String>) -> Self {
        Self::RecordDecoding {
            message: message.into(),
        }
    }

    /// Returns true if the datastore reported the key as absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Storage(err) if err.is_not_found())
    }
}
