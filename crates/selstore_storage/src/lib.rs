//! # selstore storage
//!
//! Key-value datastore trait and implementations for selstore.
//!
//! Datastores are **opaque byte stores** keyed by opaque byte strings. They
//! know nothing about storage keys, selectors, or the traversal record
//! format; selstore owns all interpretation.
//!
//! ## Design Principles
//!
//! - Three operations matter to selstore: `put`, `get`, `has`
//! - `put` is atomic per key, last write wins
//! - Must be `Send + Sync`; independent traversals share one datastore
//!
//! ## Available Datastores
//!
//! - [`InMemoryDatastore`] - For testing and ephemeral memoization
//! - [`FileDatastore`] - One file per key under a directory
//!
//! ## Example
//!
//! ```rust
//! use selstore_storage::{Datastore, InMemoryDatastore};
//!
//! let store = InMemoryDatastore::new();
//! store.put(b"traversal", b"\x00").unwrap();
//! assert_eq!(store.get(b"traversal").unwrap(), b"\x00");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod datastore;
mod error;
mod file;
mod memory;

pub use datastore::Datastore;
pub use error::{StorageError, StorageResult};
pub use file::FileDatastore;
pub use memory::InMemoryDatastore;
