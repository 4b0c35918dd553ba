//! # selstore core
//!
//! Record and replay of selector traversals over content-addressed graphs.
//!
//! A traversal engine walks a graph from a root CID according to a
//! selector, asking a link loader for each block it follows. This crate
//! wraps that loader so every load is recorded, then stores the ordered
//! record under a key derived from the root and the selector. Later the
//! same (root, selector) pair replays the recorded links without walking
//! the graph again.
//!
//! This crate provides:
//! - [`StoreKey`]: deterministic, reversible storage keys
//! - [`encode_traversed_link`] / [`RecordReader`]: the record log framing
//! - [`TraversalWriter`]: the recording loader and its commit
//! - [`LinkIterator`]: replay of a stored traversal
//! - [`SelectorStore`]: the façade tying these to a [`Datastore`]
//!
//! ## Usage
//!
//! ```
//! use selstore_core::{loader_fn, BlockReader, Link, LinkContext, Path, SelectorStore};
//! use selstore_codec::Value;
//! use selstore_storage::InMemoryDatastore;
//! use std::sync::Arc;
//!
//! let store = SelectorStore::new(Arc::new(InMemoryDatastore::new()));
//! let root: cid::Cid = "bafkqaaa".parse().unwrap();
//! let selector = Value::text_map([(".", Value::empty_map())]);
//!
//! let mut writer = store
//!     .new_traversal(&root, &selector, loader_fn(|_: &LinkContext, _: &Link| {
//!         Ok(Box::new(std::io::empty()) as BlockReader)
//!     }))
//!     .unwrap();
//! let _block = writer.load(&LinkContext::new(Path::root()), &Link::new(root));
//! writer.commit().unwrap();
//!
//! for link in store.get(&root, &selector).unwrap() {
//!     let link = link.unwrap();
//!     assert_eq!(link.link().cid(), &root);
//!     assert!(link.load_error().is_none());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod iter;
mod key;
mod loader;
mod record;
mod store;
mod types;
mod varint;
mod writer;

pub use config::{StoreConfig, DAG_CBOR_CODEC, DEFAULT_MAX_FRAME_SIZE};
pub use error::{CoreError, CoreResult};
pub use iter::LinkIterator;
pub use key::{StoreKey, KEY_FORMAT_VERSION};
pub use loader::{loader_fn, BlockReader, LinkContext, LinkLoader, LoadError, LoadResult};
pub use record::{decode_traversed_link, encode_traversed_link, RecordReader};
pub use store::SelectorStore;
pub use types::{Link, Path, PathSegment, TraversedLink, PATH_SEPARATOR};
pub use varint::{decode_uvarint, encode_uvarint, MAX_VARINT_LEN};
pub use writer::TraversalWriter;

pub use cid::Cid;
pub use selstore_codec::Value;
pub use selstore_storage::Datastore;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
