//! The store façade.

use crate::config::StoreConfig;
use crate::error::CoreResult;
use crate::iter::LinkIterator;
use crate::key::StoreKey;
use crate::loader::LinkLoader;
use crate::writer::TraversalWriter;
use cid::Cid;
use selstore_codec::Value;
use selstore_storage::Datastore;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Memoizes selector traversals in a datastore.
///
/// Cheap to clone; clones share the datastore.
///
/// # Example
///
/// ```
/// use selstore_core::{loader_fn, BlockReader, Link, LinkContext, SelectorStore};
/// use selstore_codec::Value;
/// use selstore_storage::InMemoryDatastore;
/// use std::sync::Arc;
///
/// let store = SelectorStore::new(Arc::new(InMemoryDatastore::new()));
/// let root: cid::Cid = "bafkqaaa".parse().unwrap();
/// let selector = Value::text_map([(".", Value::empty_map())]);
///
/// let loader = loader_fn(|_: &LinkContext, _: &Link| {
///     Ok(Box::new(std::io::empty()) as BlockReader)
/// });
/// let writer = store.new_traversal(&root, &selector, loader).unwrap();
/// // hand `writer` to a traversal engine as its link loader, then:
/// writer.commit().unwrap();
///
/// assert!(store.has(&root, &selector).unwrap());
/// assert_eq!(store.get(&root, &selector).unwrap().count(), 0);
/// ```
#[derive(Clone)]
pub struct SelectorStore {
    datastore: Arc<dyn Datastore>,
    config: StoreConfig,
}

impl SelectorStore {
    /// Creates a store with default configuration.
    pub fn new(datastore: Arc<dyn Datastore>) -> Self {
        Self::with_config(datastore, StoreConfig::default())
    }

    /// Creates a store with the given configuration.
    pub fn with_config(datastore: Arc<dyn Datastore>, config: StoreConfig) -> Self {
        Self { datastore, config }
    }

    /// The store's configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Starts recording a traversal of `selector` from `root`.
    ///
    /// The returned writer is the loader to hand to the traversal engine.
    /// Nothing is stored until [`TraversalWriter::commit`].
    ///
    /// # Errors
    ///
    /// Fails only if the key cannot be derived.
    pub fn new_traversal<L: LinkLoader>(
        &self,
        root: &Cid,
        selector: &Value,
        loader: L,
    ) -> CoreResult<TraversalWriter<L>> {
        let key = StoreKey::derive(root, selector)?;
        debug!(%root, key = %key, "starting traversal recording");
        Ok(TraversalWriter::new(
            loader,
            key,
            Arc::clone(&self.datastore),
            self.config.clone(),
        ))
    }

    /// Whether a traversal of `selector` from `root` has been stored.
    ///
    /// # Errors
    ///
    /// Returns key derivation or datastore errors.
    pub fn has(&self, root: &Cid, selector: &Value) -> CoreResult<bool> {
        self.has_key(&StoreKey::derive(root, selector)?)
    }

    /// Replays the stored traversal of `selector` from `root`.
    ///
    /// # Errors
    ///
    /// Returns key derivation or datastore errors; an unknown traversal is
    /// a not-found storage error (see [`crate::CoreError::is_not_found`]).
    pub fn get(&self, root: &Cid, selector: &Value) -> CoreResult<LinkIterator> {
        self.get_key(&StoreKey::derive(root, selector)?)
    }

    /// Like [`SelectorStore::has`] with a precomputed key.
    ///
    /// # Errors
    ///
    /// Returns datastore errors.
    pub fn has_key(&self, key: &StoreKey) -> CoreResult<bool> {
        Ok(self.datastore.has(key.as_bytes())?)
    }

    /// Like [`SelectorStore::get`] with a precomputed key.
    ///
    /// # Errors
    ///
    /// Returns datastore errors.
    pub fn get_key(&self, key: &StoreKey) -> CoreResult<LinkIterator> {
        let data = self.datastore.get(key.as_bytes())?;
        debug!(key = %key, bytes = data.len(), "replaying traversal");
        Ok(LinkIterator::with_max_frame_size(
            data,
            self.config.max_frame_size,
        ))
    }
}

impl fmt::Debug for SelectorStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectorStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
