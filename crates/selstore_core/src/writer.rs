//! The recording loader.
//!
//! A [`TraversalWriter`] sits between a traversal engine and the caller's
//! loader. Every load is forwarded, and its link, path and outcome are
//! appended to an in-memory log. [`TraversalWriter::commit`] persists the
//! log under the traversal's key.
//!
//! A recording failure is sticky: once a record cannot be written, every
//! later load fails with that same error without reaching the underlying
//! loader, and commit returns it without touching the datastore.

use crate::config::StoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::key::StoreKey;
use crate::loader::{LinkContext, LinkLoader, LoadResult};
use crate::record::encode_traversed_link;
use crate::types::{Link, TraversedLink};
use selstore_storage::Datastore;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Records the links a traversal loads, then commits them in one write.
pub struct TraversalWriter<L> {
    underlying: L,
    buffer: Vec<u8>,
    write_error: Option<CoreError>,
    key: StoreKey,
    datastore: Arc<dyn Datastore>,
    config: StoreConfig,
    records: usize,
}

impl<L: LinkLoader> TraversalWriter<L> {
    pub(crate) fn new(
        underlying: L,
        key: StoreKey,
        datastore: Arc<dyn Datastore>,
        config: StoreConfig,
    ) -> Self {
        Self {
            underlying,
            buffer: Vec::new(),
            write_error: None,
            key,
            datastore,
            config,
            records: 0,
        }
    }

    /// Loads `link` through the underlying loader and records the attempt.
    ///
    /// The underlying result is returned unchanged, even when recording it
    /// fails; the failure surfaces on the next load and on commit.
    ///
    /// A link whose path has an empty segment or a segment containing `/`
    /// cannot be recorded without losing its path. Such a load still
    /// returns the underlying result, but it makes the recording failure
    /// sticky: every later load of this traversal fails without reaching
    /// the underlying loader, and the traversal is never stored. The same
    /// happens when a frame exceeds `max_frame_size` or the log exceeds
    /// `max_log_size`.
    pub fn load(&mut self, ctx: &LinkContext, link: &Link) -> LoadResult {
        if let Some(err) = &self.write_error {
            trace!(%link, "load refused after recording failure");
            return Err(Box::new(err.clone()));
        }

        let result = self.underlying.load(ctx, link);
        let load_error = result.as_ref().err().map(ToString::to_string);
        let record = TraversedLink::new(*link, ctx.link_path.clone(), load_error);

        match self.append(&record) {
            Ok(()) => {
                self.records += 1;
                trace!(%link, path = %ctx.link_path, failed = record.load_error().is_some(), "recorded load");
            }
            Err(err) => {
                warn!(%link, path = %ctx.link_path, error = %err, "recording failed; traversal will not be stored");
                self.write_error = Some(err);
            }
        }
        result
    }

    fn append(&mut self, record: &TraversedLink) -> CoreResult<()> {
        let mark = self.buffer.len();
        encode_traversed_link(&mut self.buffer, record, self.config.max_frame_size)?;
        if let Some(cap) = self.config.max_log_size {
            if self.buffer.len() > cap {
                let attempted = self.buffer.len();
                self.buffer.truncate(mark);
                return Err(CoreError::record_encoding(format!(
                    "record log of {attempted} bytes exceeds limit of {cap}"
                )));
            }
        }
        Ok(())
    }

    /// Persists the recorded log under this traversal's key.
    ///
    /// Committing a traversal that loaded nothing stores an empty log.
    ///
    /// # Errors
    ///
    /// Returns the sticky recording error if one occurred, in which case the
    /// datastore is not written. Otherwise returns any datastore error.
    pub fn commit(self) -> CoreResult<()> {
        if let Some(err) = self.write_error {
            debug!(key = %self.key, error = %err, "commit refused");
            return Err(err);
        }
        self.datastore.put(self.key.as_bytes(), &self.buffer)?;
        debug!(
            key = %self.key,
            records = self.records,
            bytes = self.buffer.len(),
            "committed traversal"
        );
        Ok(())
    }
}

impl<L> TraversalWriter<L> {
    /// The key this traversal will be stored under.
    #[must_use]
    pub fn key(&self) -> &StoreKey {
        &self.key
    }

    /// Number of loads recorded so far.
    #[must_use]
    pub fn records_written(&self) -> usize {
        self.records
    }

    /// Size of the log buffered so far.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        self.buffer.len()
    }

    /// The sticky recording error, if one has occurred.
    #[must_use]
    pub fn encoding_error(&self) -> Option<&CoreError> {
        self.write_error.as_ref()
    }
}

impl<L: LinkLoader> LinkLoader for TraversalWriter<L> {
    fn load(&mut self, ctx: &LinkContext, link: &Link) -> LoadResult {
        TraversalWriter::load(self, ctx, link)
    }
}

impl<L> fmt::Debug for TraversalWriter<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraversalWriter")
            .field("key", &self.key)
            .field("records", &self.records)
            .field("encoded_len", &self.buffer.len())
            .field("write_error", &self.write_error)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DAG_CBOR_CODEC;
    use crate::loader::{loader_fn, BlockReader, LoadError};
    use crate::types::Path;
    use crate::LinkIterator;
    use cid::Cid;
    use multihash::Multihash;
    use selstore_codec::Value;
    use selstore_storage::InMemoryDatastore;
    use sha2::{Digest, Sha256};
    use std::io::Cursor;

    fn link_of(data: &[u8]) -> Link {
        let hash = Multihash::<64>::wrap(0x12, &Sha256::digest(data)).unwrap();
        Link::new(Cid::new_v1(DAG_CBOR_CODEC, hash))
    }

    fn writer_with<L: LinkLoader>(
        loader: L,
        config: StoreConfig,
    ) -> (TraversalWriter<L>, Arc<InMemoryDatastore>) {
        let ds = Arc::new(InMemoryDatastore::new());
        let root = link_of(b"root");
        let key = StoreKey::derive(root.cid(), &Value::empty_map()).unwrap();
        (TraversalWriter::new(loader, key, ds.clone(), config), ds)
    }

    fn ok_loader() -> impl FnMut(&LinkContext, &Link) -> LoadResult {
        loader_fn(|_ctx: &LinkContext, link: &Link| {
            Ok(Box::new(Cursor::new(link.cid().to_bytes())) as BlockReader)
        })
    }

    #[test]
    fn records_successes_and_failures_in_order() {
        let missing = link_of(b"missing");
        let loader = loader_fn(move |_ctx: &LinkContext, link: &Link| {
            if *link == missing {
                Err(LoadError::from("block not found"))
            } else {
                Ok(Box::new(Cursor::new(Vec::new())) as BlockReader)
            }
        });
        let (mut writer, ds) = writer_with(loader, StoreConfig::default());

        let a = link_of(b"a");
        assert!(writer.load(&LinkContext::new(Path::root()), &a).is_ok());
        let err = writer
            .load(&LinkContext::new(Path::parse("x/0")), &missing)
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "block not found");
        assert_eq!(writer.records_written(), 2);
        assert!(writer.encoding_error().is_none());

        let key = writer.key().clone();
        writer.commit().unwrap();

        let stored = ds.get(key.as_bytes()).unwrap();
        let links = LinkIterator::new(stored).collect_links().unwrap();
        assert_eq!(
            links,
            vec![
                TraversedLink::loaded(a, Path::root()),
                TraversedLink::failed(missing, Path::parse("x/0"), "block not found"),
            ]
        );
    }

    #[test]
    fn empty_traversal_commits_empty_log() {
        let (writer, ds) = writer_with(ok_loader(), StoreConfig::default());
        let key = writer.key().clone();
        writer.commit().unwrap();
        assert_eq!(ds.get(key.as_bytes()).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn recording_failure_is_sticky() {
        let mut calls = 0usize;
        let loader = loader_fn(|_ctx: &LinkContext, _link: &Link| {
            calls += 1;
            Ok(Box::new(Cursor::new(Vec::new())) as BlockReader)
        });
        let (mut writer, ds) = writer_with(loader, StoreConfig::default());
        let link = link_of(b"a");

        // The first load itself succeeds; only its record is lost.
        let bad_path = LinkContext::new(Path::root().join("a/b"));
        assert!(writer.load(&bad_path, &link).is_ok());
        let sticky = writer.encoding_error().cloned().unwrap();

        let err = writer
            .load(&LinkContext::new(Path::root()), &link)
            .err()
            .unwrap();
        assert_eq!(err.to_string(), sticky.to_string());
        assert_eq!(writer.records_written(), 0);

        let key = writer.key().clone();
        let commit_err = writer.commit().unwrap_err();
        assert_eq!(commit_err.to_string(), sticky.to_string());
        assert!(!ds.has(key.as_bytes()).unwrap());
        assert_eq!(calls, 1);
    }

    #[test]
    fn empty_path_segment_stops_recording() {
        let (mut writer, ds) = writer_with(ok_loader(), StoreConfig::default());
        let ok = LinkContext::new(Path::parse("a"));
        let empty_key = LinkContext::new(Path::parse("a").join(""));

        assert!(writer.load(&ok, &link_of(b"a")).is_ok());
        assert!(writer.load(&empty_key, &link_of(b"b")).is_ok());
        assert!(matches!(
            writer.encoding_error(),
            Some(CoreError::RecordEncoding { .. })
        ));
        assert!(writer.load(&ok, &link_of(b"c")).is_err());
        assert_eq!(writer.records_written(), 1);

        assert!(writer.commit().is_err());
        assert!(ds.is_empty());
    }

    #[test]
    fn log_size_cap_triggers_sticky_error() {
        let config = StoreConfig::default().max_log_size(60);
        let (mut writer, ds) = writer_with(ok_loader(), config);
        let ctx = LinkContext::new(Path::root());

        assert!(writer.load(&ctx, &link_of(b"a")).is_ok());
        let within = writer.encoded_len();
        assert!(writer.encoding_error().is_none());

        assert!(writer.load(&ctx, &link_of(b"b")).is_ok());
        assert!(matches!(
            writer.encoding_error(),
            Some(CoreError::RecordEncoding { .. })
        ));
        assert_eq!(writer.encoded_len(), within);

        let key = writer.key().clone();
        assert!(writer.commit().is_err());
        assert!(ds.is_empty());
        assert!(!ds.has(key.as_bytes()).unwrap());
    }

    #[test]
    fn writer_is_itself_a_loader() {
        fn drive(loader: &mut impl LinkLoader, link: &Link) -> bool {
            loader.load(&LinkContext::default(), link).is_ok()
        }
        let (mut writer, _ds) = writer_with(ok_loader(), StoreConfig::default());
        assert!(drive(&mut writer, &link_of(b"a")));
        assert_eq!(writer.records_written(), 1);
    }
}
