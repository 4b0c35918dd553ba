//! Test fixtures and store helpers.
//!
//! Provides CIDs, a small linked tree with a scripted visit order, a loader
//! over in-memory blocks, and datastores that count or fail calls.

use cid::Cid;
use multihash::Multihash;
use parking_lot::Mutex;
use selstore_codec::{to_canonical_cbor, Value};
use selstore_core::{
    BlockReader, Link, LinkContext, LinkLoader, LoadResult, Path, SelectorStore, StoreConfig,
    TraversedLink, DAG_CBOR_CODEC,
};
use selstore_storage::{Datastore, FileDatastore, InMemoryDatastore, StorageError, StorageResult};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::{self, Cursor, Read};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Multicodec code for raw bytes.
pub const RAW_CODEC: u64 = 0x55;

/// Multihash code for sha2-256.
pub const SHA2_256: u64 = 0x12;

static BLOCK_SEQ: AtomicU64 = AtomicU64::new(0);

/// The CIDv1 of `data` under `codec`, hashed with sha2-256.
pub fn cid_for(codec: u64, data: &[u8]) -> Cid {
    let hash = Multihash::<64>::wrap(SHA2_256, &Sha256::digest(data))
        .expect("sha2-256 digest fits in a multihash");
    Cid::new_v1(codec, hash)
}

/// Produces `n` distinct CIDs, never repeating within a process.
pub fn generate_cids(n: usize) -> Vec<Cid> {
    (0..n)
        .map(|_| {
            let seq = BLOCK_SEQ.fetch_add(1, Ordering::Relaxed);
            cid_for(RAW_CODEC, format!("block data {seq}").as_bytes())
        })
        .collect()
}

/// A store with automatic cleanup.
pub struct TestStore {
    /// The store.
    pub store: SelectorStore,
    /// The backing datastore.
    pub datastore: Arc<dyn Datastore>,
    _temp_dir: Option<TempDir>,
}

impl TestStore {
    /// A store over an in-memory datastore.
    pub fn memory() -> Self {
        Self::memory_with_config(StoreConfig::default())
    }

    /// A store over an in-memory datastore with the given configuration.
    pub fn memory_with_config(config: StoreConfig) -> Self {
        let datastore: Arc<dyn Datastore> = Arc::new(InMemoryDatastore::new());
        Self {
            store: SelectorStore::with_config(Arc::clone(&datastore), config),
            datastore,
            _temp_dir: None,
        }
    }

    /// A store over a file datastore in a fresh temporary directory.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let datastore: Arc<dyn Datastore> = Arc::new(
            FileDatastore::open(&temp_dir.path().join("store"))
                .expect("Failed to open file datastore"),
        );
        Self {
            store: SelectorStore::new(Arc::clone(&datastore)),
            datastore,
            _temp_dir: Some(temp_dir),
        }
    }

    /// The datastore directory if file-based, `None` if in-memory.
    pub fn path(&self) -> Option<std::path::PathBuf> {
        self._temp_dir.as_ref().map(|d| d.path().join("store"))
    }
}

impl std::ops::Deref for TestStore {
    type Target = SelectorStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Runs a test with a store over an in-memory datastore.
pub fn with_temp_store<F, R>(f: F) -> R
where
    F: FnOnce(&SelectorStore) -> R,
{
    let test_store = TestStore::memory();
    f(&test_store.store)
}

/// Runs a test with a store over a temporary file datastore.
pub fn with_file_store<F, R>(f: F) -> R
where
    F: FnOnce(&SelectorStore, &std::path::Path) -> R,
{
    let test_store = TestStore::file();
    let path = test_store.path().expect("File store should have a path");
    f(&test_store.store, &path)
}

/// One step of a scripted traversal: a link and where it was found.
pub type VisitStep = (Link, Path);

/// A small linked tree.
///
/// ```text
/// root {plain, linkedString -> alpha, linkedMap -> map, linkedList -> list}
/// map  {foo, bar, nested: {alink -> alpha, nonlink}}
/// list [alpha, alpha, beta, alpha]
/// ```
#[derive(Debug, Clone)]
pub struct TestTree {
    /// Leaf block "alpha".
    pub leaf_alpha: Link,
    /// Leaf block "beta".
    pub leaf_beta: Link,
    /// The map node.
    pub middle_map: Link,
    /// The list node.
    pub middle_list: Link,
    /// The root node.
    pub root: Link,
    blocks: HashMap<Cid, Vec<u8>>,
}

fn link_value(link: &Link) -> Value {
    Value::text_map([("/", Value::Bytes(link.cid().to_bytes()))])
}

fn node_block(node: &Value) -> (Cid, Vec<u8>) {
    let bytes = to_canonical_cbor(node).expect("fixture nodes are shallow");
    (cid_for(DAG_CBOR_CODEC, &bytes), bytes)
}

impl TestTree {
    /// Builds the tree and its blocks.
    pub fn new() -> Self {
        let mut blocks = HashMap::new();

        let alpha = b"alpha".to_vec();
        let leaf_alpha = Link::new(cid_for(RAW_CODEC, &alpha));
        blocks.insert(*leaf_alpha.cid(), alpha);

        let beta = b"beta".to_vec();
        let leaf_beta = Link::new(cid_for(RAW_CODEC, &beta));
        blocks.insert(*leaf_beta.cid(), beta);

        let (map_cid, map_bytes) = node_block(&Value::text_map([
            ("foo", Value::Bool(true)),
            ("bar", Value::Bool(false)),
            (
                "nested",
                Value::text_map([
                    ("alink", link_value(&leaf_alpha)),
                    ("nonlink", Value::from("zoo")),
                ]),
            ),
        ]));
        blocks.insert(map_cid, map_bytes);

        let (list_cid, list_bytes) = node_block(&Value::Array(vec![
            link_value(&leaf_alpha),
            link_value(&leaf_alpha),
            link_value(&leaf_beta),
            link_value(&leaf_alpha),
        ]));
        blocks.insert(list_cid, list_bytes);

        let middle_map = Link::new(map_cid);
        let middle_list = Link::new(list_cid);
        let (root_cid, root_bytes) = node_block(&Value::text_map([
            ("plain", Value::from("olde string")),
            ("linkedString", link_value(&leaf_alpha)),
            ("linkedMap", link_value(&middle_map)),
            ("linkedList", link_value(&middle_list)),
        ]));
        blocks.insert(root_cid, root_bytes);

        Self {
            leaf_alpha,
            leaf_beta,
            middle_map,
            middle_list,
            root: Link::new(root_cid),
            blocks,
        }
    }

    /// The root CID.
    pub fn root_cid(&self) -> Cid {
        *self.root.cid()
    }

    /// All blocks keyed by CID.
    pub fn blocks(&self) -> &HashMap<Cid, Vec<u8>> {
        &self.blocks
    }

    /// A loader serving this tree's blocks.
    pub fn loader(&self) -> MemoryLoader {
        MemoryLoader::new(self.blocks.clone())
    }

    /// The loads a full recursive exploration makes, in order.
    pub fn explore_all_plan(&self) -> Vec<VisitStep> {
        [
            (self.root, ""),
            (self.middle_list, "linkedList"),
            (self.leaf_alpha, "linkedList/0"),
            (self.leaf_alpha, "linkedList/1"),
            (self.leaf_beta, "linkedList/2"),
            (self.leaf_alpha, "linkedList/3"),
            (self.middle_map, "linkedMap"),
            (self.leaf_alpha, "linkedMap/nested/alink"),
            (self.leaf_alpha, "linkedString"),
        ]
        .into_iter()
        .map(|(link, path)| (link, Path::parse(path)))
        .collect()
    }

    /// The single load that matching only the root makes.
    pub fn root_only_plan(&self) -> Vec<VisitStep> {
        vec![(self.root, Path::root())]
    }
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

/// The records a successful run of `plan` should produce.
pub fn expected_links(plan: &[VisitStep]) -> Vec<TraversedLink> {
    plan.iter()
        .map(|(link, path)| TraversedLink::loaded(*link, path.clone()))
        .collect()
}

/// Stands in for a traversal engine: loads each step of `plan` in order
/// through `loader` and reads every returned block to the end.
///
/// Returns the per-step outcome: block bytes, or the error text.
pub fn drive_traversal<L: LinkLoader + ?Sized>(
    loader: &mut L,
    plan: &[VisitStep],
) -> Vec<Result<Vec<u8>, String>> {
    plan.iter()
        .map(|(link, path)| {
            let mut reader = loader
                .load(&LinkContext::new(path.clone()), link)
                .map_err(|e| e.to_string())?;
            let mut bytes = Vec::new();
            reader
                .read_to_end(&mut bytes)
                .map_err(|e| e.to_string())?;
            Ok(bytes)
        })
        .collect()
}

/// A block was requested that the loader does not have.
#[derive(Debug, Clone, thiserror::Error)]
#[error("block not found: {0}")]
pub struct BlockNotFound(pub Cid);

/// A loader over an in-memory block map.
///
/// Clones share the call log, so a test can hand one clone to a writer and
/// inspect the calls through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    blocks: HashMap<Cid, Vec<u8>>,
    calls: Arc<Mutex<Vec<VisitStep>>>,
}

impl MemoryLoader {
    /// Creates a loader serving `blocks`.
    pub fn new(blocks: HashMap<Cid, Vec<u8>>) -> Self {
        Self {
            blocks,
            calls: Arc::default(),
        }
    }

    /// Removes a block so loading it fails with [`BlockNotFound`].
    pub fn without(mut self, cid: &Cid) -> Self {
        self.blocks.remove(cid);
        self
    }

    /// Every load so far, in order.
    pub fn calls(&self) -> Vec<VisitStep> {
        self.calls.lock().clone()
    }

    /// Number of loads so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl LinkLoader for MemoryLoader {
    fn load(&mut self, ctx: &LinkContext, link: &Link) -> LoadResult {
        self.calls.lock().push((*link, ctx.link_path.clone()));
        match self.blocks.get(link.cid()) {
            Some(bytes) => Ok(Box::new(Cursor::new(bytes.clone())) as BlockReader),
            None => Err(Box::new(BlockNotFound(*link.cid()))),
        }
    }
}

/// An in-memory datastore that counts calls.
#[derive(Debug, Default)]
pub struct CountingDatastore {
    inner: InMemoryDatastore,
    puts: AtomicUsize,
    gets: AtomicUsize,
    has_calls: AtomicUsize,
}

impl CountingDatastore {
    /// Creates an empty datastore.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `put` calls.
    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Number of `get` calls.
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Number of `has` calls.
    pub fn has_calls(&self) -> usize {
        self.has_calls.load(Ordering::SeqCst)
    }

    /// The wrapped datastore.
    pub fn inner(&self) -> &InMemoryDatastore {
        &self.inner
    }
}

impl Datastore for CountingDatastore {
    fn put(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(key, value)
    }

    fn get(&self, key: &[u8]) -> StorageResult<Vec<u8>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key)
    }

    fn has(&self, key: &[u8]) -> StorageResult<bool> {
        self.has_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.has(key)
    }

    fn delete(&self, key: &[u8]) -> StorageResult<bool> {
        self.inner.delete(key)
    }
}

/// An in-memory datastore whose operations can be made to fail.
#[derive(Debug, Default)]
pub struct FailingDatastore {
    inner: InMemoryDatastore,
    fail_puts: AtomicBool,
    fail_reads: AtomicBool,
}

impl FailingDatastore {
    /// A datastore where every operation fails.
    pub fn new() -> Self {
        let store = Self::default();
        store.set_fail_puts(true);
        store.set_fail_reads(true);
        store
    }

    /// A datastore where only `put` fails.
    pub fn failing_puts() -> Self {
        let store = Self::default();
        store.set_fail_puts(true);
        store
    }

    /// Toggles `put` failures.
    pub fn set_fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    /// Toggles `get`/`has` failures.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn injected() -> StorageError {
        StorageError::from(io::Error::other("injected failure"))
    }
}

impl Datastore for FailingDatastore {
    fn put(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(Self::injected());
        }
        self.inner.put(key, value)
    }

    fn get(&self, key: &[u8]) -> StorageResult<Vec<u8>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::injected());
        }
        self.inner.get(key)
    }

    fn has(&self, key: &[u8]) -> StorageResult<bool> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::injected());
        }
        self.inner.has(key)
    }

    fn delete(&self, key: &[u8]) -> StorageResult<bool> {
        self.inner.delete(key)
    }
}
