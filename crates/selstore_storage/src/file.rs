//! Directory-backed datastore for persistent storage.

use crate::datastore::Datastore;
use crate::error::{StorageError, StorageResult};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Extension of committed value files.
const VALUE_EXT: &str = "rec";

/// A datastore that keeps one file per key in a directory.
///
/// File names are the hex SHA-256 of the key, so arbitrary binary keys of
/// any length map to valid, fixed-length names. Each file starts with the
/// full key (`u32` little-endian length, then the bytes) so a lookup can
/// confirm it read the right entry.
///
/// # Durability
///
/// Values are written to a temporary file in the same directory and then
/// renamed into place: a reader sees either the old value or the new one.
/// With [`FileDatastore::sync_writes`] enabled the temporary file is
/// `fsync`ed before the rename.
///
/// # Example
///
/// ```no_run
/// use selstore_storage::{Datastore, FileDatastore};
/// use std::path::Path;
///
/// let store = FileDatastore::open(Path::new("traversals")).unwrap();
/// store.put(b"key", b"persistent data").unwrap();
/// ```
#[derive(Debug)]
pub struct FileDatastore {
    dir: PathBuf,
    sync_writes: bool,
    tmp_counter: AtomicU64,
}

impl FileDatastore {
    /// Opens a datastore rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: &Path) -> StorageResult<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            sync_writes: true,
            tmp_counter: AtomicU64::new(0),
        })
    }

    /// Sets whether each `put` is fsynced before it becomes visible.
    #[must_use]
    pub fn sync_writes(mut self, value: bool) -> Self {
        self.sync_writes = value;
        self
    }

    /// Returns the directory holding the value files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn value_path(&self, key: &[u8]) -> PathBuf {
        let name = hex::encode(Sha256::digest(key));
        self.dir.join(name).with_extension(VALUE_EXT)
    }

    fn temp_path(&self, key: &[u8]) -> PathBuf {
        let seq = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let name = format!(
            "{}.tmp-{}-{seq}",
            hex::encode(Sha256::digest(key)),
            std::process::id()
        );
        self.dir.join(name)
    }

    fn encode_file(key: &[u8], value: &[u8]) -> StorageResult<Vec<u8>> {
        let key_len = u32::try_from(key.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "key longer than 4 GiB"))?;
        let mut contents = Vec::with_capacity(4 + key.len() + value.len());
        contents.extend_from_slice(&key_len.to_le_bytes());
        contents.extend_from_slice(key);
        contents.extend_from_slice(value);
        Ok(contents)
    }

    fn decode_file(key: &[u8], mut contents: Vec<u8>) -> StorageResult<Vec<u8>> {
        let header: [u8; 4] = contents
            .get(..4)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| StorageError::Corrupted("value file shorter than header".into()))?;
        let key_len = u32::from_le_bytes(header) as usize;
        let stored_key = contents
            .get(4..4 + key_len)
            .ok_or_else(|| StorageError::Corrupted("value file truncated inside key".into()))?;
        if stored_key != key {
            return Err(StorageError::Corrupted(format!(
                "value file for {} holds a different key",
                hex::encode(key)
            )));
        }
        Ok(contents.split_off(4 + key_len))
    }
}

impl Datastore for FileDatastore {
    fn put(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        let contents = Self::encode_file(key, value)?;
        let tmp = self.temp_path(key);

        let written = (|| -> io::Result<()> {
            let mut file = File::create(&tmp)?;
            file.write_all(&contents)?;
            if self.sync_writes {
                file.sync_all()?;
            }
            fs::rename(&tmp, self.value_path(key))
        })();

        if let Err(err) = written {
            // best effort; the rename never happened so nothing is visible
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        tracing::trace!(key = %hex::encode(key), bytes = value.len(), "stored value");
        Ok(())
    }

    fn get(&self, key: &[u8]) -> StorageResult<Vec<u8>> {
        match fs::read(self.value_path(key)) {
            Ok(contents) => Self::decode_file(key, contents),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(StorageError::not_found(key)),
            Err(err) => Err(err.into()),
        }
    }

    fn has(&self, key: &[u8]) -> StorageResult<bool> {
        match fs::metadata(self.value_path(key)) {
            Ok(meta) => Ok(meta.is_file()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn delete(&self, key: &[u8]) -> StorageResult<bool> {
        match fs::remove_file(self.value_path(key)) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}
