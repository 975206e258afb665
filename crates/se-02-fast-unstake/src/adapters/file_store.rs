//! # File-Backed Scan Store
//!
//! Keeps scan records in a single JSON file so that a scan can resume after
//! a restart.
//!
//! - Writes go to `<file>.tmp`, are synced, then renamed over the file.
//! - `<file>.lock` is held exclusively (via `fs2`) for the store's lifetime;
//!   a second process opening the same file fails instead of racing.

use fs2::FileExt;
use parking_lot::RwLock;
use shared_types::StoreError;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::ports::KeyValueStore;

/// Persistent key-value store backed by one JSON file.
///
/// Keys and values must be UTF-8.
pub struct FileBackedKVStore {
    data: RwLock<BTreeMap<String, String>>,
    path: PathBuf,
    /// Held open to keep the lock
    _lock: File,
}

impl FileBackedKVStore {
    /// Open (or create) the store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let lock_path = path.with_extension("lock");
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(io_error)?;
        lock.try_lock_exclusive().map_err(|_| {
            StoreError::Io(format!("scan store already in use ({})", lock_path.display()))
        })?;

        let data = Self::load_from_file(&path);
        info!(path = %path.display(), keys = data.len(), "Opened scan store");

        Ok(Self {
            data: RwLock::new(data),
            path,
            _lock: lock,
        })
    }

    /// Location of the data file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_file(path: &Path) -> BTreeMap<String, String> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(_) => return BTreeMap::new(),
        };
        match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable scan store, starting empty");
                BTreeMap::new()
            }
        }
    }

    fn save_to_file(&self, data: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(data).map_err(|e| StoreError::Io(e.to_string()))?;

        let temp_path = self.path.with_extension("tmp");
        let mut file = File::create(&temp_path).map_err(io_error)?;
        file.write_all(&bytes).map_err(io_error)?;
        file.sync_all().map_err(io_error)?;

        fs::rename(&temp_path, &self.path).map_err(io_error)
    }
}

impl KeyValueStore for FileBackedKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let key = utf8(key)?;
        Ok(self.data.read().get(key).map(|v| v.clone().into_bytes()))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let key = utf8(key)?.to_string();
        let value = utf8(value)?.to_string();
        let mut data = self.data.write();
        data.insert(key, value);
        self.save_to_file(&data)
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        let key = utf8(key)?;
        let mut data = self.data.write();
        if data.remove(key).is_none() {
            return Ok(());
        }
        self.save_to_file(&data)
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, StoreError> {
    std::str::from_utf8(bytes).map_err(|e| StoreError::Io(format!("non UTF-8 data: {e}")))
}

fn io_error(e: std::io::Error) -> StoreError {
    StoreError::Io(e.to_string())
}
