//! # Outbound Ports (Driven Ports)
//!
//! Dependencies the scanner requires the host application to implement.

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{Address, EraIndex, ExposureSnapshot, NetworkId, SnapshotError, StoreError};
use std::collections::HashMap;

/// Reads validator exposures for an era from the chain.
///
/// Production: a chain client adapter in the host application
/// Testing: `test_utils::StaticSnapshotReader`
#[async_trait]
pub trait ExposureSnapshotReader: Send + Sync {
    /// All validator exposures for `era` on `network`.
    async fn era_exposures(
        &self,
        network: &NetworkId,
        era: EraIndex,
    ) -> Result<ExposureSnapshot, SnapshotError>;
}

/// Abstract interface for the persistent key-value store holding scan
/// records.
///
/// Implementations synchronise internally; all methods take `&self`.
///
/// Production: `adapters::FileBackedKVStore`
/// Testing: `InMemoryKVStore` (below)
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// Put a single key-value pair.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Delete a key. Deleting a missing key is not an error.
    fn delete(&self, key: &[u8]) -> Result<(), StoreError>;
}

/// Starts watching the withdrawal queue once an account is clear to
/// fast-unstake.
pub trait QueueWatcher: Send + Sync {
    /// Begin watching `account`'s position in the fast-unstake queue.
    fn watch_queue(&self, network: &NetworkId, account: &Address);
}

/// In-memory key-value store for unit tests.
#[derive(Default)]
pub struct InMemoryKVStore {
    data: RwLock<HashMap<Vec<u8>, Vec<u8>>>,
}

impl InMemoryKVStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl KeyValueStore for InMemoryKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.data.read().get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.data.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        self.data.write().remove(key);
        Ok(())
    }
}
