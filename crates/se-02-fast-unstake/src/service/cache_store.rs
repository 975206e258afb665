//! Scan cache persistence on top of a `KeyValueStore`.

use shared_types::{Address, EraIndex, NetworkId};
use staking_telemetry::{log_event, metric_inc, CACHE_DISCARDS};
use std::sync::Arc;

use crate::domain::{cache_key, validate, CacheValidation, ScanCacheRecord};
use crate::error::ScanError;
use crate::ports::KeyValueStore;

/// Loads, validates and saves scan records.
///
/// One writer per account: only the scan driver for an account writes its
/// record.
pub struct ScanCacheStore<S: KeyValueStore> {
    store: Arc<S>,
    suffix: String,
}

impl<S: KeyValueStore> ScanCacheStore<S> {
    /// Wrap `store`, keying records with `suffix`.
    pub fn new(store: Arc<S>, suffix: impl Into<String>) -> Self {
        Self {
            store,
            suffix: suffix.into(),
        }
    }

    /// Storage key for an account.
    pub fn key(&self, network: &NetworkId, account: &Address) -> String {
        cache_key(network, account, &self.suffix)
    }

    /// Load the account's record if it is safe to resume from.
    ///
    /// An invalid record is deleted and reported as absent.
    pub fn load(
        &self,
        network: &NetworkId,
        account: &Address,
        current_era: EraIndex,
        lookback: EraIndex,
    ) -> Result<Option<ScanCacheRecord>, ScanError> {
        let key = self.key(network, account);
        let Some(raw) = self.store.get(key.as_bytes())? else {
            return Ok(None);
        };

        match validate(&raw, current_era, lookback) {
            CacheValidation::Valid(record) => {
                log_event!(
                    debug,
                    "scan-cache",
                    "Loaded scan cache",
                    key = %key,
                    checked = record.len(),
                    is_exposed = record.is_exposed
                );
                Ok(Some(record))
            }
            CacheValidation::Invalid(reason) => {
                metric_inc!(CACHE_DISCARDS, &[reason.label()]);
                log_event!(warn, "scan-cache", "Discarding invalid scan cache", key = %key, reason = %reason);
                self.store.delete(key.as_bytes())?;
                Ok(None)
            }
        }
    }

    /// Persist the account's record.
    pub fn save(
        &self,
        network: &NetworkId,
        account: &Address,
        record: &ScanCacheRecord,
    ) -> Result<(), ScanError> {
        let key = self.key(network, account);
        let bytes =
            serde_json::to_vec(record).map_err(|e| ScanError::Serialization(e.to_string()))?;
        self.store.put(key.as_bytes(), &bytes)?;
        Ok(())
    }

    /// Delete the account's record.
    pub fn discard(&self, network: &NetworkId, account: &Address) -> Result<(), ScanError> {
        let key = self.key(network, account);
        self.store.delete(key.as_bytes())?;
        Ok(())
    }
}
