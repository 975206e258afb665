//! # SE-02 Fast Unstake
//!
//! Decides whether an account that nominates but earns nothing this era
//! may leave staking through the fast-unstake queue: it must not have been
//! exposed in any of the last `1 + lookback` eras.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure logic, no I/O
//!   - `ScanCacheRecord` and the `validate` pipeline for stored progress
//!   - `ScanMachine`: the scan state machine, one era at a time
//!   - `ScanPreconditions`: when a scan may start
//!   - `ScannerConfig`: timeouts and attempts with validation
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `FastUnstakeScanApi`: Driving port
//!   - `ExposureSnapshotReader`, `KeyValueStore`, `QueueWatcher`: Driven ports
//!
//! - **Service Layer** (`service/`):
//!   - `ScanCacheStore`: load/validate/save/discard per account
//!   - `FastUnstakeScanner`: drives the machine over the offload channel
//!
//! - **Adapters Layer** (`adapters/`): `FileBackedKVStore`
//!
//! ## Invariants
//!
//! - Eras are requested strictly newest first, one in flight at a time
//! - A stored record is resumed from only if its eras are contiguous and
//!   inside the lookback window; anything else is discarded
//! - Replies from an older session, or for another account, network or
//!   era, never change state
//! - A full window in the cache decides the outcome without any request
//!
//! ## Usage Example
//!
//! ```ignore
//! use se_02_fast_unstake::{FastUnstakeScanner, FileBackedKVStore, ScannerConfig};
//! use std::sync::Arc;
//!
//! let store = Arc::new(FileBackedKVStore::open("data/fast_unstake.json")?);
//! let (mut scanner, handle) =
//!     FastUnstakeScanner::new(reader, store, bus, watcher, ScannerConfig::from_env())?;
//!
//! // elsewhere: handle.account_changed();
//! let report = scanner.run(&preconditions).await?;
//! if report.is_clear() {
//!     println!("eligible for fast unstake");
//! }
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-exports for convenience
pub use adapters::FileBackedKVStore;
pub use domain::{
    cache_key, validate, CacheValidation, InvalidReason, ScanAction, ScanCacheRecord, ScanMachine,
    ScanPreconditions, ScanState, ScanTarget, ScannerConfig, Transition,
};
pub use error::{ScanError, ScanResult};
pub use ports::{
    ExposureSnapshotReader, FastUnstakeScanApi, InMemoryKVStore, KeyValueStore, QueueWatcher,
    ScanReport,
};
pub use service::{ControlEvent, FastUnstakeScanner, ScanCacheStore, ScanHandle};
