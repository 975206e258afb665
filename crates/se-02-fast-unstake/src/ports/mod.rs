//! Ports layer: traits at the scanner's boundaries.

pub mod inbound;
pub mod outbound;

pub use inbound::{FastUnstakeScanApi, ScanReport};
pub use outbound::{ExposureSnapshotReader, InMemoryKVStore, KeyValueStore, QueueWatcher};
