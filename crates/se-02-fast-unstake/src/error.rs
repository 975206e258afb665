//! Error types for the fast-unstake scanner.

use shared_types::{EraIndex, SnapshotError, StoreError};
use thiserror::Error;

/// Errors surfaced by the scan driver.
///
/// A malformed cache entry is not an error: it is discarded and the scan
/// starts cold.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The key-value store failed.
    #[error("Scan cache store error: {0}")]
    Store(#[from] StoreError),

    /// The exposure snapshot for an era could not be read.
    #[error("Exposure snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// A cache record could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The worker never answered for an era.
    #[error("No reply for era {era} after {attempts} attempts")]
    ReplyTimeout { era: EraIndex, attempts: u8 },

    /// The offload bus went away mid-scan.
    #[error("Offload channel closed")]
    ChannelClosed,

    /// Scanner configuration rejected.
    #[error("Invalid scanner configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias for scanner operations.
pub type ScanResult<T> = Result<T, ScanError>;
