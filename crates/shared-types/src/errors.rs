//! # Error Types
//!
//! Defines error types used across crates.

use thiserror::Error;

use crate::entities::EraIndex;

/// Errors from amount parsing and conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// Not a valid non-negative integer.
    #[error("Invalid planck amount: {0}")]
    InvalidPlanck(String),

    /// Not a valid decimal string.
    #[error("Invalid decimal amount: {0}")]
    InvalidDecimal(String),

    /// Decimal scale is larger than supported.
    #[error("Units out of range: {units} > {max}")]
    UnitsOutOfRange { units: u8, max: u8 },
}

/// Errors from the persistent key-value store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// I/O error during read/write.
    #[error("Store I/O error: {0}")]
    Io(String),

    /// Stored bytes could not be read back.
    #[error("Store corruption: {0}")]
    Corruption(String),
}

/// Errors from the chain snapshot reader.
#[derive(Debug, Clone, Error)]
pub enum SnapshotError {
    /// The era has no exposure data (not yet started or pruned).
    #[error("No exposures available for era {era}")]
    EraUnavailable { era: EraIndex },

    /// The chain client failed.
    #[error("Snapshot reader error: {0}")]
    Reader(String),
}
