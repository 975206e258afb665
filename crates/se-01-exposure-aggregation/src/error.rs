//! Error types for the exposure aggregation crate

use shared_types::{AmountError, TaskKind};
use thiserror::Error;

/// Errors that can occur while aggregating or serving offload requests
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("Invalid units: {0}")]
    InvalidUnits(#[from] AmountError),

    #[error("Too many exposures: {count} > {max}")]
    TooManyExposures { count: usize, max: usize },

    #[error("Unsupported envelope version: {version}")]
    UnsupportedVersion { version: u16 },

    #[error("Worker computation did not complete: {0}")]
    WorkerJoin(String),

    #[error("Offload bus error: {0}")]
    Bus(String),

    #[error("No reply for {task} within {waited_ms}ms")]
    NoReply { task: TaskKind, waited_ms: u64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
