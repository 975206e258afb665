//! # Shared Types Crate
//!
//! This crate contains the staking entities, amount value types, offload
//! message payloads and the `OffloadEnvelope<T>` wrapper shared by the
//! aggregation worker and the fast-unstake scanner.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-crate types are defined here.
//! - **Scaled Integers Until Display**: Balances are `Planck`; conversion to
//!   `DisplayAmount` happens only at presentation boundaries.
//! - **Explicit Correlation**: Every offload request and reply carries a
//!   `correlation_id` in its envelope.

pub mod amount;
pub mod entities;
pub mod envelope;
pub mod errors;
pub mod ipc;

pub use amount::{DisplayAmount, Planck, MAX_UNITS};
pub use entities::*;
pub use envelope::OffloadEnvelope;
pub use errors::*;
pub use ipc::*;

// Re-export U256 from primitive-types for callers building raw balances.
pub use primitive_types::U256;
