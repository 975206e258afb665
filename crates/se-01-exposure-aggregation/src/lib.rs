//! # SE-01 Exposure Aggregation
//!
//! Turns an era's validator exposures into the aggregates the staking
//! dashboard shows, and answers per-era exposure checks for the
//! fast-unstake scanner.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure computation, no I/O
//!   - `aggregate`: total stake, distinct nominators, minimum active bond,
//!     the queried account's own stake
//!   - `reward_cutoff`: oversubscription boundary per validator
//!   - `process_era`: fast-unstake exposure verdict for one era
//!   - `OffloadWorkerConfig`: limits with validation
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `ExposureAggregatorApi`: Driving port (synchronous computations)
//!   - `AggregationRequestApi`: Driving port (request over the bus)
//!
//! - **Service Layer** (`service/`): `ExposureAggregatorService`
//!
//! - **Handler Layer** (`handler/`): `TaskHandler` validates requests
//!
//! - **Adapters Layer** (`adapters/`):
//!   - `OffloadWorker`: bus subscriber running computations off the caller's task
//!   - `AggregationRequester`: caller-side client with a reply timeout
//!
//! ## Invariants
//!
//! - `total_staked` equals the sum of every validator's `total`
//! - A nominator backing N validators is counted once
//! - Balances are summed in planck; display conversion happens once, at the end
//!
//! ## Usage Example
//!
//! ```ignore
//! use se_01_exposure_aggregation::{
//!     AggregationRequester, AggregationRequestApi, ExposureAggregatorService, OffloadWorker,
//! };
//! use shared_bus::InMemoryOffloadBus;
//! use std::sync::Arc;
//!
//! let bus = Arc::new(InMemoryOffloadBus::new());
//! let _worker = OffloadWorker::new(bus.clone(), ExposureAggregatorService::new(), Default::default())?
//!     .spawn();
//!
//! let requester = AggregationRequester::new(bus, std::time::Duration::from_secs(30));
//! let result = requester.request_aggregate(payload).await?;
//! println!("min active bond: {}", result.min_active_bond);
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod handler;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports for convenience
pub use adapters::{AggregationRequester, OffloadWorker};
pub use domain::{
    aggregate, initialise_exposures, is_exposed, process_era, reward_cutoff, AggregationParams,
    OffloadWorkerConfig, RewardCutoff,
};
pub use error::AggregationError;
pub use handler::TaskHandler;
pub use metrics::{WorkerStats, WorkerStatsSnapshot};
pub use ports::{AggregationRequestApi, ExposureAggregatorApi};
pub use service::ExposureAggregatorService;
