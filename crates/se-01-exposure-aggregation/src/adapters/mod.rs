//! Adapters Layer
//!
//! Connects the aggregation service to the offload bus.
//!
//! ## Adapters
//!
//! - `OffloadWorker` - Serves requests from the bus on blocking threads
//! - `AggregationRequester` - Submits `initialise_exposures` and awaits the reply

pub mod requester;
pub mod worker;

pub use requester::AggregationRequester;
pub use worker::OffloadWorker;
