//! Ports layer: trait definitions.

pub mod inbound;

pub use inbound::{AggregationRequestApi, ExposureAggregatorApi};
