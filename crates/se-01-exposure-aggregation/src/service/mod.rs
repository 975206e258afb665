//! Service layer: orchestration.

mod aggregator_service;

pub use aggregator_service::ExposureAggregatorService;
