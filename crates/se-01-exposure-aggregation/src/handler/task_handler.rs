//! Task Handler for the offload worker
//!
//! Validates incoming requests before any computation is scheduled:
//! - Reject envelopes from a newer protocol version
//! - Reject snapshots larger than `max_exposures`
//! - Reject display scales above `MAX_UNITS`

use shared_types::{OffloadEnvelope, OffloadRequest, TaskRequest, MAX_UNITS};

use crate::domain::OffloadWorkerConfig;
use crate::error::AggregationError;

/// Request validator for the offload worker
#[derive(Debug, Clone, Default)]
pub struct TaskHandler {
    config: OffloadWorkerConfig,
}

impl TaskHandler {
    /// Create a handler with the given limits
    pub fn new(config: OffloadWorkerConfig) -> Self {
        Self { config }
    }

    /// Active limits
    pub fn config(&self) -> &OffloadWorkerConfig {
        &self.config
    }

    /// Validate an incoming request
    pub fn validate(&self, request: &OffloadRequest) -> Result<(), AggregationError> {
        // Rule 1: Only versions we understand
        if request.version > OffloadEnvelope::<TaskRequest>::CURRENT_VERSION {
            return Err(AggregationError::UnsupportedVersion {
                version: request.version,
            });
        }

        // Rule 2: Bounded snapshot size
        let count = request.payload.exposure_count();
        if count > self.config.max_exposures {
            return Err(AggregationError::TooManyExposures {
                count,
                max: self.config.max_exposures,
            });
        }

        // Rule 3: Display scale in range
        if let TaskRequest::InitialiseExposures(payload) = &request.payload {
            if payload.units > MAX_UNITS {
                return Err(AggregationError::InvalidUnits(
                    shared_types::AmountError::UnitsOutOfRange {
                        units: payload.units,
                        max: MAX_UNITS,
                    },
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{
        Address, ExposureEntry, ExposureRecord, InitialiseExposuresPayload, NetworkId,
        ProcessFastUnstakeEraPayload, SessionToken,
    };

    fn era_request(validators: usize) -> OffloadRequest {
        OffloadEnvelope::request(TaskRequest::ProcessFastUnstakeEra(
            ProcessFastUnstakeEraPayload {
                current_era: 10,
                who: Address::new("alice"),
                network: NetworkId::new("polkadot"),
                session: SessionToken(1),
                exposures: (0..validators)
                    .map(|i| ExposureEntry::new(format!("v{i}").as_str(), ExposureRecord::default()))
                    .collect(),
            },
        ))
    }

    #[test]
    fn test_accepts_request_within_limits() {
        let handler = TaskHandler::new(OffloadWorkerConfig::default().with_max_exposures(5));
        assert!(handler.validate(&era_request(5)).is_ok());
    }

    #[test]
    fn test_rejects_oversized_snapshot() {
        let handler = TaskHandler::new(OffloadWorkerConfig::default().with_max_exposures(5));
        let err = handler.validate(&era_request(6)).unwrap_err();
        assert!(matches!(
            err,
            AggregationError::TooManyExposures { count: 6, max: 5 }
        ));
    }

    #[test]
    fn test_rejects_future_version() {
        let handler = TaskHandler::default();
        let mut request = era_request(1);
        request.version = 99;
        assert!(matches!(
            handler.validate(&request),
            Err(AggregationError::UnsupportedVersion { version: 99 })
        ));
    }

    #[test]
    fn test_rejects_units_out_of_range() {
        let handler = TaskHandler::default();
        let request = OffloadEnvelope::request(TaskRequest::InitialiseExposures(
            InitialiseExposuresPayload {
                active_account: None,
                units: MAX_UNITS + 1,
                exposures: vec![],
                max_nominator_rewarded_per_validator: 64,
            },
        ));
        assert!(matches!(
            handler.validate(&request),
            Err(AggregationError::InvalidUnits(_))
        ));
    }
}
