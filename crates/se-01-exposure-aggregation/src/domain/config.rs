//! Worker configuration and validation
//!
//! # Example
//!
//! ```ignore
//! use se_01_exposure_aggregation::domain::OffloadWorkerConfig;
//!
//! let config = OffloadWorkerConfig::default().with_max_exposures(2_000);
//! config.validate()?;
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::AggregationError;

/// Hard upper bound on `max_exposures`.
pub const MAX_EXPOSURES_LIMIT: usize = 100_000;

/// Offload worker configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffloadWorkerConfig {
    /// Largest snapshot (validator count) the worker accepts.
    pub max_exposures: usize,
    /// How long `AggregationRequester` waits for a reply.
    pub request_timeout: Duration,
}

impl Default for OffloadWorkerConfig {
    fn default() -> Self {
        Self {
            max_exposures: 10_000,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl OffloadWorkerConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), AggregationError> {
        if self.max_exposures == 0 {
            return Err(AggregationError::InvalidConfig(
                "max_exposures cannot be 0".to_string(),
            ));
        }

        if self.max_exposures > MAX_EXPOSURES_LIMIT {
            return Err(AggregationError::InvalidConfig(format!(
                "max_exposures must be at most {MAX_EXPOSURES_LIMIT}"
            )));
        }

        if self.request_timeout.is_zero() {
            return Err(AggregationError::InvalidConfig(
                "request_timeout cannot be 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Builder-style method to set the snapshot size limit
    pub fn with_max_exposures(mut self, max: usize) -> Self {
        self.max_exposures = max;
        self
    }

    /// Builder-style method to set the requester timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
