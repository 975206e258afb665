//! Scanner configuration and validation
//!
//! # Example
//!
//! ```ignore
//! use se_02_fast_unstake::domain::ScannerConfig;
//! use std::time::Duration;
//!
//! let config = ScannerConfig::from_env().with_era_reply_timeout(Duration::from_secs(10));
//! config.validate()?;
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::error::ScanError;

/// Default key suffix for scan records.
pub const DEFAULT_CACHE_KEY_SUFFIX: &str = "fast_unstake";

/// Fast-unstake scanner configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// How long to wait for the worker's reply for one era.
    pub era_reply_timeout: Duration,
    /// Submissions per era before the scan stalls.
    pub max_era_attempts: u8,
    /// Middle part of the storage key.
    pub cache_key_suffix: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            era_reply_timeout: Duration::from_secs(30),
            max_era_attempts: 3,
            cache_key_suffix: DEFAULT_CACHE_KEY_SUFFIX.to_string(),
        }
    }
}

impl ScannerConfig {
    /// Defaults overridden from the environment.
    ///
    /// # Environment Variables
    ///
    /// - `SE_ERA_REPLY_TIMEOUT_MS`: per-era reply timeout (default: 30000)
    /// - `SE_MAX_ERA_ATTEMPTS`: submissions per era (default: 3)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            era_reply_timeout: lookup("SE_ERA_REPLY_TIMEOUT_MS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.era_reply_timeout),
            max_era_attempts: lookup("SE_MAX_ERA_ATTEMPTS")
                .and_then(|v| v.trim().parse::<u8>().ok())
                .unwrap_or(defaults.max_era_attempts),
            cache_key_suffix: defaults.cache_key_suffix,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.era_reply_timeout.is_zero() {
            return Err(ScanError::InvalidConfig(
                "era_reply_timeout cannot be 0".to_string(),
            ));
        }

        if self.max_era_attempts == 0 {
            return Err(ScanError::InvalidConfig(
                "max_era_attempts cannot be 0".to_string(),
            ));
        }

        if self.cache_key_suffix.is_empty() {
            return Err(ScanError::InvalidConfig(
                "cache_key_suffix cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Builder-style method to set the per-era reply timeout
    pub fn with_era_reply_timeout(mut self, timeout: Duration) -> Self {
        self.era_reply_timeout = timeout;
        self
    }

    /// Builder-style method to set the attempts per era
    pub fn with_max_era_attempts(mut self, attempts: u8) -> Self {
        self.max_era_attempts = attempts;
        self
    }

    /// Builder-style method to set the storage key suffix
    pub fn with_cache_key_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.cache_key_suffix = suffix.into();
        self
    }
}
