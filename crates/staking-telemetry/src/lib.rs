//! # Staking Telemetry
//!
//! Structured logging and Prometheus metrics for the staking exposure engine.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use staking_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_telemetry(config).expect("Failed to init telemetry");
//!
//!     // Logs and metrics are now being collected
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SE_SERVICE_NAME` | `staking-exposure` | Service name in logs |
//! | `SE_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `SE_JSON_LOGS` | `false` | JSON output (defaults on inside containers) |
//! | `SE_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `SE_NETWORK` | `polkadot` | Network tag on startup logs |

mod config;
mod logging;
pub mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{
    encode_metrics, register_metrics, MetricsHandle, AGGREGATIONS, AGGREGATION_DURATION,
    CACHE_DISCARDS, ERAS_CHECKED, ERA_RESUBMISSIONS, NOMINATOR_ENTRIES, SCANS_FINISHED,
    STALE_REPLIES_DROPPED,
};
pub use tracing_setup::TracingGuard;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracerInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Register metrics and install the global tracing subscriber.
///
/// Returns a guard that should be held for the lifetime of the process.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics()?;
    let tracing = tracing_setup::init_tracing(&config)?;

    Ok(TelemetryGuard {
        _tracing: tracing,
        _metrics: metrics,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _tracing: TracingGuard,
    _metrics: MetricsHandle,
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
