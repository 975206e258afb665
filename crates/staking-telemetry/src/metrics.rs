//! Prometheus metrics for the staking exposure engine.
//!
//! All metrics follow the naming convention: `se_<component>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, CounterVec, Encoder, HistogramOpts, HistogramVec, IntCounter,
    IntCounterVec, Opts, Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // WORKER METRICS
    // =========================================================================

    /// Computations completed by the offload worker
    pub static ref AGGREGATIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("se_worker_computations_total", "Computations completed by the offload worker"),
        &["task", "outcome"]  // outcome: ok/failed/rejected
    ).expect("metric creation failed");

    /// Computation duration
    pub static ref AGGREGATION_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "se_worker_computation_duration_seconds",
            "Time spent computing one task"
        ).buckets(exponential_buckets(0.0001, 2.0, 16).expect("bucket layout")),
        &["task"]
    ).expect("metric creation failed");

    /// Nominator sub-entries processed
    pub static ref NOMINATOR_ENTRIES: CounterVec = CounterVec::new(
        Opts::new("se_worker_nominator_entries_total", "Nominator sub-entries processed"),
        &["task"]
    ).expect("metric creation failed");

    // =========================================================================
    // SCANNER METRICS
    // =========================================================================

    /// Eras checked by the fast-unstake scanner
    pub static ref ERAS_CHECKED: IntCounterVec = IntCounterVec::new(
        Opts::new("se_scanner_eras_checked_total", "Eras checked by the fast-unstake scanner"),
        &["exposed"]  // exposed: true/false
    ).expect("metric creation failed");

    /// Scans that reached a terminal state
    pub static ref SCANS_FINISHED: IntCounterVec = IntCounterVec::new(
        Opts::new("se_scanner_scans_finished_total", "Scans that reached a terminal state"),
        &["outcome"]  // outcome: exposed/clear/cancelled/stalled
    ).expect("metric creation failed");

    /// Replies dropped because their session was no longer live
    pub static ref STALE_REPLIES_DROPPED: IntCounter = IntCounter::new(
        "se_scanner_stale_replies_dropped_total",
        "Replies dropped because their session was no longer live"
    ).expect("metric creation failed");

    /// Era requests re-submitted after a reply timeout
    pub static ref ERA_RESUBMISSIONS: IntCounter = IntCounter::new(
        "se_scanner_era_resubmissions_total",
        "Era requests re-submitted after a reply timeout"
    ).expect("metric creation failed");

    // =========================================================================
    // CACHE METRICS
    // =========================================================================

    /// Persisted scan caches discarded on load
    pub static ref CACHE_DISCARDS: IntCounterVec = IntCounterVec::new(
        Opts::new("se_cache_discards_total", "Persisted scan caches discarded on load"),
        &["reason"]  // reason: malformed/not_an_integer/empty/gap
    ).expect("metric creation failed");
}

/// Handle proving the metrics are registered.
pub struct MetricsHandle {
    registered: usize,
}

impl MetricsHandle {
    /// Number of collectors in the registry.
    pub fn registered(&self) -> usize {
        self.registered
    }
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; already registered collectors are skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Worker
        Box::new(AGGREGATIONS.clone()),
        Box::new(AGGREGATION_DURATION.clone()),
        Box::new(NOMINATOR_ENTRIES.clone()),
        // Scanner
        Box::new(ERAS_CHECKED.clone()),
        Box::new(SCANS_FINISHED.clone()),
        Box::new(STALE_REPLIES_DROPPED.clone()),
        Box::new(ERA_RESUBMISSIONS.clone()),
        // Cache
        Box::new(CACHE_DISCARDS.clone()),
    ];
    let registered = metrics.len();

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle { registered })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: prometheus::Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the labelled histogram.
    pub fn new(histogram: &HistogramVec, label: &str) -> Self {
        Self {
            histogram: histogram.with_label_values(&[label]),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}

/// Start timing for a labelled histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr, $label:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram, $label)
    };
}
