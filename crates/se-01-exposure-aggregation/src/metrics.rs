//! Worker counters
//!
//! Per-instance atomic counters for tests and health checks. Every record
//! call also feeds the process-wide Prometheus metrics in
//! `staking-telemetry`.

use shared_types::TaskKind;
use staking_telemetry::{AGGREGATIONS, NOMINATOR_ENTRIES};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one `OffloadWorker`.
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Requests taken off the bus
    pub requests_received: AtomicU64,
    /// Requests rejected by the handler
    pub requests_rejected: AtomicU64,
    /// Computations that produced a reply
    pub computations_completed: AtomicU64,
    /// Computations that failed (no reply posted)
    pub computations_failed: AtomicU64,
}

impl WorkerStats {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request taken off the bus
    pub fn record_received(&self) {
        self.requests_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a request the handler refused
    pub fn record_rejected(&self, task: TaskKind) {
        self.requests_rejected.fetch_add(1, Ordering::Relaxed);
        AGGREGATIONS.with_label_values(&[task.as_str(), "rejected"]).inc();
    }

    /// Record a completed computation over `entries` nominator sub-entries
    pub fn record_completed(&self, task: TaskKind, entries: usize) {
        self.computations_completed.fetch_add(1, Ordering::Relaxed);
        AGGREGATIONS.with_label_values(&[task.as_str(), "ok"]).inc();
        NOMINATOR_ENTRIES
            .with_label_values(&[task.as_str()])
            .inc_by(entries as f64);
    }

    /// Record a failed computation
    pub fn record_failed(&self, task: TaskKind) {
        self.computations_failed.fetch_add(1, Ordering::Relaxed);
        AGGREGATIONS.with_label_values(&[task.as_str(), "failed"]).inc();
    }

    /// Get current counter values
    pub fn snapshot(&self) -> WorkerStatsSnapshot {
        WorkerStatsSnapshot {
            requests_received: self.requests_received.load(Ordering::Relaxed),
            requests_rejected: self.requests_rejected.load(Ordering::Relaxed),
            computations_completed: self.computations_completed.load(Ordering::Relaxed),
            computations_failed: self.computations_failed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of `WorkerStats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStatsSnapshot {
    pub requests_received: u64,
    pub requests_rejected: u64,
    pub computations_completed: u64,
    pub computations_failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let stats = WorkerStats::new();
        stats.record_received();
        stats.record_received();
        stats.record_completed(TaskKind::InitialiseExposures, 40);
        stats.record_rejected(TaskKind::ProcessFastUnstakeEra);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.requests_received, 2);
        assert_eq!(snapshot.computations_completed, 1);
        assert_eq!(snapshot.requests_rejected, 1);
        assert_eq!(snapshot.computations_failed, 0);
    }
}
