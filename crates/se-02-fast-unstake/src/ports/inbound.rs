//! # Inbound Ports (Driving Ports)
//!
//! The API the scanner offers to the host application.

use async_trait::async_trait;

use crate::domain::{ScanPreconditions, ScanState};
use crate::error::ScanError;

/// How a scan ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    /// Final state: `Idle` if preconditions were unmet, otherwise terminal.
    pub state: ScanState,
    /// Eras known to be checked when the scan ended, newest first.
    pub checked_eras: Vec<shared_types::EraIndex>,
    /// Eras whose verdict was applied during this run.
    pub eras_applied: u32,
    /// Replies dropped as stale during this run.
    pub stale_replies: u32,
}

impl ScanReport {
    /// Whether the account may fast-unstake.
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.state == ScanState::Clear
    }
}

/// Primary API for fast-unstake eligibility.
#[async_trait]
pub trait FastUnstakeScanApi: Send {
    /// Run one scan to a terminal state.
    ///
    /// Returns a report in state `Idle` without doing anything if
    /// `preconditions` are unmet. Returns `ScanError::ReplyTimeout` if the
    /// worker stops answering.
    async fn scan(&mut self, preconditions: &ScanPreconditions) -> Result<ScanReport, ScanError>;
}
