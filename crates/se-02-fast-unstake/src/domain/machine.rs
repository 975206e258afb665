//! Fast-unstake scan state machine
//!
//! Pure transitions; the driver in `service::scanner` performs the I/O each
//! transition asks for.
//!
//! State Machine:
//! ```text
//! [IDLE] ──begin──→ [RESOLVING] ──complete cache──→ [EXPOSED] / [CLEAR]
//!                        │
//!                        ├── cached isExposed ──→ [EXPOSED]
//!                        ├── cursor <= 0 ──────→ [CLEAR]
//!                        ↓
//!               [SCANNING {era}] ──exposed──→ [EXPOSED]
//!                  │      ↑   │
//!                  │      │   ├── window full / cursor <= 0 ──→ [CLEAR]
//!                  │      │   │
//!                  │      └───┴── not exposed: era - 1
//!                  │
//!                  └── no reply after max attempts ──→ [STALLED {era}]
//!
//! any non-terminal ──cancel──→ [CANCELLED]
//! ```
//!
//! Every `begin` and `cancel` mints a new `SessionToken`. Replies carrying
//! any other token, or naming another account, network or era, are stale
//! and change nothing.

use serde::{Deserialize, Serialize};
use shared_types::ipc::{FastUnstakeEraProcessedPayload, SessionToken};
use shared_types::EraIndex;
use std::fmt;

use super::cache::ScanCacheRecord;
use super::session::ScanTarget;

/// Scan state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanState {
    /// Not started.
    #[default]
    Idle,
    /// Loading and validating the cache.
    Resolving,
    /// One era in flight.
    Scanning { era: EraIndex },
    /// The account was exposed in a lookback era.
    Exposed,
    /// No exposure across the whole window.
    Clear,
    /// Superseded by an account or network change, or teardown.
    Cancelled,
    /// The worker stopped answering for `era`.
    Stalled { era: EraIndex },
}

impl ScanState {
    /// Whether no further transition happens without a new `begin`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ScanState::Exposed | ScanState::Clear | ScanState::Cancelled | ScanState::Stalled { .. }
        )
    }

    /// Short name, used as a metric label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanState::Idle => "idle",
            ScanState::Resolving => "resolving",
            ScanState::Scanning { .. } => "scanning",
            ScanState::Exposed => "exposed",
            ScanState::Clear => "clear",
            ScanState::Cancelled => "cancelled",
            ScanState::Stalled { .. } => "stalled",
        }
    }
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanState::Scanning { era } => write!(f, "scanning era {era}"),
            ScanState::Stalled { era } => write!(f, "stalled at era {era}"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// What the driver should do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanAction {
    /// Fetch the snapshot for this era and submit it.
    RequestEra(EraIndex),
    /// Keep waiting for the in-flight reply.
    Wait,
    /// The scan ended in this state.
    Stop(ScanState),
}

/// Result of feeding an event to the machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    /// Record to write to the cache before acting.
    pub persist: Option<ScanCacheRecord>,
    /// Next step.
    pub action: ScanAction,
}

impl Transition {
    fn wait() -> Self {
        Self {
            persist: None,
            action: ScanAction::Wait,
        }
    }
}

/// Scan state machine for one account at a time.
#[derive(Debug, Default)]
pub struct ScanMachine {
    state: ScanState,
    target: Option<ScanTarget>,
    token: SessionToken,
    record: ScanCacheRecord,
    attempts: u8,
}

impl ScanMachine {
    /// Create an idle machine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Token of the live session.
    pub fn token(&self) -> SessionToken {
        self.token
    }

    /// Target of the live session.
    pub fn target(&self) -> Option<&ScanTarget> {
        self.target.as_ref()
    }

    /// Progress so far.
    pub fn record(&self) -> &ScanCacheRecord {
        &self.record
    }

    /// Submissions made for the in-flight era.
    pub fn attempts(&self) -> u8 {
        self.attempts
    }

    /// Start a session for `target`, invalidating any previous one.
    pub fn begin(&mut self, target: ScanTarget) -> SessionToken {
        self.token = self.token.next();
        self.target = Some(target);
        self.record = ScanCacheRecord::new();
        self.attempts = 0;
        self.state = ScanState::Resolving;
        self.token
    }

    /// Decide where to start from the (already validated) cache.
    pub fn resolve(&mut self, cached: Option<ScanCacheRecord>) -> Transition {
        let Some(target) = self.target.as_ref() else {
            return Transition::wait();
        };
        if self.state != ScanState::Resolving {
            return Transition::wait();
        }
        let (current_era, lookback) = (target.current_era, target.lookback_eras);

        let cursor = match cached {
            Some(record) => {
                let complete = record.is_complete(lookback);
                let exposed = record.is_exposed;
                let cursor = record.oldest().and_then(|oldest| oldest.checked_sub(1));
                self.record = record;
                if complete {
                    return self.finish(if exposed { ScanState::Exposed } else { ScanState::Clear });
                }
                if exposed {
                    return self.finish(ScanState::Exposed);
                }
                cursor
            }
            None => Some(current_era),
        };

        match cursor {
            Some(era) if era > 0 => self.request(era),
            _ => self.finish(ScanState::Clear),
        }
    }

    /// Whether `reply` answers the era currently in flight for the live session.
    pub fn is_current(&self, reply: &FastUnstakeEraProcessedPayload) -> bool {
        let (ScanState::Scanning { era }, Some(target)) = (self.state, self.target.as_ref()) else {
            return false;
        };
        reply.session == self.token
            && reply.current_era == era
            && reply.who == target.account
            && reply.network == target.network
    }

    /// Apply the worker's verdict for the in-flight era.
    ///
    /// Stale replies yield `ScanAction::Wait` and change nothing.
    pub fn apply_verdict(&mut self, reply: &FastUnstakeEraProcessedPayload) -> Transition {
        if !self.is_current(reply) {
            return Transition::wait();
        }
        let Some(lookback) = self.target.as_ref().map(|t| t.lookback_eras) else {
            return Transition::wait();
        };
        let era = reply.current_era;

        let fresh = self.record.record_era(era);
        let flipped = reply.exposed && !self.record.is_exposed;
        if reply.exposed {
            self.record.is_exposed = true;
        }
        let persist = (fresh || flipped).then(|| self.record.clone());

        let mut transition = if reply.exposed {
            self.finish(ScanState::Exposed)
        } else if self.record.is_complete(lookback) {
            self.finish(ScanState::Clear)
        } else {
            match era.checked_sub(1) {
                Some(next) if next > 0 => self.request(next),
                _ => self.finish(ScanState::Clear),
            }
        };
        transition.persist = persist;
        transition
    }

    /// The in-flight era got no reply in time.
    ///
    /// Resubmits the same era until `max_attempts` submissions were made,
    /// then stalls.
    pub fn era_timed_out(&mut self, max_attempts: u8) -> Transition {
        let ScanState::Scanning { era } = self.state else {
            return Transition::wait();
        };
        if self.attempts >= max_attempts {
            return self.finish(ScanState::Stalled { era });
        }
        self.attempts = self.attempts.saturating_add(1);
        Transition {
            persist: None,
            action: ScanAction::RequestEra(era),
        }
    }

    /// Cancel the live session. Late replies for it become stale.
    pub fn cancel(&mut self) -> ScanState {
        if !self.state.is_terminal() && self.state != ScanState::Idle {
            self.state = ScanState::Cancelled;
        }
        self.token = self.token.next();
        self.state
    }

    fn request(&mut self, era: EraIndex) -> Transition {
        self.state = ScanState::Scanning { era };
        self.attempts = 1;
        Transition {
            persist: None,
            action: ScanAction::RequestEra(era),
        }
    }

    fn finish(&mut self, state: ScanState) -> Transition {
        self.state = state;
        Transition {
            persist: None,
            action: ScanAction::Stop(state),
        }
    }
}
