//! Fast-unstake scan driver
//!
//! Owns the `ScanMachine` and performs the I/O it asks for: cache reads and
//! writes, snapshot fetches, submissions to the offload channel. While an
//! era is in flight the driver waits on three things at once:
//!
//! ```text
//!            ┌──────────── control (account/network change, teardown) ──→ Cancelled
//!  await ────┼──────────── reply stream ──→ machine.apply_verdict
//!            └──────────── per-era deadline ──→ resubmit, or Stalled
//! ```
//!
//! Requests go out strictly one era at a time, newest first, and the cache
//! is written in that same order.

use async_trait::async_trait;
use shared_bus::{OffloadChannel, OffloadEvent, Subscription};
use shared_types::ipc::{ProcessFastUnstakeEraPayload, TaskKind, TaskRequest, TaskResult};
use shared_types::EraIndex;
use staking_telemetry::{
    log_era_event, log_event, metric_inc, ERAS_CHECKED, ERA_RESUBMISSIONS, SCANS_FINISHED,
    STALE_REPLIES_DROPPED,
};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

use crate::domain::{
    ScanAction, ScanMachine, ScanPreconditions, ScanState, ScanTarget, ScannerConfig, Transition,
};
use crate::error::{ScanError, ScanResult};
use crate::ports::{
    ExposureSnapshotReader, FastUnstakeScanApi, KeyValueStore, QueueWatcher, ScanReport,
};
use crate::service::cache_store::ScanCacheStore;

const COMPONENT: &str = "fast-unstake-scanner";

/// Capacity of the control channel.
const CONTROL_CAPACITY: usize = 16;

/// Events that cancel the running scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// The owning account changed.
    AccountChanged,
    /// The network changed.
    NetworkChanged,
    /// The component monitoring the scan went away.
    Teardown,
}

impl ControlEvent {
    fn as_str(&self) -> &'static str {
        match self {
            ControlEvent::AccountChanged => "account_changed",
            ControlEvent::NetworkChanged => "network_changed",
            ControlEvent::Teardown => "teardown",
        }
    }
}

/// Cloneable handle for steering a scanner from elsewhere.
#[derive(Clone)]
pub struct ScanHandle {
    control: mpsc::Sender<ControlEvent>,
    state: watch::Receiver<ScanState>,
}

impl ScanHandle {
    /// The owning account changed; cancel the running scan.
    pub fn account_changed(&self) -> bool {
        self.send(ControlEvent::AccountChanged)
    }

    /// The network changed; cancel the running scan.
    pub fn network_changed(&self) -> bool {
        self.send(ControlEvent::NetworkChanged)
    }

    /// The monitoring component is going away; cancel the running scan.
    pub fn teardown(&self) -> bool {
        self.send(ControlEvent::Teardown)
    }

    /// Latest state.
    pub fn state(&self) -> ScanState {
        *self.state.borrow()
    }

    /// Watch state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<ScanState> {
        self.state.clone()
    }

    /// Returns `false` if the scanner is gone. A full queue already holds a
    /// cancellation, so that counts as delivered.
    fn send(&self, event: ControlEvent) -> bool {
        match self.control.try_send(event) {
            Ok(()) | Err(mpsc::error::TrySendError::Full(_)) => true,
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }
}

#[derive(Debug, Default)]
struct RunStats {
    eras_applied: u32,
    stale_replies: u32,
}

/// Drives fast-unstake scans for one account at a time.
pub struct FastUnstakeScanner<S: KeyValueStore> {
    reader: Arc<dyn ExposureSnapshotReader>,
    cache: ScanCacheStore<S>,
    channel: Arc<dyn OffloadChannel>,
    watcher: Arc<dyn QueueWatcher>,
    config: ScannerConfig,
    machine: ScanMachine,
    control: mpsc::Receiver<ControlEvent>,
    state: watch::Sender<ScanState>,
}

impl<S: KeyValueStore> FastUnstakeScanner<S> {
    /// Create a scanner and the handle that steers it.
    pub fn new(
        reader: Arc<dyn ExposureSnapshotReader>,
        store: Arc<S>,
        channel: Arc<dyn OffloadChannel>,
        watcher: Arc<dyn QueueWatcher>,
        config: ScannerConfig,
    ) -> ScanResult<(Self, ScanHandle)> {
        config.validate()?;
        let (control_tx, control_rx) = mpsc::channel(CONTROL_CAPACITY);
        let (state_tx, state_rx) = watch::channel(ScanState::Idle);

        let scanner = Self {
            reader,
            cache: ScanCacheStore::new(store, config.cache_key_suffix.clone()),
            channel,
            watcher,
            config,
            machine: ScanMachine::new(),
            control: control_rx,
            state: state_tx,
        };
        let handle = ScanHandle {
            control: control_tx,
            state: state_rx,
        };
        Ok((scanner, handle))
    }

    /// Current state.
    pub fn state(&self) -> ScanState {
        self.machine.state()
    }

    /// The cache this scanner reads and writes.
    pub fn cache(&self) -> &ScanCacheStore<S> {
        &self.cache
    }

    /// Run one scan to a terminal state.
    pub async fn run(&mut self, preconditions: &ScanPreconditions) -> ScanResult<ScanReport> {
        let Some(target) = preconditions.target() else {
            log_event!(debug, COMPONENT, "Scan preconditions unmet, staying idle");
            self.state.send_replace(ScanState::Idle);
            return Ok(ScanReport {
                state: ScanState::Idle,
                checked_eras: Vec::new(),
                eras_applied: 0,
                stale_replies: 0,
            });
        };

        // Subscribe before the first submission so no reply is missed
        let mut results = self.channel.results(TaskKind::ProcessFastUnstakeEra);
        let discarded = self.drain_control();
        let session = self.machine.begin(target.clone());
        self.publish_state();
        log_event!(
            info,
            COMPONENT,
            "Fast-unstake scan started",
            network = %target.network,
            account = %target.account,
            active_era = target.current_era,
            lookback = target.lookback_eras,
            session = %session,
            discarded_control = discarded
        );

        let cached = self.cache.load(
            &target.network,
            &target.account,
            target.current_era,
            target.lookback_eras,
        )?;
        let mut transition = self.machine.resolve(cached);
        let mut stats = RunStats::default();

        loop {
            if let Some(record) = transition.persist.take() {
                self.cache.save(&target.network, &target.account, &record)?;
            }

            let era = match transition.action {
                ScanAction::RequestEra(era) => era,
                ScanAction::Stop(state) => return self.finish(&target, state, stats),
                ScanAction::Wait => return self.finish(&target, self.machine.state(), stats),
            };

            let snapshot = tokio::select! {
                biased;
                event = next_control(&mut self.control) => {
                    transition = self.cancel(event);
                    continue;
                }
                snapshot = self.reader.era_exposures(&target.network, era) => snapshot?,
            };

            let request = TaskRequest::ProcessFastUnstakeEra(ProcessFastUnstakeEraPayload {
                current_era: era,
                who: target.account.clone(),
                network: target.network.clone(),
                session,
                exposures: snapshot.entries,
            });
            let correlation_id = self.channel.submit(request).await;
            self.publish_state();
            log_era_event!(
                debug,
                COMPONENT,
                "Era submitted",
                target.network,
                target.account,
                era,
                attempt = self.machine.attempts(),
                correlation_id = %correlation_id
            );

            transition = self.await_verdict(&target, era, &mut results, &mut stats).await?;
        }
    }

    /// Wait for the in-flight era's reply, a control event or the deadline.
    async fn await_verdict(
        &mut self,
        target: &ScanTarget,
        era: EraIndex,
        results: &mut Subscription,
        stats: &mut RunStats,
    ) -> ScanResult<Transition> {
        let deadline = Instant::now() + self.config.era_reply_timeout;

        loop {
            tokio::select! {
                biased;
                event = next_control(&mut self.control) => {
                    return Ok(self.cancel(event));
                }
                event = results.recv() => {
                    let Some(event) = event else {
                        return Err(ScanError::ChannelClosed);
                    };
                    let OffloadEvent::Reply(reply) = event else {
                        continue;
                    };
                    let TaskResult::ProcessFastUnstakeEra(verdict) = reply.payload else {
                        continue;
                    };

                    let transition = self.machine.apply_verdict(&verdict);
                    if transition.action == ScanAction::Wait {
                        stats.stale_replies += 1;
                        metric_inc!(STALE_REPLIES_DROPPED);
                        log_event!(
                            debug,
                            COMPONENT,
                            "Dropped stale reply",
                            reply_era = verdict.current_era,
                            reply_session = %verdict.session,
                            correlation_id = %reply.correlation_id
                        );
                        continue;
                    }

                    stats.eras_applied += 1;
                    let exposed = if verdict.exposed { "true" } else { "false" };
                    metric_inc!(ERAS_CHECKED, &[exposed]);
                    log_era_event!(
                        debug,
                        COMPONENT,
                        "Era checked",
                        target.network,
                        target.account,
                        era,
                        exposed = verdict.exposed
                    );
                    return Ok(transition);
                }
                () = tokio::time::sleep_until(deadline) => {
                    let transition = self.machine.era_timed_out(self.config.max_era_attempts);
                    if let ScanAction::RequestEra(_) = transition.action {
                        metric_inc!(ERA_RESUBMISSIONS);
                        log_era_event!(
                            warn,
                            COMPONENT,
                            "No reply in time, resubmitting era",
                            target.network,
                            target.account,
                            era,
                            attempt = self.machine.attempts()
                        );
                    }
                    return Ok(transition);
                }
            }
        }
    }

    /// Discard control events queued before the current session began.
    /// They targeted a scan that has already finished.
    fn drain_control(&mut self) -> usize {
        let mut discarded = 0;
        while let Ok(event) = self.control.try_recv() {
            log_event!(
                debug,
                COMPONENT,
                "Dropped control event from an earlier session",
                reason = event.as_str()
            );
            discarded += 1;
        }
        discarded
    }

    fn cancel(&mut self, event: ControlEvent) -> Transition {
        let state = self.machine.cancel();
        log_event!(info, COMPONENT, "Scan cancelled", reason = event.as_str());
        Transition {
            persist: None,
            action: ScanAction::Stop(state),
        }
    }

    fn finish(
        &mut self,
        target: &ScanTarget,
        state: ScanState,
        stats: RunStats,
    ) -> ScanResult<ScanReport> {
        self.publish_state();
        if state.is_terminal() {
            metric_inc!(SCANS_FINISHED, &[state.as_str()]);
        }
        log_event!(
            info,
            COMPONENT,
            "Fast-unstake scan finished",
            network = %target.network,
            account = %target.account,
            state = %state,
            eras_applied = stats.eras_applied,
            stale_replies = stats.stale_replies
        );

        match state {
            ScanState::Clear => self.watcher.watch_queue(&target.network, &target.account),
            ScanState::Stalled { era } => {
                return Err(ScanError::ReplyTimeout {
                    era,
                    attempts: self.machine.attempts(),
                });
            }
            _ => {}
        }

        Ok(ScanReport {
            state,
            checked_eras: self.machine.record().checked_eras.clone(),
            eras_applied: stats.eras_applied,
            stale_replies: stats.stale_replies,
        })
    }

    fn publish_state(&self) {
        self.state.send_replace(self.machine.state());
    }
}

#[async_trait]
impl<S: KeyValueStore> FastUnstakeScanApi for FastUnstakeScanner<S> {
    async fn scan(&mut self, preconditions: &ScanPreconditions) -> ScanResult<ScanReport> {
        self.run(preconditions).await
    }
}

/// Next control event; stays pending once every handle is dropped.
async fn next_control(control: &mut mpsc::Receiver<ControlEvent>) -> ControlEvent {
    match control.recv().await {
        Some(event) => event,
        None => std::future::pending().await,
    }
}
