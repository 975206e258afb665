//! Test doubles for the scanner's ports and for the worker on the other
//! side of the offload bus.
//!
//! Enable with the `test-utils` feature flag.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_bus::{EventFilter, EventPublisher, EventTopic, InMemoryOffloadBus, OffloadEvent};
use shared_types::ipc::{
    FastUnstakeEraProcessedPayload, ProcessFastUnstakeEraPayload, SessionToken, TaskRequest,
    TaskResult,
};
use shared_types::{
    Address, EraIndex, ExposureEntry, ExposureRecord, ExposureSnapshot, NetworkId,
    NominatorStake, OffloadEnvelope, Planck, SnapshotError,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::ports::{ExposureSnapshotReader, QueueWatcher};

/// Snapshot reader serving fixed exposures per era.
///
/// Eras without configured exposures return an empty snapshot.
#[derive(Default)]
pub struct StaticSnapshotReader {
    eras: HashMap<EraIndex, Vec<ExposureEntry>>,
    unavailable: HashSet<EraIndex>,
    fetched: Mutex<Vec<EraIndex>>,
}

impl StaticSnapshotReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `entries` for `era`.
    pub fn with_era(mut self, era: EraIndex, entries: Vec<ExposureEntry>) -> Self {
        self.eras.insert(era, entries);
        self
    }

    /// Make `nominator` back a validator in `era`.
    pub fn with_nomination(self, era: EraIndex, nominator: &str) -> Self {
        let entry = ExposureEntry::new(
            "validator",
            ExposureRecord {
                total: Planck::from(200u64),
                own: Planck::from(100u64),
                others: vec![NominatorStake::new(nominator, 100u64)],
            },
        );
        self.with_era(era, vec![entry])
    }

    /// Fail reads for `era`.
    pub fn with_unavailable_era(mut self, era: EraIndex) -> Self {
        self.unavailable.insert(era);
        self
    }

    /// Eras read so far, in order.
    pub fn fetched(&self) -> Vec<EraIndex> {
        self.fetched.lock().clone()
    }
}

#[async_trait]
impl ExposureSnapshotReader for StaticSnapshotReader {
    async fn era_exposures(
        &self,
        _network: &NetworkId,
        era: EraIndex,
    ) -> Result<ExposureSnapshot, SnapshotError> {
        self.fetched.lock().push(era);
        if self.unavailable.contains(&era) {
            return Err(SnapshotError::EraUnavailable { era });
        }
        let entries = self.eras.get(&era).cloned().unwrap_or_default();
        Ok(ExposureSnapshot::new(era, entries))
    }
}

/// Queue watcher recording every call.
#[derive(Default)]
pub struct RecordingQueueWatcher {
    calls: Mutex<Vec<(NetworkId, Address)>>,
}

impl RecordingQueueWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accounts watched so far.
    pub fn calls(&self) -> Vec<(NetworkId, Address)> {
        self.calls.lock().clone()
    }
}

impl QueueWatcher for RecordingQueueWatcher {
    fn watch_queue(&self, network: &NetworkId, account: &Address) {
        self.calls.lock().push((network.clone(), account.clone()));
    }
}

/// Stand-in for the exposure worker with scriptable misbehaviour.
///
/// Answers fast-unstake era requests by checking whether `who` appears in
/// the submitted exposures.
#[derive(Default)]
pub struct ScriptedWorker {
    drops: HashMap<EraIndex, usize>,
    silent: bool,
    stale_first: bool,
    requested: Arc<Mutex<Vec<EraIndex>>>,
}

impl ScriptedWorker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swallow the first `times` requests for `era`.
    pub fn dropping(mut self, era: EraIndex, times: usize) -> Self {
        self.drops.insert(era, times);
        self
    }

    /// Never answer.
    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    /// Before each real answer, post an exposed verdict from another session.
    pub fn with_stale_replies(mut self) -> Self {
        self.stale_first = true;
        self
    }

    /// Eras requested so far, including swallowed ones.
    pub fn requested(&self) -> Arc<Mutex<Vec<EraIndex>>> {
        self.requested.clone()
    }

    /// Subscribe now and answer in a background task.
    pub fn spawn(mut self, bus: Arc<InMemoryOffloadBus>) -> JoinHandle<()> {
        let mut requests = bus.subscribe(EventFilter::topics(vec![EventTopic::Requests]));
        tokio::spawn(async move {
            while let Some(event) = requests.recv().await {
                let OffloadEvent::Request(request) = event else {
                    continue;
                };
                let TaskRequest::ProcessFastUnstakeEra(payload) = request.payload else {
                    continue;
                };
                self.requested.lock().push(payload.current_era);

                if self.silent {
                    continue;
                }
                if let Some(left) = self.drops.get_mut(&payload.current_era) {
                    if *left > 0 {
                        *left -= 1;
                        continue;
                    }
                }

                if self.stale_first {
                    let mut stale = answer(&payload);
                    stale.exposed = true;
                    stale.session = SessionToken(payload.session.0.wrapping_add(1_000));
                    publish(&bus, request.correlation_id, stale).await;
                }
                publish(&bus, request.correlation_id, answer(&payload)).await;
            }
        })
    }
}

fn answer(payload: &ProcessFastUnstakeEraPayload) -> FastUnstakeEraProcessedPayload {
    let exposed = payload.exposures.iter().any(|entry| {
        entry.validator == payload.who
            || entry.exposure.others.iter().any(|n| n.who == payload.who)
    });
    FastUnstakeEraProcessedPayload {
        current_era: payload.current_era,
        exposed,
        who: payload.who.clone(),
        network: payload.network.clone(),
        session: payload.session,
    }
}

async fn publish(
    bus: &InMemoryOffloadBus,
    correlation_id: uuid::Uuid,
    payload: FastUnstakeEraProcessedPayload,
) {
    let reply = OffloadEnvelope::reply(correlation_id, TaskResult::ProcessFastUnstakeEra(payload));
    bus.publish(OffloadEvent::Reply(reply)).await;
}
