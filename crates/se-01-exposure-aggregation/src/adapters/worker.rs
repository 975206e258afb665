//! Offload worker
//!
//! Subscribes to requests on the offload bus, validates them, runs each
//! computation on a blocking thread and publishes the reply.
//!
//! Requests are served one at a time in arrival order. A computation that
//! fails or panics posts nothing; the caller's own timeout covers it.

use shared_bus::{
    EventFilter, EventPublisher, EventStream, EventTopic, InMemoryOffloadBus, OffloadEvent,
};
use shared_types::{OffloadEnvelope, OffloadReply, OffloadRequest, TaskRequest};
use staking_telemetry::{log_event, time_histogram, AGGREGATION_DURATION};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

use crate::domain::OffloadWorkerConfig;
use crate::error::AggregationError;
use crate::handler::TaskHandler;
use crate::metrics::WorkerStats;
use crate::ports::ExposureAggregatorApi;

const COMPONENT: &str = "offload-worker";

/// Long-lived worker serving offload requests.
pub struct OffloadWorker<A>
where
    A: ExposureAggregatorApi + 'static,
{
    /// Reference to the offload bus
    bus: Arc<InMemoryOffloadBus>,
    /// The aggregation service
    service: Arc<A>,
    /// Request validation
    handler: TaskHandler,
    /// Counters
    stats: Arc<WorkerStats>,
}

impl<A> OffloadWorker<A>
where
    A: ExposureAggregatorApi + 'static,
{
    /// Create a new worker.
    pub fn new(
        bus: Arc<InMemoryOffloadBus>,
        service: A,
        config: OffloadWorkerConfig,
    ) -> Result<Self, AggregationError> {
        config.validate()?;
        Ok(Self {
            bus,
            service: Arc::new(service),
            handler: TaskHandler::new(config),
            stats: Arc::new(WorkerStats::new()),
        })
    }

    /// Shared handle to this worker's counters.
    pub fn stats(&self) -> Arc<WorkerStats> {
        self.stats.clone()
    }

    /// Subscribe now and serve in a background task.
    ///
    /// Requests published after this returns are guaranteed to be seen.
    pub fn spawn(self) -> JoinHandle<()> {
        let stream = self.request_stream();
        tokio::spawn(Arc::new(self).serve(stream))
    }

    /// Start listening for requests.
    ///
    /// This should be spawned as a background task.
    pub async fn run(self: Arc<Self>) {
        let stream = self.request_stream();
        self.serve(stream).await;
    }

    fn request_stream(&self) -> EventStream {
        self.bus
            .event_stream(EventFilter::topics(vec![EventTopic::Requests]))
    }

    async fn serve(self: Arc<Self>, mut stream: EventStream) {
        log_event!(info, COMPONENT, "Offload worker started");

        while let Some(event) = stream.next().await {
            let OffloadEvent::Request(request) = event else {
                continue;
            };
            if let Some(reply) = self.handle_request(request).await {
                self.bus.publish(OffloadEvent::Reply(reply)).await;
            }
        }

        warn!("[OffloadWorker] Request stream ended, shutting down");
    }

    /// Validate and compute one request. `None` means nothing is posted.
    async fn handle_request(&self, request: OffloadRequest) -> Option<OffloadReply> {
        let task = request.payload.kind();
        let correlation_id = request.correlation_id;
        self.stats.record_received();

        if let Err(e) = self.handler.validate(&request) {
            log_event!(warn, COMPONENT, "Request rejected", task = %task, correlation_id = %correlation_id, error = %e);
            self.stats.record_rejected(task);
            return None;
        }

        let entries = nominator_entries(&request.payload);
        debug!(
            task = %task,
            correlation_id = %correlation_id,
            validators = request.payload.exposure_count(),
            nominator_entries = entries,
            "Computing"
        );

        let service = self.service.clone();
        let payload = request.payload;
        let timer = time_histogram!(AGGREGATION_DURATION, task.as_str());
        let outcome = tokio::task::spawn_blocking(move || service.execute(&payload)).await;
        drop(timer);

        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                log_event!(error, COMPONENT, "Computation failed", task = %task, correlation_id = %correlation_id, error = %e);
                self.stats.record_failed(task);
                return None;
            }
            Err(join) => {
                let e = AggregationError::WorkerJoin(join.to_string());
                log_event!(error, COMPONENT, "Computation aborted", task = %task, correlation_id = %correlation_id, error = %e);
                self.stats.record_failed(task);
                return None;
            }
        };

        self.stats.record_completed(task, entries);
        info!(task = %task, correlation_id = %correlation_id, "Computation completed");
        Some(OffloadEnvelope::reply(correlation_id, result))
    }
}

fn nominator_entries(task: &TaskRequest) -> usize {
    let exposures = match task {
        TaskRequest::InitialiseExposures(p) => &p.exposures,
        TaskRequest::ProcessFastUnstakeEra(p) => &p.exposures,
    };
    exposures.iter().map(|e| e.exposure.others.len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ExposureAggregatorService;
    use shared_bus::OffloadChannel;
    use shared_types::{
        Address, AggregateResult, EraExposureVerdict, EraIndex, ExposureEntry, ExposureRecord,
        ExposuresInitialisedPayload, FastUnstakeEraProcessedPayload, InitialiseExposuresPayload,
        NetworkId, NominatorStake, Planck, ProcessFastUnstakeEraPayload, SessionToken, TaskKind,
        TaskResult,
    };
    use std::time::Duration;
    use tokio::time::timeout;

    use crate::domain::RewardCutoff;

    fn exposures() -> Vec<ExposureEntry> {
        vec![
            ExposureEntry::new(
                "v1",
                ExposureRecord {
                    total: Planck::from(100u64),
                    own: Planck::from(50u64),
                    others: vec![
                        NominatorStake::new("alice", 30u64),
                        NominatorStake::new("bob", 20u64),
                    ],
                },
            ),
            ExposureEntry::new(
                "v2",
                ExposureRecord {
                    total: Planck::from(80u64),
                    own: Planck::from(70u64),
                    others: vec![NominatorStake::new("alice", 10u64)],
                },
            ),
        ]
    }

    fn era_task(era: EraIndex, who: &str) -> TaskRequest {
        TaskRequest::ProcessFastUnstakeEra(ProcessFastUnstakeEraPayload {
            current_era: era,
            who: Address::new(who),
            network: NetworkId::new("polkadot"),
            session: SessionToken(4),
            exposures: exposures(),
        })
    }

    async fn next_reply(sub: &mut shared_bus::Subscription) -> OffloadReply {
        match timeout(Duration::from_secs(2), sub.recv())
            .await
            .expect("timeout")
            .expect("bus closed")
        {
            OffloadEvent::Reply(reply) => reply,
            other => panic!("expected reply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_worker_answers_initialise_exposures() {
        let bus = Arc::new(InMemoryOffloadBus::new());
        let worker =
            OffloadWorker::new(bus.clone(), ExposureAggregatorService::new(), Default::default())
                .unwrap();
        let handle = worker.spawn();

        let mut results = bus.results(TaskKind::InitialiseExposures);
        let id = bus
            .submit(TaskRequest::InitialiseExposures(InitialiseExposuresPayload {
                active_account: Some(Address::new("alice")),
                units: 0,
                exposures: exposures(),
                max_nominator_rewarded_per_validator: 1,
            }))
            .await;

        let reply = next_reply(&mut results).await;
        assert!(reply.answers(id));
        let TaskResult::InitialiseExposures(payload) = reply.payload else {
            panic!("wrong task kind");
        };
        assert_eq!(payload.total_staked, Planck::from(180u64));
        assert_eq!(payload.total_active_nominators, 2);
        assert_eq!(payload.active_account_own_stake.len(), 2);
        assert_eq!(payload.min_active_bond.to_string(), "20");
        assert_eq!(payload.who, Some(Address::new("alice")));

        handle.abort();
    }

    #[tokio::test]
    async fn test_worker_echoes_fast_unstake_fields() {
        let bus = Arc::new(InMemoryOffloadBus::new());
        let worker =
            OffloadWorker::new(bus.clone(), ExposureAggregatorService::new(), Default::default())
                .unwrap();
        let stats = worker.stats();
        let handle = worker.spawn();

        let mut results = bus.results(TaskKind::ProcessFastUnstakeEra);
        let id = bus.submit(era_task(321, "bob")).await;

        let reply = next_reply(&mut results).await;
        assert_eq!(reply.correlation_id, id);
        let TaskResult::ProcessFastUnstakeEra(payload) = reply.payload else {
            panic!("wrong task kind");
        };
        assert_eq!(payload.current_era, 321);
        assert!(payload.exposed);
        assert_eq!(payload.who, Address::new("bob"));
        assert_eq!(payload.network, NetworkId::new("polkadot"));
        assert_eq!(payload.session, SessionToken(4));
        assert_eq!(stats.snapshot().computations_completed, 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_rejected_request_posts_nothing() {
        let bus = Arc::new(InMemoryOffloadBus::new());
        let config = OffloadWorkerConfig::default().with_max_exposures(1);
        let worker = OffloadWorker::new(bus.clone(), ExposureAggregatorService::new(), config)
            .unwrap();
        let stats = worker.stats();
        let handle = worker.spawn();

        let mut results = bus.results(TaskKind::ProcessFastUnstakeEra);
        bus.submit(era_task(5, "bob")).await;

        assert!(timeout(Duration::from_millis(100), results.recv())
            .await
            .is_err());
        assert_eq!(stats.snapshot().requests_rejected, 1);

        handle.abort();
    }

    /// Service whose aggregation panics, to exercise the join path.
    struct PanickingService;

    impl ExposureAggregatorApi for PanickingService {
        fn aggregate(
            &self,
            _: &[ExposureEntry],
            _: Option<&Address>,
            _: u8,
        ) -> Result<AggregateResult, AggregationError> {
            panic!("aggregation blew up")
        }

        fn reward_cutoff(&self, _: &[NominatorStake], _: u32) -> RewardCutoff {
            panic!("aggregation blew up")
        }

        fn process_era(&self, _: EraIndex, _: &[ExposureEntry], _: &Address) -> EraExposureVerdict {
            panic!("aggregation blew up")
        }

        fn initialise_exposures(
            &self,
            _: &InitialiseExposuresPayload,
        ) -> Result<ExposuresInitialisedPayload, AggregationError> {
            panic!("aggregation blew up")
        }

        fn process_fast_unstake_era(
            &self,
            _: &ProcessFastUnstakeEraPayload,
        ) -> FastUnstakeEraProcessedPayload {
            panic!("aggregation blew up")
        }
    }

    #[tokio::test]
    async fn test_panicking_computation_posts_nothing_and_worker_survives() {
        let bus = Arc::new(InMemoryOffloadBus::new());
        let worker = OffloadWorker::new(bus.clone(), PanickingService, Default::default()).unwrap();
        let stats = worker.stats();
        let handle = worker.spawn();

        let mut results = bus.results(TaskKind::ProcessFastUnstakeEra);
        bus.submit(era_task(1, "bob")).await;
        bus.submit(era_task(2, "bob")).await;

        assert!(timeout(Duration::from_millis(200), results.recv())
            .await
            .is_err());
        assert_eq!(stats.snapshot().computations_failed, 2);
        assert!(!handle.is_finished());

        handle.abort();
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bus = Arc::new(InMemoryOffloadBus::new());
        let config = OffloadWorkerConfig::default().with_max_exposures(0);
        assert!(OffloadWorker::new(bus, ExposureAggregatorService::new(), config).is_err());
    }
}
