//! # Integration Test Flows
//!
//! The dashboard aggregation and the fast-unstake scanner talk to the same
//! long-lived worker over one offload bus.
//!
//! ## Flows Tested:
//!
//! 1. **Aggregation + scan side by side**: replies are told apart by task
//!    kind and correlation id
//! 2. **Exposure found by the real worker**: the scan stops and persists
//!    `isExposed`
//! 3. **Worker refuses the request**: nothing is posted, the scan stalls

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use se_01_exposure_aggregation::{
        AggregationRequestApi, AggregationRequester, ExposureAggregatorService, OffloadWorker,
        OffloadWorkerConfig,
    };
    use se_02_fast_unstake::test_utils::{RecordingQueueWatcher, StaticSnapshotReader};
    use se_02_fast_unstake::{
        FastUnstakeScanner, InMemoryKVStore, ScanCacheStore, ScanError, ScanPreconditions,
        ScanState, ScannerConfig,
    };
    use shared_bus::InMemoryOffloadBus;
    use shared_types::ipc::InitialiseExposuresPayload;
    use shared_types::{Address, EraIndex, NetworkId, Planck};

    use crate::fixtures::{random_snapshot, with_nominator, DOT};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const ACTIVE_ERA: EraIndex = 50;

    fn alice() -> Address {
        Address::new("alice")
    }

    fn polkadot() -> NetworkId {
        NetworkId::new("polkadot")
    }

    fn preconditions(lookback: EraIndex) -> ScanPreconditions {
        ScanPreconditions {
            account: Some(alice()),
            network: Some(polkadot()),
            network_ready: true,
            active_era: Some(ACTIVE_ERA),
            lookback_eras: Some(lookback),
            is_nominating: true,
            has_active_nominations: false,
        }
    }

    /// Reader serving random snapshots for every era in the window.
    fn reader(lookback: EraIndex) -> StaticSnapshotReader {
        (ACTIVE_ERA - lookback..=ACTIVE_ERA).fold(StaticSnapshotReader::new(), |reader, era| {
            let snapshot = random_snapshot(era, 8, 16, 64, u64::from(era));
            reader.with_era(era, snapshot.entries)
        })
    }

    fn spawn_worker(bus: &Arc<InMemoryOffloadBus>, config: OffloadWorkerConfig) {
        OffloadWorker::new(bus.clone(), ExposureAggregatorService::new(), config)
            .unwrap()
            .spawn();
    }

    // =============================================================================
    // FLOWS
    // =============================================================================

    #[tokio::test]
    async fn test_dashboard_and_scan_share_one_worker() {
        let bus = Arc::new(InMemoryOffloadBus::new());
        spawn_worker(&bus, OffloadWorkerConfig::default());

        let snapshot = random_snapshot(ACTIVE_ERA, 20, 32, 200, 7);
        let expected_total: Planck = snapshot.entries.iter().map(|e| e.exposure.total).sum();
        let requester = AggregationRequester::new(bus.clone(), Duration::from_secs(5));
        let payload = InitialiseExposuresPayload {
            active_account: Some(alice()),
            units: 10,
            exposures: snapshot.entries,
            max_nominator_rewarded_per_validator: 16,
        };

        let kv = Arc::new(InMemoryKVStore::new());
        let watcher = Arc::new(RecordingQueueWatcher::new());
        let (mut scanner, _handle) = FastUnstakeScanner::new(
            Arc::new(reader(3)),
            kv.clone(),
            bus.clone(),
            watcher.clone(),
            ScannerConfig::default(),
        )
        .unwrap();

        let pre = preconditions(3);
        let (aggregate, scan) = tokio::join!(requester.request_aggregate(payload), scanner.run(&pre));

        let aggregate = aggregate.unwrap();
        assert_eq!(aggregate.total_staked, expected_total);
        assert_eq!(aggregate.active_validator_count, 20);
        assert!(aggregate.own_stake_of_account.is_empty());
        assert!(aggregate.stakers.iter().all(|s| s.oversubscribed));

        let report = scan.unwrap();
        assert!(report.is_clear());
        assert_eq!(report.checked_eras, vec![50, 49, 48, 47]);
        assert_eq!(watcher.calls(), vec![(polkadot(), alice())]);
    }

    #[tokio::test]
    async fn test_real_worker_finds_exposure() {
        let bus = Arc::new(InMemoryOffloadBus::new());
        spawn_worker(&bus, OffloadWorkerConfig::default());

        let exposed_era = random_snapshot(48, 8, 16, 64, 48);
        let reader = reader(5).with_era(48, with_nominator(exposed_era, &alice(), 5 * DOT).entries);
        let kv = Arc::new(InMemoryKVStore::new());
        let (mut scanner, handle) = FastUnstakeScanner::new(
            Arc::new(reader),
            kv.clone(),
            bus.clone(),
            Arc::new(RecordingQueueWatcher::new()),
            ScannerConfig::default(),
        )
        .unwrap();

        let report = scanner.run(&preconditions(5)).await.unwrap();

        assert_eq!(report.state, ScanState::Exposed);
        assert_eq!(handle.state(), ScanState::Exposed);
        let stored = ScanCacheStore::new(kv, "fast_unstake")
            .load(&polkadot(), &alice(), ACTIVE_ERA, 5)
            .unwrap()
            .unwrap();
        assert_eq!(stored.checked_eras, vec![50, 49, 48]);
        assert!(stored.is_exposed);
    }

    #[tokio::test]
    async fn test_refused_request_stalls_scan() {
        let bus = Arc::new(InMemoryOffloadBus::new());
        // every era carries 8 validators, above this limit
        spawn_worker(&bus, OffloadWorkerConfig::default().with_max_exposures(4));

        let config = ScannerConfig::default()
            .with_era_reply_timeout(Duration::from_millis(50))
            .with_max_era_attempts(2);
        let (mut scanner, handle) = FastUnstakeScanner::new(
            Arc::new(reader(2)),
            Arc::new(InMemoryKVStore::new()),
            bus.clone(),
            Arc::new(RecordingQueueWatcher::new()),
            config,
        )
        .unwrap();

        let err = scanner.run(&preconditions(2)).await.unwrap_err();

        assert!(matches!(err, ScanError::ReplyTimeout { era: ACTIVE_ERA, attempts: 2 }));
        assert_eq!(handle.state(), ScanState::Stalled { era: ACTIVE_ERA });
    }
}
