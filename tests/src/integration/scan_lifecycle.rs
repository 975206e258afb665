//! # Scan Lifecycle
//!
//! Restarts, era advancement and cancellation around the fast-unstake
//! scanner, with the real worker answering.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use se_01_exposure_aggregation::{ExposureAggregatorService, OffloadWorker};
    use se_02_fast_unstake::test_utils::{RecordingQueueWatcher, StaticSnapshotReader};
    use se_02_fast_unstake::{
        ExposureSnapshotReader, FastUnstakeScanner, FileBackedKVStore, InMemoryKVStore,
        KeyValueStore, ScanCacheStore, ScanError, ScanPreconditions, ScanState, ScannerConfig,
    };
    use shared_bus::InMemoryOffloadBus;
    use shared_types::{Address, EraIndex, ExposureSnapshot, NetworkId, SnapshotError};
    use tokio::sync::Notify;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn preconditions(account: &str, active_era: EraIndex, lookback: EraIndex) -> ScanPreconditions {
        ScanPreconditions {
            account: Some(Address::new(account)),
            network: Some(NetworkId::new("kusama")),
            network_ready: true,
            active_era: Some(active_era),
            lookback_eras: Some(lookback),
            is_nominating: true,
            has_active_nominations: false,
        }
    }

    fn bus_with_worker() -> Arc<InMemoryOffloadBus> {
        let bus = Arc::new(InMemoryOffloadBus::new());
        OffloadWorker::new(bus.clone(), ExposureAggregatorService::new(), Default::default())
            .unwrap()
            .spawn();
        bus
    }

    fn scanner<S: KeyValueStore>(
        bus: &Arc<InMemoryOffloadBus>,
        reader: impl ExposureSnapshotReader + 'static,
        store: Arc<S>,
    ) -> (FastUnstakeScanner<S>, se_02_fast_unstake::ScanHandle) {
        FastUnstakeScanner::new(
            Arc::new(reader),
            store,
            bus.clone(),
            Arc::new(RecordingQueueWatcher::new()),
            ScannerConfig::default(),
        )
        .unwrap()
    }

    /// Reader that parks every fetch until released.
    #[derive(Clone, Default)]
    struct GatedSnapshotReader {
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl ExposureSnapshotReader for GatedSnapshotReader {
        async fn era_exposures(
            &self,
            _network: &NetworkId,
            era: EraIndex,
        ) -> Result<ExposureSnapshot, SnapshotError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(ExposureSnapshot::new(era, vec![]))
        }
    }

    // =============================================================================
    // LIFECYCLE
    // =============================================================================

    #[tokio::test]
    async fn test_scan_resumes_after_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fast_unstake.json");
        let bus = bus_with_worker();

        {
            let store = Arc::new(FileBackedKVStore::open(&path).unwrap());
            let reader = StaticSnapshotReader::new().with_unavailable_era(47);
            let (mut first, _) = scanner(&bus, reader, store);
            let err = first.run(&preconditions("alice", 50, 5)).await.unwrap_err();
            assert!(matches!(err, ScanError::Snapshot(_)));
        }

        let store = Arc::new(FileBackedKVStore::open(&path).unwrap());
        let (mut second, _) = scanner(&bus, StaticSnapshotReader::new(), store);
        let report = second.run(&preconditions("alice", 50, 5)).await.unwrap();

        assert!(report.is_clear());
        assert_eq!(report.eras_applied, 3);
        assert_eq!(report.checked_eras, vec![50, 49, 48, 47, 46, 45]);
    }

    #[tokio::test]
    async fn test_expired_cache_is_rescanned_after_era_advance() {
        let bus = bus_with_worker();
        let kv = Arc::new(InMemoryKVStore::new());
        let (mut scanner, _) = scanner(&bus, StaticSnapshotReader::new(), kv.clone());

        let first = scanner.run(&preconditions("alice", 50, 2)).await.unwrap();
        assert_eq!(first.checked_eras, vec![50, 49, 48]);

        let later = scanner.run(&preconditions("alice", 53, 2)).await.unwrap();
        assert!(later.is_clear());
        assert_eq!(later.eras_applied, 3);
        assert_eq!(later.checked_eras, vec![53, 52, 51]);
    }

    #[tokio::test]
    async fn test_accounts_keep_separate_records() {
        let bus = bus_with_worker();
        let kv = Arc::new(InMemoryKVStore::new());
        let (mut scanner, _) = scanner(&bus, StaticSnapshotReader::new(), kv.clone());

        scanner.run(&preconditions("alice", 50, 1)).await.unwrap();
        scanner.run(&preconditions("bob", 50, 3)).await.unwrap();

        let cache = ScanCacheStore::new(kv.clone(), "fast_unstake");
        let network = NetworkId::new("kusama");
        let alice = cache.load(&network, &Address::new("alice"), 50, 1).unwrap().unwrap();
        let bob = cache.load(&network, &Address::new("bob"), 50, 3).unwrap().unwrap();
        assert_eq!(alice.checked_eras, vec![50, 49]);
        assert_eq!(bob.checked_eras, vec![50, 49, 48, 47]);
    }

    #[tokio::test]
    async fn test_teardown_during_snapshot_fetch() {
        let bus = bus_with_worker();
        let kv = Arc::new(InMemoryKVStore::new());
        let gate = GatedSnapshotReader::default();
        let (mut scanner, handle) = scanner(&bus, gate.clone(), kv.clone());

        let scan = tokio::spawn(async move { scanner.run(&preconditions("alice", 50, 28)).await });
        gate.entered.notified().await;
        assert!(handle.teardown());

        let report = scan.await.unwrap().unwrap();
        assert_eq!(report.state, ScanState::Cancelled);
        assert_eq!(report.eras_applied, 0);
        assert!(kv.is_empty());
    }
}
