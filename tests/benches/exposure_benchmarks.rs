//! # Staking Exposure Benchmarks
//!
//! A Polkadot era carries ~300 validators with up to 512 rewarded nominators
//! each; Kusama ~1000 validators. Aggregation must stay well below a frame
//! budget for the dashboard and the per-era check must be cheap enough to
//! scan 28 eras quickly.
//!
//! | Operation | Snapshot | Target |
//! |-----------|----------|--------|
//! | `aggregate` | 300 x 512 | < 50ms |
//! | `initialise_exposures` | 1000 x 256 | < 150ms |
//! | `process_era` | 1000 x 256 | < 5ms |
//! | cache `validate` | 84 eras | < 50us |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use se_01_exposure_aggregation::{aggregate, initialise_exposures, process_era, AggregationParams};
use se_02_fast_unstake::validate;
use se_tests::fixtures::random_snapshot;
use shared_types::Address;
use std::time::Duration;

// ============================================================================
// SE-01: Aggregation
// ============================================================================

fn bench_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("se-01-aggregation");
    group.measurement_time(Duration::from_secs(10));

    let query = Address::new("nominator-7");
    for (validators, nominators) in [(300usize, 512usize), (1000, 256)] {
        let snapshot = random_snapshot(1, validators, nominators, 20_000, 42);
        let entries = snapshot.nominator_entries() as u64;
        group.throughput(Throughput::Elements(entries));

        group.bench_with_input(
            BenchmarkId::new("aggregate", format!("{validators}x{nominators}")),
            &snapshot,
            |b, snapshot| b.iter(|| black_box(aggregate(&snapshot.entries, Some(&query), 10))),
        );

        let params = AggregationParams {
            units: 10,
            max_nominator_rewarded_per_validator: 512,
        };
        group.bench_with_input(
            BenchmarkId::new("initialise_exposures", format!("{validators}x{nominators}")),
            &snapshot,
            |b, snapshot| {
                b.iter(|| black_box(initialise_exposures(&snapshot.entries, Some(&query), params)))
            },
        );
    }

    group.finish();
}

// ============================================================================
// SE-02: Fast-unstake era check and cache validation
// ============================================================================

fn bench_fast_unstake(c: &mut Criterion) {
    let mut group = c.benchmark_group("se-02-fast-unstake");

    let snapshot = random_snapshot(1, 1000, 256, 20_000, 7);
    let absent = Address::new("not-a-nominator");
    group.bench_function("process_era_absent_account", |b| {
        b.iter(|| black_box(process_era(1, &snapshot.entries, &absent)))
    });

    for lookback in [28u32, 84] {
        let eras: Vec<u32> = (0..=lookback).map(|i| 1_000 - i).collect();
        let raw = format!(r#"{{"isExposed":false,"checkedEras":{eras:?}}}"#);
        group.bench_with_input(BenchmarkId::new("validate_cache", lookback), &raw, |b, raw| {
            b.iter(|| black_box(validate(raw.as_bytes(), 1_000, lookback)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_aggregation, bench_fast_unstake);

criterion_main!(benches);
