//! Synthetic era snapshots for flows and benchmarks.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared_types::{
    Address, EraIndex, ExposureEntry, ExposureRecord, ExposureSnapshot, NominatorStake, Planck,
};

/// One planck-denominated DOT (10 decimals).
pub const DOT: u64 = 10_000_000_000;

/// Snapshot with `validators` validators, each backed by `nominators_per_validator`
/// nominators drawn from a pool of `nominator_pool` accounts.
///
/// Deterministic for a given `seed`. Nominators overlap across validators
/// whenever the pool is smaller than the total number of backings.
pub fn random_snapshot(
    era: EraIndex,
    validators: usize,
    nominators_per_validator: usize,
    nominator_pool: usize,
    seed: u64,
) -> ExposureSnapshot {
    let mut rng = StdRng::seed_from_u64(seed);
    let pool = nominator_pool.max(1);

    let entries = (0..validators)
        .map(|v| {
            let own = rng.gen_range(1..=10_000u64) * DOT;
            let others: Vec<NominatorStake> = (0..nominators_per_validator)
                .map(|_| {
                    let who = format!("nominator-{}", rng.gen_range(0..pool));
                    NominatorStake::new(who, rng.gen_range(1..=1_000u64) * DOT)
                })
                .collect();
            let backed: Planck = others.iter().map(|n| n.value).sum();
            ExposureEntry::new(
                format!("validator-{v}"),
                ExposureRecord {
                    total: Planck::from(own).saturating_add(backed),
                    own: Planck::from(own),
                    others,
                },
            )
        })
        .collect();

    ExposureSnapshot::new(era, entries)
}

/// Add `account` as a nominator of the first validator.
pub fn with_nominator(mut snapshot: ExposureSnapshot, account: &Address, value: u64) -> ExposureSnapshot {
    if let Some(first) = snapshot.entries.first_mut() {
        let stake = Planck::from(value);
        first.exposure.others.push(NominatorStake::new(account.clone(), stake));
        first.exposure.total = first.exposure.total.saturating_add(stake);
    }
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_is_deterministic() {
        let a = random_snapshot(7, 5, 4, 10, 42);
        let b = random_snapshot(7, 5, 4, 10, 42);
        assert_eq!(a, b);
        assert_eq!(a.len(), 5);
        assert_eq!(a.nominator_entries(), 20);
    }

    #[test]
    fn test_totals_include_backing() {
        let snapshot = random_snapshot(1, 3, 2, 50, 1);
        for entry in &snapshot.entries {
            let backed: Planck = entry.exposure.others.iter().map(|n| n.value).sum();
            assert_eq!(entry.exposure.total, entry.exposure.own.saturating_add(backed));
        }
    }
}
