//! Single-era exposure check for fast-unstake eligibility.

use shared_types::{Address, EraExposureVerdict, EraIndex, ExposureEntry};

/// Whether `who` backs, or is, any validator in `entries`.
///
/// Stops at the first hit.
#[must_use]
pub fn is_exposed(entries: &[ExposureEntry], who: &Address) -> bool {
    entries.iter().any(|entry| {
        entry.validator == *who || entry.exposure.others.iter().any(|stake| stake.who == *who)
    })
}

/// Produce the verdict for one era.
#[must_use]
pub fn process_era(era: EraIndex, entries: &[ExposureEntry], who: &Address) -> EraExposureVerdict {
    EraExposureVerdict {
        era,
        exposed: is_exposed(entries, who),
    }
}
