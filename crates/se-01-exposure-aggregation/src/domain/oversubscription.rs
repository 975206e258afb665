//! Oversubscription view of a single validator.
//!
//! Only the `max_rewarded` largest nominator stakes behind a validator earn
//! rewards. Sorting `others` ascending puts the cut at index
//! `len - max_rewarded`; anyone staking less than the value there is
//! oversubscribed out.
//!
//! ```text
//!   index:   0   1   2 | 3   4   5   6   7   8   9      len = 10
//!   stake:   1   2   3 | 4   5   6   7   8   9  10      max_rewarded = 7
//!            ^^^^^^^^^   ^^^^^^^^^^^^^^^^^^^^^^^^^
//!            out          rewarded (lowest = 4)
//! ```

use shared_types::{AmountError, ExposureEntry, NominatorStake, Planck, Staker};

use super::aggregate::AggregationParams;

/// Where the reward cut falls for one validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardCutoff {
    /// Nominator stakes, ascending by value. Ties keep chain order.
    pub sorted: Vec<NominatorStake>,
    /// Index of the smallest stake that is still rewarded.
    pub lowest_rewarded_index: usize,
    /// Value at `lowest_rewarded_index`, zero when there are no nominators.
    pub lowest_reward: Planck,
    /// More nominators than the cap allows.
    pub oversubscribed: bool,
}

impl RewardCutoff {
    /// Whether a stake of `value` falls below the reward cut.
    #[must_use]
    pub fn is_oversubscribed_out(&self, value: Planck) -> bool {
        value < self.lowest_reward
    }

    /// Stakes that miss out on rewards.
    pub fn oversubscribed_out(&self) -> impl Iterator<Item = &NominatorStake> {
        self.sorted
            .iter()
            .filter(move |stake| self.is_oversubscribed_out(stake.value))
    }
}

/// `max(0, len - max_rewarded)`.
#[must_use]
pub fn lowest_rewarded_index(len: usize, max_rewarded: u32) -> usize {
    len.saturating_sub(usize::try_from(max_rewarded).unwrap_or(usize::MAX))
}

/// Compute the reward cut for one validator's nominators.
#[must_use]
pub fn reward_cutoff(others: &[NominatorStake], max_rewarded: u32) -> RewardCutoff {
    let mut sorted = others.to_vec();
    // `sort_by` is stable, so equal stakes keep their chain order.
    sorted.sort_by(|a, b| a.value.cmp(&b.value));

    let lowest_rewarded_index = lowest_rewarded_index(sorted.len(), max_rewarded);
    let lowest_reward = sorted
        .get(lowest_rewarded_index)
        .map_or(Planck::ZERO, |stake| stake.value);
    let oversubscribed = sorted.len() > usize::try_from(max_rewarded).unwrap_or(usize::MAX);

    RewardCutoff {
        sorted,
        lowest_rewarded_index,
        lowest_reward,
        oversubscribed,
    }
}

/// Build the display view of one validator.
pub fn staker_view(entry: &ExposureEntry, params: AggregationParams) -> Result<Staker, AmountError> {
    let cutoff = reward_cutoff(
        &entry.exposure.others,
        params.max_nominator_rewarded_per_validator,
    );

    Ok(Staker {
        address: entry.validator.clone(),
        own: entry.exposure.own,
        total: entry.exposure.total,
        lowest_reward: cutoff.lowest_reward.to_display_units(params.units)?,
        oversubscribed: cutoff.oversubscribed,
        others: cutoff.sorted,
    })
}
