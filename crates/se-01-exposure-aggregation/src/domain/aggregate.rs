//! Era exposure aggregation.
//!
//! A single pass over the snapshot. Balances stay in planck for the whole
//! reduction and are converted to display units only when written into the
//! result.

use shared_types::{
    AggregateResult, Address, AmountError, DisplayAmount, ExposureEntry, OwnStake, Planck,
    MAX_UNITS,
};
use std::collections::HashMap;

use super::oversubscription::staker_view;

/// Network parameters needed to aggregate a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationParams {
    /// Decimal places of the network token.
    pub units: u8,
    /// Reward cap per validator.
    pub max_nominator_rewarded_per_validator: u32,
}

/// Reduce one era's exposures to the dashboard aggregates.
///
/// `stakers` is left empty; see [`initialise_exposures`] for the full view.
///
/// # Errors
///
/// `AmountError::UnitsOutOfRange` if `units` exceeds [`MAX_UNITS`].
pub fn aggregate(
    entries: &[ExposureEntry],
    query_account: Option<&Address>,
    units: u8,
) -> Result<AggregateResult, AmountError> {
    if units > MAX_UNITS {
        return Err(AmountError::UnitsOutOfRange {
            units,
            max: MAX_UNITS,
        });
    }

    let mut total_staked = Planck::ZERO;
    let mut active_validator_count: u32 = 0;
    let mut nominator_totals: HashMap<&Address, Planck> = HashMap::new();
    let mut own_stake_of_account = Vec::new();

    for entry in entries {
        let exposure = &entry.exposure;
        total_staked = total_staked.saturating_add(exposure.total);
        active_validator_count = active_validator_count.saturating_add(1);

        for stake in &exposure.others {
            let total = nominator_totals.entry(&stake.who).or_insert(Planck::ZERO);
            *total = total.saturating_add(stake.value);

            if query_account == Some(&stake.who) {
                own_stake_of_account.push(OwnStake {
                    validator: entry.validator.clone(),
                    value: stake.value.to_display_units(units)?,
                });
            }
        }
    }

    let min_active_bond = match nominator_totals.values().min() {
        Some(min) => min.to_display_units(units)?,
        None => DisplayAmount::zero(),
    };

    Ok(AggregateResult {
        total_staked,
        min_active_bond,
        active_validator_count,
        active_nominator_count: u32::try_from(nominator_totals.len()).unwrap_or(u32::MAX),
        own_stake_of_account,
        stakers: Vec::new(),
    })
}

/// Aggregate plus the per-validator oversubscription view.
pub fn initialise_exposures(
    entries: &[ExposureEntry],
    query_account: Option<&Address>,
    params: AggregationParams,
) -> Result<AggregateResult, AmountError> {
    let mut result = aggregate(entries, query_account, params.units)?;
    result.stakers = entries
        .iter()
        .map(|entry| staker_view(entry, params))
        .collect::<Result<_, _>>()?;
    Ok(result)
}
