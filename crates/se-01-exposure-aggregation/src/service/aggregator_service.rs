//! Exposure Aggregator Service
//!
//! Implements `ExposureAggregatorApi` on top of the domain functions and
//! shapes wire replies.

use shared_types::{
    AggregateResult, Address, EraExposureVerdict, EraIndex, ExposureEntry,
    ExposuresInitialisedPayload, FastUnstakeEraProcessedPayload, InitialiseExposuresPayload,
    NominatorStake, ProcessFastUnstakeEraPayload,
};

use crate::domain::{self, AggregationParams, RewardCutoff};
use crate::error::AggregationError;
use crate::ports::ExposureAggregatorApi;

/// Stateless aggregation service.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExposureAggregatorService;

impl ExposureAggregatorService {
    /// Create the service.
    pub fn new() -> Self {
        Self
    }
}

impl ExposureAggregatorApi for ExposureAggregatorService {
    fn aggregate(
        &self,
        entries: &[ExposureEntry],
        query_account: Option<&Address>,
        units: u8,
    ) -> Result<AggregateResult, AggregationError> {
        Ok(domain::aggregate(entries, query_account, units)?)
    }

    fn reward_cutoff(&self, others: &[NominatorStake], max_rewarded: u32) -> RewardCutoff {
        domain::reward_cutoff(others, max_rewarded)
    }

    fn process_era(
        &self,
        era: EraIndex,
        entries: &[ExposureEntry],
        who: &Address,
    ) -> EraExposureVerdict {
        domain::process_era(era, entries, who)
    }

    fn initialise_exposures(
        &self,
        payload: &InitialiseExposuresPayload,
    ) -> Result<ExposuresInitialisedPayload, AggregationError> {
        let params = AggregationParams {
            units: payload.units,
            max_nominator_rewarded_per_validator: payload.max_nominator_rewarded_per_validator,
        };
        let result = domain::initialise_exposures(
            &payload.exposures,
            payload.active_account.as_ref(),
            params,
        )?;
        Ok(ExposuresInitialisedPayload::from_aggregate(
            result,
            payload.active_account.clone(),
        ))
    }

    fn process_fast_unstake_era(
        &self,
        payload: &ProcessFastUnstakeEraPayload,
    ) -> FastUnstakeEraProcessedPayload {
        let verdict = domain::process_era(payload.current_era, &payload.exposures, &payload.who);
        FastUnstakeEraProcessedPayload {
            current_era: verdict.era,
            exposed: verdict.exposed,
            who: payload.who.clone(),
            network: payload.network.clone(),
            session: payload.session,
        }
    }
}
