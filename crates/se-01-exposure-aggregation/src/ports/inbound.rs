//! Inbound Ports (Driving Ports)
//!
//! These traits define the API that external components use to interact
//! with exposure aggregation.

use async_trait::async_trait;
use shared_types::{
    AggregateResult, Address, EraExposureVerdict, EraIndex, ExposureEntry,
    ExposuresInitialisedPayload, FastUnstakeEraProcessedPayload, InitialiseExposuresPayload,
    NominatorStake, ProcessFastUnstakeEraPayload, TaskRequest, TaskResult,
};

use crate::domain::RewardCutoff;
use crate::error::AggregationError;

/// Primary aggregation API (Driving Port)
///
/// Every method is a pure computation and may run on a blocking thread.
pub trait ExposureAggregatorApi: Send + Sync {
    /// Reduce one era's exposures to the dashboard aggregates.
    fn aggregate(
        &self,
        entries: &[ExposureEntry],
        query_account: Option<&Address>,
        units: u8,
    ) -> Result<AggregateResult, AggregationError>;

    /// Reward cut for one validator's nominators.
    fn reward_cutoff(&self, others: &[NominatorStake], max_rewarded: u32) -> RewardCutoff;

    /// Whether `who` was exposed in `era`.
    fn process_era(
        &self,
        era: EraIndex,
        entries: &[ExposureEntry],
        who: &Address,
    ) -> EraExposureVerdict;

    /// Serve an `initialise_exposures` task.
    fn initialise_exposures(
        &self,
        payload: &InitialiseExposuresPayload,
    ) -> Result<ExposuresInitialisedPayload, AggregationError>;

    /// Serve a `process_fast_unstake_era` task, echoing correlation fields.
    fn process_fast_unstake_era(
        &self,
        payload: &ProcessFastUnstakeEraPayload,
    ) -> FastUnstakeEraProcessedPayload;

    /// Dispatch a task by kind.
    fn execute(&self, task: &TaskRequest) -> Result<TaskResult, AggregationError> {
        match task {
            TaskRequest::InitialiseExposures(payload) => self
                .initialise_exposures(payload)
                .map(TaskResult::InitialiseExposures),
            TaskRequest::ProcessFastUnstakeEra(payload) => Ok(TaskResult::ProcessFastUnstakeEra(
                self.process_fast_unstake_era(payload),
            )),
        }
    }
}

/// Request an aggregation through the offload channel and wait for it.
#[async_trait]
pub trait AggregationRequestApi: Send + Sync {
    /// Submit `payload` and return the aggregate from the matching reply.
    ///
    /// # Errors
    ///
    /// `AggregationError::NoReply` if the worker does not answer in time.
    async fn request_aggregate(
        &self,
        payload: InitialiseExposuresPayload,
    ) -> Result<AggregateResult, AggregationError>;
}
