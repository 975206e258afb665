//! # Offload Message Payloads
//!
//! Wire messages exchanged with the exposure worker.
//!
//! ## Design Rules
//!
//! - Every payload is wrapped in `OffloadEnvelope<T>`.
//! - Requests are tagged with a `task` discriminator; replies echo the same
//!   tag plus every correlation field the caller supplied (`who`, `where`,
//!   `currentEra`, `session`) unchanged.
//! - The worker never filters or reorders. Stale-reply detection belongs to
//!   the caller.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::amount::{DisplayAmount, Planck};
use crate::entities::{
    Address, AggregateResult, EraExposureVerdict, EraIndex, ExposureEntry, NetworkId, OwnStake,
    Staker,
};
use crate::envelope::OffloadEnvelope;

/// A request travelling to the worker.
pub type OffloadRequest = OffloadEnvelope<TaskRequest>;

/// A reply travelling back from the worker.
pub type OffloadReply = OffloadEnvelope<TaskResult>;

/// Token identifying one scan session.
///
/// A scanner mints a new token every time it (re)starts; a reply carrying
/// any other token is stale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(pub u64);

impl SessionToken {
    /// The token following this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Task discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Full exposure aggregation for display.
    InitialiseExposures,
    /// Single-era exposure check for fast unstake.
    ProcessFastUnstakeEra,
}

impl TaskKind {
    /// Wire name of the task.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::InitialiseExposures => "initialise_exposures",
            TaskKind::ProcessFastUnstakeEra => "process_fast_unstake_era",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

/// Request to aggregate a full era snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialiseExposuresPayload {
    /// Account whose own stake should be extracted, if any.
    pub active_account: Option<Address>,
    /// Decimal places of the network token.
    pub units: u8,
    /// Validator exposures for the era.
    pub exposures: Vec<ExposureEntry>,
    /// Reward cap per validator.
    pub max_nominator_rewarded_per_validator: u32,
}

/// Request to check one era for an account's exposure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessFastUnstakeEraPayload {
    /// Era being checked.
    pub current_era: EraIndex,
    /// Account being checked.
    pub who: Address,
    /// Network the account lives on.
    #[serde(rename = "where")]
    pub network: NetworkId,
    /// Session that issued the request.
    pub session: SessionToken,
    /// Validator exposures for `current_era`.
    pub exposures: Vec<ExposureEntry>,
}

/// All requests the worker understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum TaskRequest {
    /// See `InitialiseExposuresPayload`.
    InitialiseExposures(InitialiseExposuresPayload),
    /// See `ProcessFastUnstakeEraPayload`.
    ProcessFastUnstakeEra(ProcessFastUnstakeEraPayload),
}

impl TaskRequest {
    /// Task discriminator.
    #[must_use]
    pub fn kind(&self) -> TaskKind {
        match self {
            Self::InitialiseExposures(_) => TaskKind::InitialiseExposures,
            Self::ProcessFastUnstakeEra(_) => TaskKind::ProcessFastUnstakeEra,
        }
    }

    /// Number of validator exposures carried.
    #[must_use]
    pub fn exposure_count(&self) -> usize {
        match self {
            Self::InitialiseExposures(p) => p.exposures.len(),
            Self::ProcessFastUnstakeEra(p) => p.exposures.len(),
        }
    }
}

// =============================================================================
// REPLIES
// =============================================================================

/// Aggregation reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposuresInitialisedPayload {
    /// Per-validator oversubscription view.
    pub stakers: Vec<Staker>,
    /// Sum of all validator totals.
    pub total_staked: Planck,
    /// Distinct nominators.
    pub total_active_nominators: u32,
    /// Validators in the snapshot.
    pub active_validators: u32,
    /// Smallest aggregated nominator stake.
    pub min_active_bond: DisplayAmount,
    /// The active account's stake per backed validator.
    pub active_account_own_stake: Vec<OwnStake>,
    /// Echo of `activeAccount`.
    pub who: Option<Address>,
}

impl ExposuresInitialisedPayload {
    /// Build the wire reply from an aggregate.
    #[must_use]
    pub fn from_aggregate(result: AggregateResult, who: Option<Address>) -> Self {
        Self {
            stakers: result.stakers,
            total_staked: result.total_staked,
            total_active_nominators: result.active_nominator_count,
            active_validators: result.active_validator_count,
            min_active_bond: result.min_active_bond,
            active_account_own_stake: result.own_stake_of_account,
            who,
        }
    }

    /// Recover the aggregate carried by this reply.
    #[must_use]
    pub fn into_aggregate(self) -> AggregateResult {
        AggregateResult {
            total_staked: self.total_staked,
            min_active_bond: self.min_active_bond,
            active_validator_count: self.active_validators,
            active_nominator_count: self.total_active_nominators,
            own_stake_of_account: self.active_account_own_stake,
            stakers: self.stakers,
        }
    }
}

/// Fast-unstake era reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FastUnstakeEraProcessedPayload {
    /// Echo of the checked era.
    pub current_era: EraIndex,
    /// Whether the account was exposed in `current_era`.
    pub exposed: bool,
    /// Echo of `who`.
    pub who: Address,
    /// Echo of `where`.
    #[serde(rename = "where")]
    pub network: NetworkId,
    /// Echo of the issuing session.
    pub session: SessionToken,
}

impl FastUnstakeEraProcessedPayload {
    /// The verdict carried by this reply.
    #[must_use]
    pub fn verdict(&self) -> EraExposureVerdict {
        EraExposureVerdict {
            era: self.current_era,
            exposed: self.exposed,
        }
    }
}

/// All replies the worker emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum TaskResult {
    /// Reply to `TaskRequest::InitialiseExposures`.
    InitialiseExposures(ExposuresInitialisedPayload),
    /// Reply to `TaskRequest::ProcessFastUnstakeEra`.
    ProcessFastUnstakeEra(FastUnstakeEraProcessedPayload),
}

impl TaskResult {
    /// Task discriminator.
    #[must_use]
    pub fn kind(&self) -> TaskKind {
        match self {
            Self::InitialiseExposures(_) => TaskKind::InitialiseExposures,
            Self::ProcessFastUnstakeEra(_) => TaskKind::ProcessFastUnstakeEra,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ExposureRecord;

    #[test]
    fn test_fast_unstake_request_wire_shape() {
        let request = TaskRequest::ProcessFastUnstakeEra(ProcessFastUnstakeEraPayload {
            current_era: 1200,
            who: Address::new("alice"),
            network: NetworkId::new("polkadot"),
            session: SessionToken(3),
            exposures: vec![ExposureEntry::new("v1", ExposureRecord::default())],
        });

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["task"], "process_fast_unstake_era");
        assert_eq!(json["currentEra"], 1200);
        assert_eq!(json["who"], "alice");
        assert_eq!(json["where"], "polkadot");
        assert_eq!(json["session"], 3);
    }

    #[test]
    fn test_initialise_request_wire_shape() {
        let request = TaskRequest::InitialiseExposures(InitialiseExposuresPayload {
            active_account: None,
            units: 10,
            exposures: vec![],
            max_nominator_rewarded_per_validator: 512,
        });

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["task"], "initialise_exposures");
        assert_eq!(json["maxNominatorRewardedPerValidator"], 512);
        assert_eq!(request.kind(), TaskKind::InitialiseExposures);
    }

    #[test]
    fn test_reply_round_trips_through_aggregate() {
        let aggregate = AggregateResult {
            total_staked: Planck::from(500u64),
            active_validator_count: 2,
            active_nominator_count: 3,
            ..Default::default()
        };
        let payload =
            ExposuresInitialisedPayload::from_aggregate(aggregate.clone(), Some("alice".into()));
        assert_eq!(payload.total_active_nominators, 3);
        assert_eq!(payload.into_aggregate(), aggregate);
    }

    #[test]
    fn test_task_kind_names() {
        assert_eq!(TaskKind::InitialiseExposures.to_string(), "initialise_exposures");
        assert_eq!(
            TaskKind::ProcessFastUnstakeEra.as_str(),
            "process_fast_unstake_era"
        );
    }

    #[test]
    fn test_session_token_next() {
        assert_eq!(SessionToken(1).next(), SessionToken(2));
        assert_eq!(SessionToken(u64::MAX).next(), SessionToken(0));
    }
}
