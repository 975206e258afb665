//! # Core Domain Entities
//!
//! Staking entities shared by the aggregation worker and the fast-unstake
//! scanner.
//!
//! ## Clusters
//!
//! - **Identity**: `Address`, `NetworkId`, `EraIndex`
//! - **Snapshot input**: `ExposureRecord`, `NominatorStake`, `ExposureEntry`,
//!   `ExposureSnapshot`
//! - **Derived output**: `AggregateResult`, `Staker`, `OwnStake`,
//!   `EraExposureVerdict`

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::amount::{DisplayAmount, Planck};

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// Index of a staking era.
pub type EraIndex = u32;

/// An SS58-encoded account address.
///
/// Addresses are compared byte-for-byte; the snapshot reader is expected to
/// deliver them in the network's canonical encoding.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Create an address from its string form.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Borrow the address string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Network name (e.g. `polkadot`, `kusama`, `westend`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(String);

impl NetworkId {
    /// Create a network id.
    pub fn new(network: impl Into<String>) -> Self {
        Self(network.into())
    }

    /// Borrow the network name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NetworkId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// =============================================================================
// CLUSTER B: SNAPSHOT INPUT
// =============================================================================

/// One nominator's backing of a validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NominatorStake {
    /// The nominating account.
    pub who: Address,
    /// Stake behind the validator from this nominator.
    pub value: Planck,
}

impl NominatorStake {
    /// Convenience constructor.
    pub fn new(who: impl Into<Address>, value: impl Into<Planck>) -> Self {
        Self {
            who: who.into(),
            value: value.into(),
        }
    }
}

/// A validator's exposure in one era.
///
/// `total == own + sum(others.value)` is expected but not enforced; the
/// snapshot is trusted as delivered by the chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposureRecord {
    /// Total backing (own + nominators).
    pub total: Planck,
    /// The validator's self-bond.
    pub own: Planck,
    /// Nominator stakes, in chain order.
    #[serde(default)]
    pub others: Vec<NominatorStake>,
}

/// A `(validator, exposure)` pair from the era snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposureEntry {
    /// The validator stash.
    pub validator: Address,
    /// Its exposure for the era.
    pub exposure: ExposureRecord,
}

impl ExposureEntry {
    /// Convenience constructor.
    pub fn new(validator: impl Into<Address>, exposure: ExposureRecord) -> Self {
        Self {
            validator: validator.into(),
            exposure,
        }
    }
}

/// All validator exposures for a single era.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposureSnapshot {
    /// The era this snapshot describes.
    pub era: EraIndex,
    /// One entry per active validator.
    pub entries: Vec<ExposureEntry>,
}

impl ExposureSnapshot {
    /// Create a snapshot for `era`.
    #[must_use]
    pub fn new(era: EraIndex, entries: Vec<ExposureEntry>) -> Self {
        Self { era, entries }
    }

    /// Number of validators in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot has no validators.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of nominator sub-entries across all validators.
    #[must_use]
    pub fn nominator_entries(&self) -> usize {
        self.entries.iter().map(|e| e.exposure.others.len()).sum()
    }
}

// =============================================================================
// CLUSTER C: DERIVED OUTPUT
// =============================================================================

/// The queried account's stake behind one validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnStake {
    /// Validator the account backs.
    pub validator: Address,
    /// The account's stake behind it, in display units.
    pub value: DisplayAmount,
}

/// Per-validator view used for oversubscription display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staker {
    /// Validator stash.
    pub address: Address,
    /// Validator self-bond.
    pub own: Planck,
    /// Total backing.
    pub total: Planck,
    /// Nominator stakes, sorted ascending by value (stable).
    pub others: Vec<NominatorStake>,
    /// Smallest stake that still earns rewards, in display units.
    pub lowest_reward: DisplayAmount,
    /// Whether more nominators back this validator than are rewarded.
    pub oversubscribed: bool,
}

/// Aggregates derived from one era's exposure snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    /// Sum of every validator's `total`.
    pub total_staked: Planck,
    /// Smallest aggregated nominator stake, in display units.
    pub min_active_bond: DisplayAmount,
    /// Validators in the snapshot.
    pub active_validator_count: u32,
    /// Distinct nominator addresses across all validators.
    pub active_nominator_count: u32,
    /// The queried account's stake behind each validator it backs.
    pub own_stake_of_account: Vec<OwnStake>,
    /// Per-validator oversubscription view.
    pub stakers: Vec<Staker>,
}

/// Whether an account was exposed in a given era.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EraExposureVerdict {
    /// The era checked.
    pub era: EraIndex,
    /// True if the account is a validator or a nominator in any exposure.
    pub exposed: bool,
}
