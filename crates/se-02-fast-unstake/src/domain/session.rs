//! Scan preconditions and the target a scan runs against.

use shared_types::{Address, EraIndex, NetworkId};

/// What the scanner knows about the account and chain before starting.
///
/// Every field comes from an upstream source that may still be loading;
/// `None` means "not known yet".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPreconditions {
    /// The account to scan.
    pub account: Option<Address>,
    /// The network the account lives on.
    pub network: Option<NetworkId>,
    /// Whether the chain connection is ready.
    pub network_ready: bool,
    /// The chain's active era.
    pub active_era: Option<EraIndex>,
    /// Unlock duration in eras.
    pub lookback_eras: Option<EraIndex>,
    /// Whether the account has nominations.
    pub is_nominating: bool,
    /// Whether any of those nominations is earning in the active era.
    pub has_active_nominations: bool,
}

impl ScanPreconditions {
    /// Whether a scan may start.
    ///
    /// Only an account that nominates but is not active in the current era
    /// is worth scanning.
    #[must_use]
    pub fn ready_to_scan(&self) -> bool {
        self.target().is_some()
    }

    /// The scan target, if every precondition holds.
    #[must_use]
    pub fn target(&self) -> Option<ScanTarget> {
        if !self.network_ready || !self.is_nominating || self.has_active_nominations {
            return None;
        }
        Some(ScanTarget {
            account: self.account.clone()?,
            network: self.network.clone()?,
            current_era: self.active_era?,
            lookback_eras: self.lookback_eras?,
        })
    }
}

/// Account, network and era window of one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTarget {
    /// Account being scanned.
    pub account: Address,
    /// Its network.
    pub network: NetworkId,
    /// Active era when the scan started.
    pub current_era: EraIndex,
    /// Eras to look back beyond `current_era`.
    pub lookback_eras: EraIndex,
}
