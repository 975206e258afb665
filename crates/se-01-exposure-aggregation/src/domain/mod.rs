//! Domain layer: pure aggregation logic, no I/O.

pub mod aggregate;
pub mod config;
pub mod fast_unstake_era;
pub mod oversubscription;

pub use aggregate::{aggregate, initialise_exposures, AggregationParams};
pub use config::{OffloadWorkerConfig, MAX_EXPOSURES_LIMIT};
pub use fast_unstake_era::{is_exposed, process_era};
pub use oversubscription::{lowest_rewarded_index, reward_cutoff, staker_view, RewardCutoff};
