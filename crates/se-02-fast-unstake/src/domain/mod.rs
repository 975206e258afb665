//! Domain layer: scan cache rules and the scan state machine, no I/O.

pub mod cache;
pub mod config;
pub mod machine;
pub mod session;

pub use cache::{cache_key, validate, window_len, CacheValidation, InvalidReason, ScanCacheRecord};
pub use config::{ScannerConfig, DEFAULT_CACHE_KEY_SUFFIX};
pub use machine::{ScanAction, ScanMachine, ScanState, Transition};
pub use session::{ScanPreconditions, ScanTarget};
