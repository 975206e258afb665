//! Service layer: cache persistence and the scan driver.

pub mod cache_store;
pub mod scanner;

pub use cache_store::ScanCacheStore;
pub use scanner::{ControlEvent, FastUnstakeScanner, ScanHandle};
