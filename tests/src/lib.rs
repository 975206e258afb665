//! # Staking Exposure Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Synthetic era snapshots
//! │
//! └── integration/      # Cross-crate flows over one offload bus
//!     ├── flows.rs          # Aggregation and scanning side by side
//!     └── scan_lifecycle.rs # Restart, resume and cancellation
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p se-tests
//!
//! # By category
//! cargo test -p se-tests integration::flows
//! cargo test -p se-tests integration::scan_lifecycle
//!
//! # Benchmarks
//! cargo bench -p se-tests
//! ```

pub mod fixtures;
pub mod integration;
