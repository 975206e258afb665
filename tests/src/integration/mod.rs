//! # Integration Tests
//!
//! Cross-crate flows with the real offload worker on an in-memory bus.

pub mod flows;
pub mod scan_lifecycle;
