//! # Shared Bus - Offload Channel
//!
//! Carries computation requests to the exposure worker and its replies back
//! to whoever asked.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐   submit()   ┌──────────────┐   Request   ┌──────────────┐
//! │ Scanner /    │ ───────────▶ │  Offload Bus │ ──────────▶ │   Exposure   │
//! │ Dashboard    │ ◀─────────── │  (broadcast) │ ◀────────── │    Worker    │
//! └──────────────┘  results()   └──────────────┘    Reply    └──────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - **Correlation:** every request gets a fresh `correlation_id`; the reply
//!   echoes it along with the payload's own correlation fields.
//! - **No Ordering:** replies may arrive in any order, late, or not at all.
//! - **No Relevance Filtering:** callers drop replies for sessions that are
//!   no longer live.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod channel;
pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use channel::{on_result, OffloadChannel};
pub use events::{EventFilter, EventTopic, OffloadEvent};
pub use publisher::{EventPublisher, InMemoryOffloadBus};
pub use subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before the oldest are dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
