//! # `OffloadEnvelope` Wrapper
//!
//! The wrapper for every message crossing the offload channel.
//!
//! ## Correlation
//!
//! - Requests carry a freshly generated `correlation_id`.
//! - Replies carry the `correlation_id` of the request that produced them.
//! - Callers compare the echoed id (or the session token inside the payload)
//!   against live state and drop anything that no longer matches. The
//!   channel itself never filters.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope around an offload request or reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffloadEnvelope<T> {
    /// Protocol version for forward compatibility.
    pub version: u16,

    /// Identifier shared by a request and its reply.
    pub correlation_id: Uuid,

    /// Unix timestamp (milliseconds) when the message was created.
    pub timestamp_ms: u64,

    /// The message payload.
    pub payload: T,
}

impl<T> OffloadEnvelope<T> {
    /// Current protocol version.
    pub const CURRENT_VERSION: u16 = 1;

    /// Wrap a new request with a fresh correlation id.
    pub fn request(payload: T) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            correlation_id: Uuid::new_v4(),
            timestamp_ms: now_ms(),
            payload,
        }
    }

    /// Wrap a reply to the request with `correlation_id`.
    pub fn reply(correlation_id: Uuid, payload: T) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            correlation_id,
            timestamp_ms: now_ms(),
            payload,
        }
    }

    /// Whether this envelope answers the request with `correlation_id`.
    #[must_use]
    pub fn answers(&self, correlation_id: Uuid) -> bool {
        self.correlation_id == correlation_id
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
