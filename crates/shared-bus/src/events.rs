//! # Offload Events
//!
//! Defines the events that flow through the offload bus: requests travelling
//! to the exposure worker and replies travelling back.

use serde::{Deserialize, Serialize};
use shared_types::ipc::{OffloadReply, OffloadRequest, TaskKind};
use uuid::Uuid;

/// All events that can be published to the offload bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OffloadEvent {
    /// A computation request for the worker.
    /// Source: any caller | Target: exposure worker
    Request(OffloadRequest),

    /// A computation result.
    /// Source: exposure worker | Target: whoever still cares
    Reply(OffloadReply),
}

impl OffloadEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::Request(_) => EventTopic::Requests,
            Self::Reply(_) => EventTopic::Replies,
        }
    }

    /// Get the task kind carried by this event.
    #[must_use]
    pub fn task_kind(&self) -> TaskKind {
        match self {
            Self::Request(envelope) => envelope.payload.kind(),
            Self::Reply(envelope) => envelope.payload.kind(),
        }
    }

    /// Correlation id from the envelope.
    #[must_use]
    pub fn correlation_id(&self) -> Uuid {
        match self {
            Self::Request(envelope) => envelope.correlation_id,
            Self::Reply(envelope) => envelope.correlation_id,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Requests bound for the worker.
    Requests,
    /// Replies from the worker.
    Replies,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Task kinds to include. Empty means all kinds.
    pub task_kinds: Vec<TaskKind>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            task_kinds: Vec::new(),
        }
    }

    /// Create a filter for replies of one task kind.
    #[must_use]
    pub fn replies_for(kind: TaskKind) -> Self {
        Self {
            topics: vec![EventTopic::Replies],
            task_kinds: vec![kind],
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &OffloadEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let kind_match = self.task_kinds.is_empty() || self.task_kinds.contains(&event.task_kind());

        topic_match && kind_match
    }
}
