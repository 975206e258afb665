//! # Event Publisher
//!
//! Defines the publishing side of the offload bus.

use crate::events::{EventFilter, OffloadEvent};
use crate::subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionGuard};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Trait for publishing events to the bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event to the bus.
    ///
    /// # Returns
    ///
    /// The number of active subscribers that received the event.
    async fn publish(&self, event: OffloadEvent) -> usize;

    /// Get the total number of events published.
    fn events_published(&self) -> u64;
}

/// In-memory implementation of the offload bus.
///
/// Uses `tokio::sync::broadcast` for multi-producer, multi-consumer
/// semantics. Delivery is best effort: an event published while nobody is
/// subscribed is dropped, and a lagging subscriber loses the oldest events.
pub struct InMemoryOffloadBus {
    /// Broadcast sender for events.
    sender: broadcast::Sender<OffloadEvent>,

    /// Active subscription count by filter.
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,

    /// Total events published.
    events_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl InMemoryOffloadBus {
    /// Create a new in-memory bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new in-memory bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to events matching a filter.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        let receiver = self.sender.subscribe();
        let topic_key = filter_key(&filter);

        if let Ok(mut subs) = self.subscriptions.write() {
            *subs.entry(topic_key.clone()).or_insert(0) += 1;
        }

        debug!(topics = ?filter.topics, kinds = ?filter.task_kinds, "New subscription created");

        Subscription::new(
            receiver,
            filter,
            SubscriptionGuard::new(self.subscriptions.clone(), topic_key),
        )
    }

    /// Get a stream of events matching a filter.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.subscribe(filter))
    }

    /// Get the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Number of live subscriptions created with an equivalent filter.
    #[must_use]
    pub fn subscriptions_for(&self, filter: &EventFilter) -> usize {
        self.subscriptions
            .read()
            .ok()
            .and_then(|subs| subs.get(&filter_key(filter)).copied())
            .unwrap_or(0)
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

fn filter_key(filter: &EventFilter) -> String {
    format!("{:?}/{:?}", filter.topics, filter.task_kinds)
}

impl Default for InMemoryOffloadBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSubscriber for InMemoryOffloadBus {
    fn subscribe(&self, filter: EventFilter) -> Subscription {
        InMemoryOffloadBus::subscribe(self, filter)
    }
}

#[async_trait]
impl EventPublisher for InMemoryOffloadBus {
    async fn publish(&self, event: OffloadEvent) -> usize {
        let topic = event.topic();
        let task = event.task_kind();
        let correlation_id = event.correlation_id();

        // Always increment counter (event was attempted)
        self.events_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(event) {
            Ok(receiver_count) => {
                debug!(
                    topic = ?topic,
                    task = %task,
                    correlation_id = %correlation_id,
                    receivers = receiver_count,
                    "Event published"
                );
                receiver_count
            }
            Err(e) => {
                warn!(
                    topic = ?topic,
                    task = %task,
                    correlation_id = %correlation_id,
                    error = %e,
                    "Event dropped (no receivers)"
                );
                0
            }
        }
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
