//! # Offload Channel
//!
//! The caller-facing view of the bus: submit a task, listen for results.
//!
//! The channel gives no ordering or delivery guarantee and never filters
//! replies by relevance. Callers decide what is stale.

use crate::events::{EventFilter, OffloadEvent};
use crate::publisher::{EventPublisher, InMemoryOffloadBus};
use crate::subscriber::Subscription;
use async_trait::async_trait;
use shared_types::ipc::{OffloadReply, TaskKind, TaskRequest};
use shared_types::OffloadEnvelope;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

/// Submit computations to a worker and receive their results.
#[async_trait]
pub trait OffloadChannel: Send + Sync {
    /// Submit a task. Returns the correlation id the reply will carry.
    async fn submit(&self, task: TaskRequest) -> Uuid;

    /// Subscribe to results of one task kind.
    ///
    /// Subscribe before submitting; replies published earlier are not
    /// replayed.
    fn results(&self, kind: TaskKind) -> Subscription;
}

#[async_trait]
impl OffloadChannel for InMemoryOffloadBus {
    async fn submit(&self, task: TaskRequest) -> Uuid {
        let envelope = OffloadEnvelope::request(task);
        let correlation_id = envelope.correlation_id;
        self.publish(OffloadEvent::Request(envelope)).await;
        correlation_id
    }

    fn results(&self, kind: TaskKind) -> Subscription {
        self.subscribe(EventFilter::replies_for(kind))
    }
}

/// Invoke `handler` for every reply delivered to `subscription`.
///
/// The returned task ends when the bus is dropped; abort it to stop
/// listening earlier.
pub fn on_result<F>(mut subscription: Subscription, mut handler: F) -> JoinHandle<()>
where
    F: FnMut(OffloadReply) + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(event) = subscription.recv().await {
            if let OffloadEvent::Reply(reply) = event {
                handler(reply);
            }
        }
        debug!("Result handler finished (bus closed)");
    })
}
