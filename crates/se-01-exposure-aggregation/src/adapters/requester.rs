//! Aggregation requester
//!
//! Caller side of the `initialise_exposures` task: submits a snapshot through
//! the offload channel and waits for the reply carrying the same
//! correlation id. Replies to other requests are skipped.

use async_trait::async_trait;
use shared_bus::{OffloadChannel, OffloadEvent};
use shared_types::{AggregateResult, InitialiseExposuresPayload, TaskKind, TaskRequest, TaskResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::error::AggregationError;
use crate::ports::AggregationRequestApi;

/// Requests aggregations from the offload worker.
pub struct AggregationRequester {
    channel: Arc<dyn OffloadChannel>,
    timeout: Duration,
}

impl AggregationRequester {
    /// Create a requester that waits at most `timeout` per request.
    pub fn new(channel: Arc<dyn OffloadChannel>, timeout: Duration) -> Self {
        Self { channel, timeout }
    }
}

#[async_trait]
impl AggregationRequestApi for AggregationRequester {
    async fn request_aggregate(
        &self,
        payload: InitialiseExposuresPayload,
    ) -> Result<AggregateResult, AggregationError> {
        // Subscribe before submitting so the reply cannot be missed.
        let mut results = self.channel.results(TaskKind::InitialiseExposures);
        let correlation_id = self
            .channel
            .submit(TaskRequest::InitialiseExposures(payload))
            .await;

        let wait = async {
            while let Some(event) = results.recv().await {
                let OffloadEvent::Reply(reply) = event else {
                    continue;
                };
                if !reply.answers(correlation_id) {
                    debug!(
                        expected = %correlation_id,
                        got = %reply.correlation_id,
                        "Skipping reply for another request"
                    );
                    continue;
                }
                if let TaskResult::InitialiseExposures(result) = reply.payload {
                    return Ok(result.into_aggregate());
                }
            }
            Err(AggregationError::Bus("offload bus closed".to_string()))
        };

        tokio::time::timeout(self.timeout, wait)
            .await
            .map_err(|_| AggregationError::NoReply {
                task: TaskKind::InitialiseExposures,
                waited_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            })?
    }
}
