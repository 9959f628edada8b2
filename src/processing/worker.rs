//! # Queue Worker
//!
//! Ties the queue abstraction to the stream processor: dequeue, classify,
//! hand the result to the storage collaborator, then ack. The ack comes only
//! after the sink durably records the result, so a crash mid-processing
//! causes redelivery rather than loss; reprocessing is idempotent and a sink
//! reporting a duplicate still acks.

use crate::error::{ProcessingError, ProcessingResult};
use crate::messaging::SentimentQueue;
use crate::processing::stream::StreamProcessor;
use crate::processing::types::ClassificationResult;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Outcome of recording one result downstream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkAck {
    /// Result durably recorded
    Recorded,
    /// The sink already holds a result for this item id (redelivery)
    Duplicate,
}

/// Narrow interface to the storage collaborator. The core never persists
/// results itself; it hands them over and lets the sink decide.
#[async_trait::async_trait]
pub trait ResultSink: Send + Sync {
    async fn record(&self, result: &ClassificationResult) -> ProcessingResult<SinkAck>;
}

/// Queue-draining consumer built on the stream processor
pub struct QueueWorker {
    queue: SentimentQueue,
    processor: StreamProcessor,
    sink: Arc<dyn ResultSink>,
    dequeue_timeout: Duration,
}

impl QueueWorker {
    pub fn new(
        queue: SentimentQueue,
        processor: StreamProcessor,
        sink: Arc<dyn ResultSink>,
        dequeue_timeout: Duration,
    ) -> Self {
        Self {
            queue,
            processor,
            sink,
            dequeue_timeout,
        }
    }

    /// Dequeue, classify, and record up to `max_items` items. Stops early
    /// when the queue stays empty past the dequeue timeout. Returns the
    /// number of items acked.
    pub async fn drain(&self, max_items: usize) -> ProcessingResult<usize> {
        let mut handled = 0;

        for _ in 0..max_items {
            let Some(message) = self.queue.dequeue(self.dequeue_timeout).await? else {
                break;
            };

            if message.is_redelivery() {
                debug!(
                    item_id = %message.item.id,
                    read_count = message.read_count,
                    "🔁 Reprocessing redelivered item"
                );
            }

            let result = self.processor.process_one(&message.item).await?;

            match self.sink.record(&result).await {
                Ok(SinkAck::Recorded) => {
                    self.queue.ack(&message.token).await?;
                    handled += 1;
                }
                Ok(SinkAck::Duplicate) => {
                    // Same item id, same deterministic result: safe to ack
                    debug!(item_id = %result.item_id, "Sink already holds this item, acking");
                    self.queue.ack(&message.token).await?;
                    handled += 1;
                }
                Err(ProcessingError::DuplicateDelivery { item_id }) => {
                    debug!(item_id = %item_id, "Sink rejected duplicate delivery, acking");
                    self.queue.ack(&message.token).await?;
                    handled += 1;
                }
                Err(e) => {
                    // No ack: the message becomes visible again after its
                    // visibility timeout and will be redelivered
                    warn!(
                        item_id = %result.item_id,
                        error = %e,
                        "Sink failed, leaving message for redelivery"
                    );
                    return Err(e);
                }
            }
        }

        if handled > 0 {
            info!(handled, "📊 Queue drain pass complete");
        }
        Ok(handled)
    }

    /// Rolling statistics of the underlying stream processor
    pub fn stats(&self) -> crate::processing::types::ProcessingStats {
        self.processor.stats()
    }
}
