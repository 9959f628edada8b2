//! # Broker Queue Backend (pgmq)
//!
//! PostgreSQL-backed queue via the pgmq-rs crate. At-least-once delivery:
//! a dequeued message stays in the queue hidden behind its visibility
//! timeout until `ack` deletes it; a crash mid-processing makes the message
//! visible again for redelivery, which is why downstream processing must be
//! duplicate-safe.

use crate::config::QueueConfig;
use crate::messaging::errors::{QueueError, QueueResult};
use crate::messaging::message::{DeliveryToken, MessageId, QueueMessage};
use crate::messaging::queue::{QueueBackend, QueueBackendKind};
use crate::processing::types::Item;
use pgmq::{types::Message, PGMQueue};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// pgmq-backed queue client
pub struct BrokerQueue {
    pgmq: PGMQueue,
    queue_name: String,
    visibility_timeout_secs: i32,
    poll_interval: Duration,
}

impl BrokerQueue {
    /// Connect to the broker and ensure the queue exists.
    ///
    /// Callers bound this with their own connect timeout; see
    /// `SentimentQueue::connect`.
    pub async fn connect(config: &QueueConfig) -> QueueResult<Self> {
        info!(queue_name = %config.queue_name, "🚀 Connecting to pgmq broker");

        let pgmq = PGMQueue::new(config.broker_url.clone())
            .await
            .map_err(|e| QueueError::unavailable("broker", e.to_string()))?;

        pgmq.create(&config.queue_name)
            .await
            .map_err(|e| {
                QueueError::operation(config.queue_name.as_str(), "create", e.to_string())
            })?;

        info!(queue_name = %config.queue_name, "✅ Connected to pgmq broker");

        Ok(Self {
            pgmq,
            queue_name: config.queue_name.clone(),
            visibility_timeout_secs: config.visibility_timeout.as_secs().max(1) as i32,
            poll_interval: config.poll_interval,
        })
    }
}

#[async_trait::async_trait]
impl QueueBackend for BrokerQueue {
    async fn enqueue(&self, item: &Item) -> QueueResult<MessageId> {
        let msg_id = self
            .pgmq
            .send(&self.queue_name, item)
            .await
            .map_err(|e| QueueError::operation(self.queue_name.as_str(), "send", e.to_string()))?;

        debug!(queue_name = %self.queue_name, item_id = %item.id, msg_id = msg_id, "📤 Enqueued item");
        Ok(MessageId::Broker(msg_id))
    }

    async fn dequeue(&self, timeout: Duration) -> QueueResult<Option<QueueMessage>> {
        let deadline = Instant::now() + timeout;

        // pgmq reads are non-blocking; poll under the caller's deadline
        loop {
            let read: Option<Message<serde_json::Value>> = self
                .pgmq
                .read(&self.queue_name, Some(self.visibility_timeout_secs))
                .await
                .map_err(|e| {
                    QueueError::operation(self.queue_name.as_str(), "read", e.to_string())
                })?;

            if let Some(message) = read {
                let item: Item = serde_json::from_value(message.message)?;
                debug!(
                    queue_name = %self.queue_name,
                    item_id = %item.id,
                    msg_id = message.msg_id,
                    read_ct = message.read_ct,
                    "📥 Dequeued item"
                );
                return Ok(Some(QueueMessage {
                    item,
                    token: DeliveryToken::broker(message.msg_id),
                    enqueued_at: message.enqueued_at,
                    read_count: message.read_ct.max(0) as u32,
                }));
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            tokio::time::sleep(self.poll_interval.min(remaining)).await;
        }
    }

    async fn ack(&self, token: &DeliveryToken) -> QueueResult<()> {
        let MessageId::Broker(msg_id) = token.id else {
            return Err(QueueError::unknown_delivery(token.to_string()));
        };

        self.pgmq
            .delete(&self.queue_name, msg_id)
            .await
            .map_err(|e| {
                QueueError::operation(self.queue_name.as_str(), "delete", e.to_string())
            })?;

        debug!(queue_name = %self.queue_name, msg_id = msg_id, "✅ Message acked");
        Ok(())
    }

    async fn depth(&self) -> QueueResult<usize> {
        let row: (i64,) = sqlx::query_as("SELECT queue_length FROM pgmq.metrics($1)")
            .bind(&self.queue_name)
            .fetch_one(&self.pgmq.connection)
            .await
            .map_err(|e| {
                QueueError::operation(self.queue_name.as_str(), "metrics", e.to_string())
            })?;

        Ok(row.0.max(0) as usize)
    }

    fn kind(&self) -> QueueBackendKind {
        QueueBackendKind::Broker
    }
}
