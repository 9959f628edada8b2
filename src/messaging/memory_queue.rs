//! # In-Process Queue Backend
//!
//! Bounded FIFO standing in for the broker when it is unreachable. Dequeue
//! blocks until a message arrives or the timeout elapses, waking on enqueue.
//! In-flight deliveries are tracked and lazily requeued once their visibility
//! timeout expires, so the ack contract matches the broker's.
//!
//! Limitations, by contract: single-process visibility only, no persistence
//! across restarts, and at-least-once delivery is *not* guaranteed across
//! crashes.

use crate::config::QueueConfig;
use crate::messaging::errors::{QueueError, QueueResult};
use crate::messaging::message::{DeliveryToken, MessageId, QueueMessage};
use crate::messaging::queue::{QueueBackend, QueueBackendKind};
use crate::processing::types::Item;
use chrono::Utc;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Notify};
use tracing::{debug, warn};
use uuid::Uuid;

struct InFlight {
    message: QueueMessage,
    redeliver_at: Instant,
}

/// Thread-safe bounded in-process queue
pub struct MemoryQueue {
    queue_name: String,
    capacity: usize,
    visibility_timeout: Duration,
    available: Mutex<VecDeque<QueueMessage>>,
    in_flight: DashMap<Uuid, InFlight>,
    notify: Notify,
}

impl MemoryQueue {
    pub fn new(config: &QueueConfig) -> Self {
        debug!(
            queue_name = %config.queue_name,
            capacity = config.capacity,
            "📬 In-process queue initialized"
        );
        Self {
            queue_name: config.queue_name.clone(),
            capacity: config.capacity,
            visibility_timeout: config.visibility_timeout,
            available: Mutex::new(VecDeque::new()),
            in_flight: DashMap::new(),
            notify: Notify::new(),
        }
    }

    /// Move expired in-flight deliveries back to the available queue.
    /// Runs lazily on every dequeue attempt instead of a background task.
    async fn requeue_expired(&self) {
        let now = Instant::now();
        let expired: Vec<Uuid> = self
            .in_flight
            .iter()
            .filter(|entry| entry.value().redeliver_at <= now)
            .map(|entry| *entry.key())
            .collect();

        if expired.is_empty() {
            return;
        }

        let mut available = self.available.lock().await;
        for id in expired {
            if let Some((_, entry)) = self.in_flight.remove(&id) {
                warn!(
                    queue_name = %self.queue_name,
                    item_id = %entry.message.item.id,
                    read_count = entry.message.read_count,
                    "🔁 Visibility timeout expired, requeueing unacked message"
                );
                available.push_back(entry.message);
            }
        }
        self.notify.notify_one();
    }
}

#[async_trait::async_trait]
impl QueueBackend for MemoryQueue {
    async fn enqueue(&self, item: &Item) -> QueueResult<MessageId> {
        let mut available = self.available.lock().await;
        if available.len() >= self.capacity {
            return Err(QueueError::capacity_exceeded(
                self.queue_name.as_str(),
                self.capacity,
            ));
        }

        let id = Uuid::new_v4();
        available.push_back(QueueMessage {
            item: item.clone(),
            token: DeliveryToken::memory(id),
            enqueued_at: Utc::now(),
            read_count: 0,
        });
        drop(available);

        self.notify.notify_one();
        debug!(queue_name = %self.queue_name, item_id = %item.id, "📤 Enqueued item");
        Ok(MessageId::Memory(id))
    }

    async fn dequeue(&self, timeout: Duration) -> QueueResult<Option<QueueMessage>> {
        let deadline = Instant::now() + timeout;

        loop {
            self.requeue_expired().await;

            {
                let mut available = self.available.lock().await;
                if let Some(mut message) = available.pop_front() {
                    drop(available);
                    message.read_count += 1;
                    let MessageId::Memory(id) = message.token.id else {
                        return Err(QueueError::operation(
                            self.queue_name.as_str(),
                            "dequeue",
                            "non-memory token in in-process queue",
                        ));
                    };
                    self.in_flight.insert(
                        id,
                        InFlight {
                            message: message.clone(),
                            redeliver_at: Instant::now() + self.visibility_timeout,
                        },
                    );
                    debug!(
                        queue_name = %self.queue_name,
                        item_id = %message.item.id,
                        read_count = message.read_count,
                        "📥 Dequeued item"
                    );
                    return Ok(Some(message));
                }
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }

            // Wake on enqueue or when the remaining time runs out; the loop
            // re-checks the queue before declaring a timeout either way
            let _ = tokio::time::timeout(remaining, self.notify.notified()).await;
        }
    }

    async fn ack(&self, token: &DeliveryToken) -> QueueResult<()> {
        let MessageId::Memory(id) = token.id else {
            return Err(QueueError::unknown_delivery(token.to_string()));
        };

        match self.in_flight.remove(&id) {
            Some(_) => {
                debug!(queue_name = %self.queue_name, token = %token, "✅ Message acked");
                Ok(())
            }
            None => Err(QueueError::unknown_delivery(token.to_string())),
        }
    }

    async fn depth(&self) -> QueueResult<usize> {
        Ok(self.available.lock().await.len())
    }

    fn kind(&self) -> QueueBackendKind {
        QueueBackendKind::Memory
    }
}
