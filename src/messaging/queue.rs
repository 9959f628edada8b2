//! # Queue Facade and Backend Contract
//!
//! [`SentimentQueue`] resolves its backend exactly once: at startup it
//! attempts the pgmq broker connection under a bounded timeout and falls back
//! to the in-process queue on any failure (connection refused, DNS failure,
//! timeout). The decision is never revisited per-call, so an unreachable
//! broker costs one bounded attempt rather than a latency spike on every
//! operation.

use crate::config::QueueConfig;
use crate::logging::log_queue_event;
use crate::messaging::broker::BrokerQueue;
use crate::messaging::errors::QueueResult;
use crate::messaging::memory_queue::MemoryQueue;
use crate::messaging::message::{DeliveryToken, MessageId, QueueMessage};
use crate::processing::types::Item;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Which backend a queue resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueBackendKind {
    Broker,
    Memory,
}

impl std::fmt::Display for QueueBackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueBackendKind::Broker => write!(f, "broker"),
            QueueBackendKind::Memory => write!(f, "memory"),
        }
    }
}

/// Uniform queue backend contract.
///
/// Both backends deliver messages with a token; a message stays in-flight
/// until `ack` and becomes available again once its visibility timeout
/// expires. `depth` is approximate by design.
#[async_trait::async_trait]
pub trait QueueBackend: Send + Sync {
    async fn enqueue(&self, item: &Item) -> QueueResult<MessageId>;

    /// Blocking dequeue: waits until a message is available or the timeout
    /// elapses, returning `None` after the timeout.
    async fn dequeue(&self, timeout: Duration) -> QueueResult<Option<QueueMessage>>;

    async fn ack(&self, token: &DeliveryToken) -> QueueResult<()>;

    async fn depth(&self) -> QueueResult<usize>;

    fn kind(&self) -> QueueBackendKind;
}

/// Queue handle with startup-resolved backend selection.
#[derive(Clone)]
pub struct SentimentQueue {
    backend: Arc<dyn QueueBackend>,
    degraded: bool,
}

impl SentimentQueue {
    /// Resolve the backend once: try the broker under `connect_timeout`, fall
    /// back to the in-process queue on any failure. Never fails — degraded
    /// operation is the failure mode.
    pub async fn connect(config: &QueueConfig) -> Self {
        match tokio::time::timeout(config.connect_timeout, BrokerQueue::connect(config)).await {
            Ok(Ok(broker)) => {
                log_queue_event("connect", "broker", &config.queue_name, "connected", None);
                Self {
                    backend: Arc::new(broker),
                    degraded: false,
                }
            }
            Ok(Err(e)) => {
                warn!(
                    error = %e,
                    queue_name = %config.queue_name,
                    "⚠️ Broker unreachable, falling back to in-process queue"
                );
                log_queue_event(
                    "connect",
                    "memory",
                    &config.queue_name,
                    "degraded",
                    Some("broker unreachable"),
                );
                Self {
                    backend: Arc::new(MemoryQueue::new(config)),
                    degraded: true,
                }
            }
            Err(_) => {
                warn!(
                    connect_timeout_ms = config.connect_timeout.as_millis() as u64,
                    queue_name = %config.queue_name,
                    "⚠️ Broker connection timed out, falling back to in-process queue"
                );
                log_queue_event(
                    "connect",
                    "memory",
                    &config.queue_name,
                    "degraded",
                    Some("broker connection timed out"),
                );
                Self {
                    backend: Arc::new(MemoryQueue::new(config)),
                    degraded: true,
                }
            }
        }
    }

    /// Build an in-process queue directly, without attempting the broker.
    pub fn in_memory(config: &QueueConfig) -> Self {
        info!(queue_name = %config.queue_name, "📬 Using in-process queue backend");
        Self {
            backend: Arc::new(MemoryQueue::new(config)),
            degraded: false,
        }
    }

    /// Which backend this queue resolved to
    pub fn backend_kind(&self) -> QueueBackendKind {
        self.backend.kind()
    }

    /// Whether broker connection failed at startup and the queue is running
    /// on the in-process fallback
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub async fn enqueue(&self, item: &Item) -> QueueResult<MessageId> {
        self.backend.enqueue(item).await
    }

    pub async fn dequeue(&self, timeout: Duration) -> QueueResult<Option<QueueMessage>> {
        self.backend.dequeue(timeout).await
    }

    pub async fn ack(&self, token: &DeliveryToken) -> QueueResult<()> {
        self.backend.ack(token).await
    }

    pub async fn depth(&self) -> QueueResult<usize> {
        self.backend.depth().await
    }
}
