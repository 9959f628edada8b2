//! # Queue Message Envelope
//!
//! Wraps an [`Item`] with the delivery bookkeeping the queue contract needs:
//! a token for acking, the enqueue timestamp, and a read count. A message is
//! either *available* or *in-flight* (delivered, not yet acked); at most one
//! consumer holds an in-flight message at a time per backend contract.

use crate::processing::types::Item;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Backend-assigned message identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageId {
    /// pgmq message id
    Broker(i64),
    /// In-process delivery id
    Memory(Uuid),
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageId::Broker(id) => write!(f, "broker:{id}"),
            MessageId::Memory(id) => write!(f, "memory:{id}"),
        }
    }
}

/// Token identifying one delivery of one message. Consumers must ack only
/// after the corresponding result is durably recorded downstream; an unacked
/// delivery becomes available again after the visibility timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeliveryToken {
    pub id: MessageId,
}

impl DeliveryToken {
    pub fn broker(msg_id: i64) -> Self {
        Self {
            id: MessageId::Broker(msg_id),
        }
    }

    pub fn memory(id: Uuid) -> Self {
        Self {
            id: MessageId::Memory(id),
        }
    }
}

impl std::fmt::Display for DeliveryToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// A delivered queue message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueMessage {
    pub item: Item,
    pub token: DeliveryToken,
    pub enqueued_at: DateTime<Utc>,
    /// Times this message has been delivered; > 1 marks a redelivery
    pub read_count: u32,
}

impl QueueMessage {
    /// Whether this delivery is a redelivery of a previously-read message
    pub fn is_redelivery(&self) -> bool {
        self.read_count > 1
    }
}
