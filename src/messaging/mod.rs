//! # Messaging Module
//!
//! Uniform enqueue/dequeue/ack contract over two interchangeable queue
//! backends: a pgmq broker (PostgreSQL) and an in-process bounded FIFO.
//! Backend selection happens exactly once at startup via
//! [`SentimentQueue::connect`]; after that the two backends are
//! indistinguishable to callers.

pub mod broker;
pub mod errors;
pub mod memory_queue;
pub mod message;
pub mod queue;

pub use broker::BrokerQueue;
pub use errors::{QueueError, QueueResult};
pub use memory_queue::MemoryQueue;
pub use message::{DeliveryToken, MessageId, QueueMessage};
pub use queue::{QueueBackend, QueueBackendKind, SentimentQueue};
