//! # Queue Error Types
//!
//! Structured error handling for queue operations using thiserror. Broker
//! unreachability at startup is handled by fallback, not by these errors
//! escaping to callers.

use thiserror::Error;

/// Queue operation errors
#[derive(Error, Debug)]
pub enum QueueError {
    /// The backend rejected the operation or the broker became unreachable
    #[error("Queue unavailable ({backend}): {message}")]
    Unavailable { backend: String, message: String },

    /// The bounded in-process queue is full
    #[error("Queue {queue_name} at capacity ({capacity} messages)")]
    CapacityExceeded { queue_name: String, capacity: usize },

    /// A specific backend operation failed
    #[error("Queue operation failed: {queue_name}: {operation}: {message}")]
    Operation {
        queue_name: String,
        operation: String,
        message: String,
    },

    /// Message payload could not be serialized or deserialized
    #[error("Message serialization error: {message}")]
    Serialization { message: String },

    /// Ack presented a token the backend does not recognize (already acked,
    /// or redelivered to another consumer after the visibility timeout)
    #[error("Unknown delivery token: {token}")]
    UnknownDelivery { token: String },
}

impl QueueError {
    /// Create an unavailable error
    pub fn unavailable(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unavailable {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Create a capacity exceeded error
    pub fn capacity_exceeded(queue_name: impl Into<String>, capacity: usize) -> Self {
        Self::CapacityExceeded {
            queue_name: queue_name.into(),
            capacity,
        }
    }

    /// Create an operation error
    pub fn operation(
        queue_name: impl Into<String>,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Operation {
            queue_name: queue_name.into(),
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create an unknown delivery token error
    pub fn unknown_delivery(token: impl Into<String>) -> Self {
        Self::UnknownDelivery {
            token: token.into(),
        }
    }
}

impl From<serde_json::Error> for QueueError {
    fn from(err: serde_json::Error) -> Self {
        QueueError::serialization(err.to_string())
    }
}

/// Result type alias for queue operations
pub type QueueResult<T> = Result<T, QueueError>;
