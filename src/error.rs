//! # Processing Error Types
//!
//! Structured error handling for the processing engine using thiserror.
//! Per-item classification failures are absorbed into result sets and counted;
//! the variants here represent failures that must surface to the caller.

use crate::messaging::errors::QueueError;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the batch/stream processors and the comparison harness.
#[derive(Error, Debug)]
pub enum ProcessingError {
    /// Single-item classification failure. Processors absorb these into error
    /// entries; the variant exists for callers that classify directly.
    #[error("Classification failed for item {item_id}: {message}")]
    Classification { item_id: Uuid, message: String },

    /// The classifier is consistently failing (circuit open). Fatal for the
    /// current run; propagated to the immediate caller.
    #[error("Processor unavailable: {message}")]
    ProcessorUnavailable { message: String },

    /// A per-call deadline expired. Distinct from classification errors.
    #[error("Operation {operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    /// The networked queue redelivered an item a sink already recorded.
    /// Re-emitting the same result for the same item id is safe.
    #[error("Duplicate delivery of item {item_id}")]
    DuplicateDelivery { item_id: Uuid },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error(transparent)]
    Queue(#[from] QueueError),
}

impl ProcessingError {
    /// Create a classification error for a single item
    pub fn classification(item_id: Uuid, message: impl Into<String>) -> Self {
        Self::Classification {
            item_id,
            message: message.into(),
        }
    }

    /// Create a processor unavailable error
    pub fn processor_unavailable(message: impl Into<String>) -> Self {
        Self::ProcessorUnavailable {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Create a duplicate delivery error
    pub fn duplicate_delivery(item_id: Uuid) -> Self {
        Self::DuplicateDelivery { item_id }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// Result type alias for processing operations
pub type ProcessingResult<T> = Result<T, ProcessingError>;
