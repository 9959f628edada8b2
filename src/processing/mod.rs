//! # Processing Module
//!
//! The dual-mode engine: a throughput-optimized batch processor draining a
//! bounded collection through a fixed worker pool, a latency-optimized stream
//! processor classifying one item at a time on the calling path, and a
//! comparison harness that runs both strategies over identical input and
//! reports the measured deltas. A queue worker ties the queue abstraction to
//! the stream processor with ack-after-record semantics.

pub mod batch;
pub mod comparison;
pub mod stream;
pub mod types;
pub mod worker;

pub use batch::{BatchOutcome, BatchProcessor};
pub use comparison::ProcessingComparison;
pub use stream::StreamProcessor;
pub use types::{
    ClassificationResult, ComparisonReport, Item, ProcessingMode, ProcessingStats, Winner,
};
pub use worker::{QueueWorker, ResultSink, SinkAck};
