#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, pgmq in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Sentiment Core Rust
//!
//! High-performance Rust core for dual-mode sentiment processing.
//!
//! ## Overview
//!
//! This crate is the processing engine of a sentiment-analysis platform: it
//! ingests short text items, classifies each item's sentiment, and hands the
//! results to downstream collaborators. Ingestion clients, persistence, and
//! dashboards live outside this crate and consume it through narrow
//! interfaces.
//!
//! ## Architecture
//!
//! - **Queue abstraction**: a uniform enqueue/dequeue/ack contract over a
//!   pgmq broker (PostgreSQL) with transparent fallback to an in-process
//!   bounded queue when the broker is unreachable at startup.
//! - **Batch processor**: throughput-optimized draining of a bounded
//!   collection through a fixed-size worker pool, preserving input order.
//! - **Stream processor**: latency-optimized single-item classification with
//!   rolling-window statistics, safe under concurrent callers.
//! - **Comparison harness**: runs both strategies over identical input and
//!   reports measured throughput/latency deltas with a configurable winner
//!   threshold.
//! - **Resilience**: a circuit breaker isolates a consistently-failing
//!   classifier; isolated item failures are absorbed and counted instead.
//!
//! ## Module Organization
//!
//! - [`classifier`] - Sentiment classifier seam and the built-in lexicon scorer
//! - [`config`] - Configuration resolved once at startup
//! - [`error`] - Structured error handling
//! - [`logging`] - Environment-aware structured logging
//! - [`messaging`] - Queue backends and startup-resolved backend selection
//! - [`processing`] - Batch/stream processors, comparison harness, queue worker
//! - [`resilience`] - Circuit breaker protecting the classifier seam
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sentiment_core::classifier::LexiconClassifier;
//! use sentiment_core::config::EngineConfig;
//! use sentiment_core::processing::{Item, ProcessingComparison};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EngineConfig::default();
//! let classifier = Arc::new(LexiconClassifier::new(&config.classifier));
//!
//! let harness = ProcessingComparison::new(classifier, &config);
//! let items = vec![
//!     Item::new("I love this!", "api"),
//!     Item::new("This is terrible.", "api"),
//!     Item::new("It is okay.", "api"),
//! ];
//!
//! let report = harness.compare(items, 2).await?;
//! println!("winner: {} over {} items", report.winner, report.input_size);
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod config;
pub mod error;
pub mod logging;
pub mod messaging;
pub mod processing;
pub mod resilience;

pub use classifier::{Classification, LexiconClassifier, SentimentClassifier, SentimentLabel};
pub use config::{
    BatchConfig, ClassifierConfig, ComparisonConfig, EngineConfig, QueueConfig, StreamConfig,
};
pub use error::{ProcessingError, ProcessingResult};
pub use messaging::{QueueBackend, QueueBackendKind, QueueError, SentimentQueue};
pub use processing::{
    BatchOutcome, BatchProcessor, ClassificationResult, ComparisonReport, Item, ProcessingMode,
    ProcessingComparison, ProcessingStats, QueueWorker, ResultSink, SinkAck, StreamProcessor,
    Winner,
};
pub use resilience::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
