//! # Stream Processor
//!
//! Latency-optimized single-item processing: each call classifies on the
//! calling path and returns as soon as that item is done. A rolling window of
//! recent calls backs `stats()`; all window mutation happens behind one lock
//! so concurrent callers never lose updates.

use crate::classifier::SentimentClassifier;
use crate::error::{ProcessingError, ProcessingResult};
use crate::processing::types::{ClassificationResult, Item, ProcessingMode, ProcessingStats};
use crate::resilience::{BreakerMetrics, CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy)]
struct Sample {
    latency_ms: f64,
    error: bool,
}

/// Latency-optimized single-item processor.
///
/// Safe to share across concurrent callers; every `process_one` call is
/// independent and no cross-call ordering is guaranteed.
pub struct StreamProcessor {
    classifier: Arc<dyn SentimentClassifier>,
    breaker: Arc<CircuitBreaker>,
    window_size: usize,
    window: Mutex<VecDeque<Sample>>,
}

impl StreamProcessor {
    pub fn new(
        classifier: Arc<dyn SentimentClassifier>,
        window_size: usize,
        breaker_config: CircuitBreakerConfig,
    ) -> Self {
        debug!(window_size, "🌊 Stream processor initialized");
        Self {
            classifier,
            breaker: Arc::new(CircuitBreaker::new("stream_classifier", breaker_config)),
            window_size: window_size.max(1),
            window: Mutex::new(VecDeque::new()),
        }
    }

    /// Classify one item immediately on the calling path.
    ///
    /// Latency is measured strictly around the classifier call. A single-item
    /// classification failure is absorbed into an error result and counted;
    /// only a consistently-failing classifier (open circuit) is an error.
    pub async fn process_one(&self, item: &Item) -> ProcessingResult<ClassificationResult> {
        let started = Instant::now();
        let outcome = self.breaker.call(|| self.classifier.classify(&item.text)).await;
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

        match outcome {
            Ok(classification) => {
                self.record(Sample {
                    latency_ms,
                    error: false,
                });
                Ok(ClassificationResult::classified(
                    item.id,
                    classification,
                    ProcessingMode::Stream,
                    latency_ms,
                ))
            }
            Err(CircuitBreakerError::CircuitOpen { component }) => Err(
                ProcessingError::processor_unavailable(format!("circuit open for {component}")),
            ),
            Err(CircuitBreakerError::OperationFailed(e)) => {
                warn!(item_id = %item.id, error = %e, "Stream classification failed");
                self.record(Sample {
                    latency_ms,
                    error: true,
                });
                Ok(ClassificationResult::failed(
                    item.id,
                    ProcessingMode::Stream,
                    latency_ms,
                    e.to_string(),
                ))
            }
        }
    }

    /// Classify with a per-call deadline. On expiry the call returns a
    /// `Timeout` error — distinct from classification errors — and the
    /// rolling window is left untouched.
    pub async fn process_one_with_timeout(
        &self,
        item: &Item,
        timeout: Duration,
    ) -> ProcessingResult<ClassificationResult> {
        match tokio::time::timeout(timeout, self.process_one(item)).await {
            Ok(result) => result,
            Err(_) => Err(ProcessingError::timeout(
                format!("classify item {}", item.id),
                timeout.as_millis() as u64,
            )),
        }
    }

    fn record(&self, sample: Sample) {
        let mut window = self.window.lock();
        window.push_back(sample);
        while window.len() > self.window_size {
            window.pop_front();
        }
    }

    /// Statistics over the rolling window of recent calls
    pub fn stats(&self) -> ProcessingStats {
        let window = self.window.lock();
        let latencies: Vec<f64> = window
            .iter()
            .filter(|s| !s.error)
            .map(|s| s.latency_ms)
            .collect();
        let errors = window.iter().filter(|s| s.error).count() as u64;
        // Accumulated classifier time, so throughput works out to 1/avg_latency
        let total_time_ms: f64 = latencies.iter().sum();
        ProcessingStats::from_latencies(ProcessingMode::Stream, &latencies, errors, total_time_ms)
    }

    /// Clear the rolling window
    pub fn reset(&self) {
        self.window.lock().clear();
        debug!("Stream statistics reset");
    }

    /// Snapshot of the classifier circuit breaker
    pub fn breaker_metrics(&self) -> BreakerMetrics {
        self.breaker.metrics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{LexiconClassifier, SentimentLabel};

    fn processor() -> StreamProcessor {
        StreamProcessor::new(
            Arc::new(LexiconClassifier::default()),
            100,
            CircuitBreakerConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_result_matches_item() {
        let stream = processor();
        let item = Item::new("I love this product!", "test");

        let result = stream.process_one(&item).await.unwrap();
        assert_eq!(result.item_id, item.id);
        assert_eq!(result.processing_mode, ProcessingMode::Stream);
        assert_eq!(result.label, SentimentLabel::Positive);
        assert!(result.latency_ms >= 0.0);
    }

    #[tokio::test]
    async fn test_stats_reflect_calls() {
        let stream = processor();
        for text in ["Great!", "Terrible.", "The sky is blue."] {
            stream.process_one(&Item::new(text, "test")).await.unwrap();
        }

        let stats = stream.stats();
        assert_eq!(stats.items_processed, 3);
        assert_eq!(stats.errors, 0);
        assert!(stats.avg_latency_ms >= 0.0);
        assert!(stats.p95_latency_ms >= stats.avg_latency_ms || stats.items_processed <= 1);
    }

    #[tokio::test]
    async fn test_window_caps_samples() {
        let stream = StreamProcessor::new(
            Arc::new(LexiconClassifier::default()),
            5,
            CircuitBreakerConfig::default(),
        );
        for _ in 0..12 {
            stream
                .process_one(&Item::new("Nice day today", "test"))
                .await
                .unwrap();
        }
        assert_eq!(stream.stats().items_processed, 5);
    }

    #[tokio::test]
    async fn test_reprocessing_is_idempotent() {
        let stream = processor();
        let item = Item::new("Amazing experience!", "test");

        let first = stream.process_one(&item).await.unwrap();
        let second = stream.process_one(&item).await.unwrap();

        assert_eq!(first.item_id, second.item_id);
        assert_eq!(first.label, second.label);
        assert_eq!(first.score, second.score);
        assert_eq!(stream.stats().items_processed, 2);
    }

    #[tokio::test]
    async fn test_reset_clears_window() {
        let stream = processor();
        stream.process_one(&Item::new("Great stuff", "test")).await.unwrap();
        assert_eq!(stream.stats().items_processed, 1);

        stream.reset();
        assert_eq!(stream.stats().items_processed, 0);
    }

    #[tokio::test]
    async fn test_concurrent_callers() {
        let stream = Arc::new(processor());
        let mut handles = Vec::new();
        for i in 0..8 {
            let stream = Arc::clone(&stream);
            handles.push(tokio::spawn(async move {
                stream
                    .process_one(&Item::new(format!("caller {i} loves this"), "test"))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(stream.stats().items_processed, 8);
    }
}
