//! # Processing Comparison Harness
//!
//! Runs one input set through both strategies and reports measured deltas.
//! Each invocation builds fresh processors (no stats cross-contamination)
//! sharing a single classifier instance so the numbers are comparable. The
//! two runs execute concurrently on separate processors; each run's timing
//! is self-contained.

use crate::classifier::SentimentClassifier;
use crate::config::{ComparisonConfig, EngineConfig};
use crate::error::{ProcessingError, ProcessingResult};
use crate::processing::batch::BatchProcessor;
use crate::processing::stream::StreamProcessor;
use crate::processing::types::{ComparisonReport, Item, ProcessingStats, Winner};
use crate::resilience::CircuitBreakerConfig;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// Batch-vs-stream comparison harness
pub struct ProcessingComparison {
    classifier: Arc<dyn SentimentClassifier>,
    comparison: ComparisonConfig,
    stream_window: usize,
    breaker_config: CircuitBreakerConfig,
}

impl ProcessingComparison {
    pub fn new(classifier: Arc<dyn SentimentClassifier>, config: &EngineConfig) -> Self {
        Self {
            classifier,
            comparison: config.comparison.clone(),
            stream_window: config.stream.window_size,
            breaker_config: config.breaker.clone(),
        }
    }

    /// Run both strategies over `items` and report the winner.
    ///
    /// Batch runs once over the full sequence; stream runs once per item,
    /// sequentially. Winner is decided by throughput for inputs at or above
    /// the configured size threshold and by per-item latency below it.
    pub async fn compare(
        &self,
        items: Vec<Item>,
        batch_worker_count: usize,
    ) -> ProcessingResult<ComparisonReport> {
        let input_size = items.len();
        info!(input_size, batch_worker_count, "🏁 Starting batch vs stream comparison");

        let batch = BatchProcessor::new(Arc::clone(&self.classifier), self.breaker_config.clone());
        // Window must cover the whole input or the stream stats would only
        // describe a suffix of the run
        let stream = StreamProcessor::new(
            Arc::clone(&self.classifier),
            self.stream_window.max(input_size),
            self.breaker_config.clone(),
        );

        let batch_items = items.clone();
        let batch_run = batch.process_batch(batch_items, batch_worker_count);
        let stream_run = async {
            for item in &items {
                stream.process_one(item).await?;
            }
            Ok::<(), ProcessingError>(())
        };

        let (batch_outcome, stream_outcome) = tokio::join!(batch_run, stream_run);
        let batch_outcome = batch_outcome?;
        stream_outcome?;

        let batch_stats = batch_outcome.stats;
        let stream_stats = stream.stats();
        let winner = self.decide(input_size, &batch_stats, &stream_stats);

        info!(
            winner = %winner,
            batch_throughput = batch_stats.throughput_items_per_sec,
            stream_throughput = stream_stats.throughput_items_per_sec,
            batch_avg_latency_ms = batch_stats.avg_latency_ms,
            stream_avg_latency_ms = stream_stats.avg_latency_ms,
            "🏆 Comparison complete"
        );

        Ok(ComparisonReport {
            batch_stats,
            stream_stats,
            input_size,
            winner,
            generated_at: Utc::now(),
        })
    }

    /// Throughput decides large inputs, per-item latency small ones; deltas
    /// within `tie_epsilon` (relative) are a tie.
    fn decide(
        &self,
        input_size: usize,
        batch: &ProcessingStats,
        stream: &ProcessingStats,
    ) -> Winner {
        if input_size == 0 {
            return Winner::Tie;
        }

        if input_size >= self.comparison.size_threshold {
            match compare_metric(
                batch.throughput_items_per_sec,
                stream.throughput_items_per_sec,
                self.comparison.tie_epsilon,
            ) {
                std::cmp::Ordering::Greater => Winner::Batch,
                std::cmp::Ordering::Less => Winner::Stream,
                std::cmp::Ordering::Equal => Winner::Tie,
            }
        } else {
            // Lower latency wins below the threshold
            match compare_metric(
                stream.avg_latency_ms,
                batch.avg_latency_ms,
                self.comparison.tie_epsilon,
            ) {
                std::cmp::Ordering::Greater => Winner::Batch,
                std::cmp::Ordering::Less => Winner::Stream,
                std::cmp::Ordering::Equal => Winner::Tie,
            }
        }
    }
}

/// Compare two metric values with a relative tie band
fn compare_metric(a: f64, b: f64, epsilon: f64) -> std::cmp::Ordering {
    let scale = a.abs().max(b.abs());
    if scale == 0.0 || ((a - b).abs() / scale) <= epsilon {
        return std::cmp::Ordering::Equal;
    }
    a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::LexiconClassifier;
    use crate::processing::types::ProcessingMode;

    fn harness() -> ProcessingComparison {
        ProcessingComparison::new(
            Arc::new(LexiconClassifier::default()),
            &EngineConfig::default(),
        )
    }

    fn stats(mode: ProcessingMode, throughput: f64, avg_latency: f64) -> ProcessingStats {
        ProcessingStats {
            throughput_items_per_sec: throughput,
            avg_latency_ms: avg_latency,
            ..ProcessingStats::empty(mode)
        }
    }

    #[test]
    fn test_throughput_decides_large_inputs() {
        let h = harness();
        let batch = stats(ProcessingMode::Batch, 200.0, 20.0);
        let stream = stats(ProcessingMode::Stream, 120.0, 8.0);
        // Stream has better latency, but 50 items is throughput territory
        assert_eq!(h.decide(50, &batch, &stream), Winner::Batch);
    }

    #[test]
    fn test_latency_decides_small_inputs() {
        let h = harness();
        let batch = stats(ProcessingMode::Batch, 200.0, 20.0);
        let stream = stats(ProcessingMode::Stream, 120.0, 8.0);
        assert_eq!(h.decide(5, &batch, &stream), Winner::Stream);
    }

    #[test]
    fn test_near_identical_metrics_tie() {
        let h = harness();
        let batch = stats(ProcessingMode::Batch, 100.0, 10.0);
        let stream = stats(ProcessingMode::Stream, 100.4, 10.0);
        assert_eq!(h.decide(50, &batch, &stream), Winner::Tie);
    }

    #[test]
    fn test_empty_input_ties() {
        let h = harness();
        let batch = ProcessingStats::empty(ProcessingMode::Batch);
        let stream = ProcessingStats::empty(ProcessingMode::Stream);
        assert_eq!(h.decide(0, &batch, &stream), Winner::Tie);
    }

    #[tokio::test]
    async fn test_compare_processes_every_item_in_both_modes() {
        let items = vec![
            Item::new("I love this!", "test"),
            Item::new("This is terrible.", "test"),
            Item::new("It is okay.", "test"),
        ];
        let report = harness().compare(items, 2).await.unwrap();

        assert_eq!(report.input_size, 3);
        assert_eq!(report.batch_stats.items_processed, 3);
        assert_eq!(report.stream_stats.items_processed, 3);
        assert_eq!(report.batch_stats.errors, 0);
        assert_eq!(report.stream_stats.errors, 0);
        assert!(matches!(
            report.winner,
            Winner::Batch | Winner::Stream | Winner::Tie
        ));
    }
}
