//! # Batch Processor
//!
//! Drains a bounded collection through a fixed-size worker pool, optimized
//! for throughput. Workers claim items through a shared atomic cursor and
//! feed completions through a bounded channel into a pre-sized,
//! index-addressed slot array, so the returned sequence preserves input
//! order despite out-of-order completion.

use crate::classifier::SentimentClassifier;
use crate::error::{ProcessingError, ProcessingResult};
use crate::logging::log_processing_run;
use crate::processing::types::{ClassificationResult, Item, ProcessingMode, ProcessingStats};
use crate::resilience::{BreakerMetrics, CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Outcome of one batch run
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// One result per dispatched item, in input order. Same length as the
    /// input when `complete` is true.
    pub results: Vec<ClassificationResult>,
    pub stats: ProcessingStats,
    /// False when a deadline stopped dispatch before every item ran
    pub complete: bool,
}

/// Throughput-optimized parallel processor
pub struct BatchProcessor {
    classifier: Arc<dyn SentimentClassifier>,
    breaker: Arc<CircuitBreaker>,
}

impl BatchProcessor {
    pub fn new(
        classifier: Arc<dyn SentimentClassifier>,
        breaker_config: CircuitBreakerConfig,
    ) -> Self {
        Self {
            classifier,
            breaker: Arc::new(CircuitBreaker::new("batch_classifier", breaker_config)),
        }
    }

    /// Process every item and return results in input order.
    pub async fn process_batch(
        &self,
        items: Vec<Item>,
        worker_count: usize,
    ) -> ProcessingResult<BatchOutcome> {
        self.process_batch_with_deadline(items, worker_count, None).await
    }

    /// Process with cooperative cancellation: once `deadline` elapses no new
    /// items are dispatched; already-running classifications finish and the
    /// outcome carries `complete = false`.
    pub async fn process_batch_with_deadline(
        &self,
        items: Vec<Item>,
        worker_count: usize,
        deadline: Option<Duration>,
    ) -> ProcessingResult<BatchOutcome> {
        if items.is_empty() {
            return Ok(BatchOutcome {
                results: Vec::new(),
                stats: ProcessingStats::empty(ProcessingMode::Batch),
                complete: true,
            });
        }

        let input_size = items.len();
        let workers = clamp_worker_count(worker_count, input_size);
        debug!(
            input_size,
            requested_workers = worker_count,
            workers,
            "🏭 Starting batch run"
        );

        let items = Arc::new(items);
        let cursor = Arc::new(AtomicUsize::new(0));
        let fatal = Arc::new(AtomicBool::new(false));
        let run_started = Instant::now();
        let cutoff = deadline.map(|d| run_started + d);

        let (tx, mut rx) = mpsc::channel::<(usize, ClassificationResult)>(workers * 2);

        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let items = Arc::clone(&items);
            let cursor = Arc::clone(&cursor);
            let fatal = Arc::clone(&fatal);
            let classifier = Arc::clone(&self.classifier);
            let breaker = Arc::clone(&self.breaker);
            let tx = tx.clone();

            handles.push(tokio::spawn(async move {
                loop {
                    if fatal.load(Ordering::Acquire) {
                        break;
                    }
                    if let Some(cutoff) = cutoff {
                        if Instant::now() >= cutoff {
                            debug!(worker_id, "⏱️ Deadline reached, stopping dispatch");
                            break;
                        }
                    }

                    let idx = cursor.fetch_add(1, Ordering::SeqCst);
                    if idx >= items.len() {
                        break;
                    }

                    let item = &items[idx];
                    let started = Instant::now();
                    let outcome = breaker.call(|| classifier.classify(&item.text)).await;
                    let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

                    let result = match outcome {
                        Ok(classification) => ClassificationResult::classified(
                            item.id,
                            classification,
                            ProcessingMode::Batch,
                            latency_ms,
                        ),
                        Err(CircuitBreakerError::CircuitOpen { .. }) => {
                            fatal.store(true, Ordering::Release);
                            break;
                        }
                        Err(CircuitBreakerError::OperationFailed(e)) => {
                            warn!(item_id = %item.id, error = %e, "Item classification failed, continuing batch");
                            ClassificationResult::failed(
                                item.id,
                                ProcessingMode::Batch,
                                latency_ms,
                                e.to_string(),
                            )
                        }
                    };

                    if tx.send((idx, result)).await.is_err() {
                        break;
                    }
                }
            }));
        }
        drop(tx);

        // Fan-in: collect completions into index-addressed slots
        let mut slots: Vec<Option<ClassificationResult>> = vec![None; input_size];
        let mut latencies = Vec::with_capacity(input_size);
        let mut errors: u64 = 0;
        while let Some((idx, result)) = rx.recv().await {
            if result.is_error() {
                errors += 1;
            } else {
                latencies.push(result.latency_ms);
            }
            slots[idx] = Some(result);
        }
        futures::future::join_all(handles).await;

        if fatal.load(Ordering::Acquire) {
            return Err(ProcessingError::processor_unavailable(format!(
                "classifier circuit opened after {} consecutive failures",
                self.breaker.failure_threshold()
            )));
        }

        let total_time_ms = run_started.elapsed().as_secs_f64() * 1000.0;
        let complete = slots.iter().all(Option::is_some);
        let results: Vec<ClassificationResult> = slots.into_iter().flatten().collect();
        let stats =
            ProcessingStats::from_latencies(ProcessingMode::Batch, &latencies, errors, total_time_ms);

        if !complete {
            warn!(
                completed = results.len(),
                input_size, "⏱️ Batch cancelled by deadline, returning partial results"
            );
        }
        log_processing_run(
            "batch",
            stats.items_processed,
            stats.errors,
            stats.total_time_ms,
            stats.throughput_items_per_sec,
        );

        Ok(BatchOutcome {
            results,
            stats,
            complete,
        })
    }

    /// Snapshot of the classifier circuit breaker
    pub fn breaker_metrics(&self) -> BreakerMetrics {
        self.breaker.metrics()
    }
}

/// Clamp the requested pool size to `[1, max(available_parallelism, input_size)]`
fn clamp_worker_count(requested: usize, input_size: usize) -> usize {
    let parallelism = std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1);
    requested.clamp(1, parallelism.max(input_size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::LexiconClassifier;

    fn processor() -> BatchProcessor {
        BatchProcessor::new(
            Arc::new(LexiconClassifier::default()),
            CircuitBreakerConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let outcome = processor().process_batch(Vec::new(), 4).await.unwrap();
        assert!(outcome.results.is_empty());
        assert!(outcome.complete);
        assert_eq!(outcome.stats.items_processed, 0);
    }

    #[tokio::test]
    async fn test_preserves_input_order() {
        let items: Vec<Item> = (0..25)
            .map(|i| Item::new(format!("item number {i} is great"), "test"))
            .collect();
        let expected: Vec<_> = items.iter().map(|i| i.id).collect();

        let outcome = processor().process_batch(items, 4).await.unwrap();
        let got: Vec<_> = outcome.results.iter().map(|r| r.item_id).collect();
        assert_eq!(got, expected);
        assert!(outcome.complete);
    }

    #[tokio::test]
    async fn test_stats_account_for_all_items() {
        let items: Vec<Item> = (0..10).map(|_| Item::new("I love this!", "test")).collect();
        let outcome = processor().process_batch(items, 3).await.unwrap();
        assert_eq!(outcome.stats.items_processed + outcome.stats.errors, 10);
        assert_eq!(outcome.stats.errors, 0);
        assert!(outcome.stats.total_time_ms >= 0.0);
    }

    #[test]
    fn test_worker_count_clamping() {
        assert_eq!(clamp_worker_count(0, 10), 1);
        assert!(clamp_worker_count(usize::MAX, 10) >= 10);
        assert_eq!(clamp_worker_count(2, 100), 2);
    }
}
