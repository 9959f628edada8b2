use crate::classifier::preprocessor::PreprocessorConfig;
use crate::error::{ProcessingError, ProcessingResult};
use crate::resilience::CircuitBreakerConfig;
use std::time::Duration;

/// Top-level configuration for the processing engine.
///
/// All values are plain named settings with documented defaults; callers may
/// construct this directly or resolve it from the environment once at startup
/// and pass it by reference into the components that need it.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub queue: QueueConfig,
    pub batch: BatchConfig,
    pub stream: StreamConfig,
    pub comparison: ComparisonConfig,
    pub classifier: ClassifierConfig,
    pub breaker: CircuitBreakerConfig,
}

/// Queue backend settings. Backend selection (broker vs. in-process fallback)
/// is resolved exactly once, when `SentimentQueue::connect` is called.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Connection string for the pgmq broker
    pub broker_url: String,
    /// Queue name on the broker (also labels the in-process fallback)
    pub queue_name: String,
    /// Bound on the initial broker connection attempt
    pub connect_timeout: Duration,
    /// How long a delivered-but-unacked message stays hidden before redelivery
    pub visibility_timeout: Duration,
    /// Capacity of the in-process fallback queue
    pub capacity: usize,
    /// Poll interval for broker dequeue (pgmq reads are non-blocking)
    pub poll_interval: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            broker_url: "postgresql://localhost/sentiment_development".to_string(),
            queue_name: "sentiment_queue".to_string(),
            connect_timeout: Duration::from_secs(5),
            visibility_timeout: Duration::from_secs(30),
            capacity: 10_000,
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// Batch processor settings
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Default worker pool size; clamped per run to
    /// `[1, max(available_parallelism, input_size)]`
    pub worker_count: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { worker_count: 4 }
    }
}

/// Stream processor settings
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Rolling window size for latency statistics (last N items)
    pub window_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self { window_size: 100 }
    }
}

/// Comparison harness settings
#[derive(Debug, Clone)]
pub struct ComparisonConfig {
    /// Inputs at or above this size are judged by throughput, below it by
    /// per-item latency. Default favors batch for inputs >= 20 items.
    pub size_threshold: usize,
    /// Relative delta on the deciding metric below which the runs tie
    pub tie_epsilon: f64,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            size_threshold: 20,
            tie_epsilon: 0.01,
        }
    }
}

/// Classifier thresholds and preprocessing settings
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Scores at or above this are labeled positive
    pub positive_threshold: f64,
    /// Scores at or below this are labeled negative
    pub negative_threshold: f64,
    pub preprocessor: PreprocessorConfig,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            positive_threshold: 0.05,
            negative_threshold: -0.05,
            preprocessor: PreprocessorConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Resolve configuration from the environment, falling back to defaults.
    pub fn from_env() -> ProcessingResult<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("SENTIMENT_BROKER_URL") {
            config.queue.broker_url = url;
        } else if let Ok(url) = std::env::var("DATABASE_URL") {
            config.queue.broker_url = url;
        }

        if let Ok(name) = std::env::var("SENTIMENT_QUEUE_NAME") {
            config.queue.queue_name = name;
        }

        if let Ok(timeout_ms) = std::env::var("SENTIMENT_QUEUE_CONNECT_TIMEOUT_MS") {
            let ms: u64 = timeout_ms.parse().map_err(|e| {
                ProcessingError::configuration(format!("Invalid connect timeout: {e}"))
            })?;
            config.queue.connect_timeout = Duration::from_millis(ms);
        }

        if let Ok(vt_secs) = std::env::var("SENTIMENT_QUEUE_VISIBILITY_TIMEOUT_SECS") {
            let secs: u64 = vt_secs.parse().map_err(|e| {
                ProcessingError::configuration(format!("Invalid visibility timeout: {e}"))
            })?;
            config.queue.visibility_timeout = Duration::from_secs(secs);
        }

        if let Ok(workers) = std::env::var("SENTIMENT_BATCH_WORKERS") {
            config.batch.worker_count = workers.parse().map_err(|e| {
                ProcessingError::configuration(format!("Invalid batch worker count: {e}"))
            })?;
        }

        if let Ok(window) = std::env::var("SENTIMENT_STREAM_WINDOW_SIZE") {
            config.stream.window_size = window.parse().map_err(|e| {
                ProcessingError::configuration(format!("Invalid stream window size: {e}"))
            })?;
        }

        if let Ok(threshold) = std::env::var("SENTIMENT_COMPARISON_SIZE_THRESHOLD") {
            config.comparison.size_threshold = threshold.parse().map_err(|e| {
                ProcessingError::configuration(format!("Invalid comparison threshold: {e}"))
            })?;
        }

        Ok(config)
    }
}
