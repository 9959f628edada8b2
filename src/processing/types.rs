//! # Core Processing Types
//!
//! Shared data model for both processing modes: items in, classification
//! results and run statistics out. Results and reports are immutable once
//! built; persistence belongs to downstream collaborators.

use crate::classifier::{Classification, SentimentLabel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A unit of text awaiting sentiment classification. Immutable once created;
/// consumed exactly once per processor run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub text: String,
    pub source: String,
    pub received_at: DateTime<Utc>,
    pub metadata: HashMap<String, String>,
}

impl Item {
    /// Create a new item with a fresh id and empty metadata
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            source: source.into(),
            received_at: Utc::now(),
            metadata: HashMap::new(),
        }
    }

    /// Create a new item carrying source metadata
    pub fn with_metadata(
        text: impl Into<String>,
        source: impl Into<String>,
        metadata: HashMap<String, String>,
    ) -> Self {
        Self {
            metadata,
            ..Self::new(text, source)
        }
    }
}

/// Which processing strategy produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMode {
    Batch,
    Stream,
}

impl std::fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingMode::Batch => write!(f, "batch"),
            ProcessingMode::Stream => write!(f, "stream"),
        }
    }
}

/// Outcome of classifying one item. Built immediately after the classifier
/// call; `latency_ms` covers strictly the classifier invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub item_id: Uuid,
    pub label: SentimentLabel,
    pub score: f64,
    pub processed_at: DateTime<Utc>,
    pub processing_mode: ProcessingMode,
    pub latency_ms: f64,
    /// Failure detail when `label` is `error`
    pub error: Option<String>,
}

impl ClassificationResult {
    /// Build a successful result from a classifier output
    pub fn classified(
        item_id: Uuid,
        classification: Classification,
        mode: ProcessingMode,
        latency_ms: f64,
    ) -> Self {
        Self {
            item_id,
            label: classification.label,
            score: classification.score,
            processed_at: Utc::now(),
            processing_mode: mode,
            latency_ms,
            error: None,
        }
    }

    /// Build an error entry for a single-item failure; the surrounding run
    /// continues and counts it
    pub fn failed(
        item_id: Uuid,
        mode: ProcessingMode,
        latency_ms: f64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            item_id,
            label: SentimentLabel::Error,
            score: 0.0,
            processed_at: Utc::now(),
            processing_mode: mode,
            latency_ms,
            error: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.label == SentimentLabel::Error
    }
}

/// Performance statistics for one processing run (batch) or rolling window
/// (stream). Mutated only by the owning processor while a run is live;
/// read-only once handed out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub mode: ProcessingMode,
    /// Successfully classified items; equals input size minus `errors` for a
    /// completed run
    pub items_processed: u64,
    pub total_time_ms: f64,
    pub throughput_items_per_sec: f64,
    pub avg_latency_ms: f64,
    pub p95_latency_ms: f64,
    pub errors: u64,
}

impl ProcessingStats {
    /// Empty stats for a run that saw no items
    pub fn empty(mode: ProcessingMode) -> Self {
        Self {
            mode,
            items_processed: 0,
            total_time_ms: 0.0,
            throughput_items_per_sec: 0.0,
            avg_latency_ms: 0.0,
            p95_latency_ms: 0.0,
            errors: 0,
        }
    }

    /// Derive run statistics from recorded per-item latencies.
    ///
    /// `total_time_ms` is wall time for batch runs and accumulated classifier
    /// time for stream windows, which makes stream throughput equal to
    /// `1 / avg_latency` as the contract requires.
    pub fn from_latencies(
        mode: ProcessingMode,
        latencies_ms: &[f64],
        errors: u64,
        total_time_ms: f64,
    ) -> Self {
        let items_processed = latencies_ms.len() as u64;
        if items_processed == 0 {
            return Self {
                errors,
                total_time_ms,
                ..Self::empty(mode)
            };
        }

        let sum: f64 = latencies_ms.iter().sum();
        let avg_latency_ms = sum / items_processed as f64;
        let throughput_items_per_sec = if total_time_ms > 0.0 {
            items_processed as f64 / (total_time_ms / 1000.0)
        } else {
            0.0
        };

        Self {
            mode,
            items_processed,
            total_time_ms,
            throughput_items_per_sec,
            avg_latency_ms,
            p95_latency_ms: percentile(latencies_ms, 0.95),
            errors,
        }
    }
}

/// Nearest-rank percentile over unsorted samples
fn percentile(samples: &[f64], quantile: f64) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let rank = ((sorted.len() as f64) * quantile).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

/// Which strategy won a comparison run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Batch,
    Stream,
    Tie,
}

impl std::fmt::Display for Winner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Winner::Batch => write!(f, "batch"),
            Winner::Stream => write!(f, "stream"),
            Winner::Tie => write!(f, "tie"),
        }
    }
}

/// Structured output of one comparison invocation; never mutated after
/// construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub batch_stats: ProcessingStats,
    pub stream_stats: ProcessingStats,
    pub input_size: usize,
    pub winner: Winner,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_creation() {
        let item = Item::new("I love this!", "twitter");
        assert_eq!(item.text, "I love this!");
        assert_eq!(item.source, "twitter");
        assert!(item.metadata.is_empty());
    }

    #[test]
    fn test_item_metadata() {
        let mut metadata = HashMap::new();
        metadata.insert("author".to_string(), "someone".to_string());
        let item = Item::with_metadata("Nice.", "rss", metadata);
        assert_eq!(item.metadata.get("author").map(String::as_str), Some("someone"));
    }

    #[test]
    fn test_result_constructors() {
        let item_id = Uuid::new_v4();
        let ok = ClassificationResult::classified(
            item_id,
            Classification {
                label: SentimentLabel::Positive,
                score: 0.8,
            },
            ProcessingMode::Batch,
            1.5,
        );
        assert!(!ok.is_error());
        assert_eq!(ok.item_id, item_id);
        assert_eq!(ok.latency_ms, 1.5);

        let failed =
            ClassificationResult::failed(item_id, ProcessingMode::Stream, 0.2, "inference blew up");
        assert!(failed.is_error());
        assert_eq!(failed.score, 0.0);
        assert!(failed.error.as_deref().unwrap().contains("inference"));
    }

    #[test]
    fn test_stats_from_latencies() {
        let latencies = vec![10.0, 20.0, 30.0, 40.0];
        let stats = ProcessingStats::from_latencies(ProcessingMode::Batch, &latencies, 1, 50.0);
        assert_eq!(stats.items_processed, 4);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.avg_latency_ms, 25.0);
        assert_eq!(stats.p95_latency_ms, 40.0);
        // 4 items in 50ms of wall time
        assert!((stats.throughput_items_per_sec - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_stats_empty_run() {
        let stats = ProcessingStats::from_latencies(ProcessingMode::Stream, &[], 2, 0.0);
        assert_eq!(stats.items_processed, 0);
        assert_eq!(stats.errors, 2);
        assert_eq!(stats.throughput_items_per_sec, 0.0);
    }

    #[test]
    fn test_percentile_single_sample() {
        assert_eq!(percentile(&[7.0], 0.95), 7.0);
    }

    #[test]
    fn test_stream_throughput_is_inverse_avg_latency() {
        // 2 items, 10ms each, total 20ms of classifier time
        let stats = ProcessingStats::from_latencies(ProcessingMode::Stream, &[10.0, 10.0], 0, 20.0);
        assert!((stats.throughput_items_per_sec - 100.0).abs() < 1e-9);
        assert!((stats.throughput_items_per_sec - 1000.0 / stats.avg_latency_ms).abs() < 1e-9);
    }

    #[test]
    fn test_report_serialization() {
        let report = ComparisonReport {
            batch_stats: ProcessingStats::empty(ProcessingMode::Batch),
            stream_stats: ProcessingStats::empty(ProcessingMode::Stream),
            input_size: 0,
            winner: Winner::Tie,
            generated_at: Utc::now(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["winner"], "tie");
        assert_eq!(json["batch_stats"]["mode"], "batch");
    }
}
