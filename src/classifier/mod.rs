//! # Sentiment Classifier
//!
//! The classifier is an external collaborator consumed through a narrow trait:
//! a pure `text -> {label, score}` function that is stateless and safely
//! callable from multiple workers without external locking. Implementations
//! may be slow (model inference); callers treat every invocation as a
//! potential suspension point.
//!
//! The crate ships [`LexiconClassifier`], a deterministic weighted-lexicon
//! scorer, so the engine is usable and testable without model downloads. If a
//! concrete classifier implementation is not thread-safe it must serialize its
//! own calls and document the resulting throughput ceiling.

pub mod lexicon;
pub mod preprocessor;

pub use lexicon::LexiconClassifier;
pub use preprocessor::{PreprocessorConfig, TextPreprocessor};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sentiment label assigned to a classified text.
///
/// `Error` is never produced by a classifier; processors use it to mark
/// per-item failures in result sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    Error,
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "positive"),
            SentimentLabel::Negative => write!(f, "negative"),
            SentimentLabel::Neutral => write!(f, "neutral"),
            SentimentLabel::Error => write!(f, "error"),
        }
    }
}

/// Output of a single classification: a label and a compound score in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: SentimentLabel,
    pub score: f64,
}

impl Classification {
    /// Neutral classification with zero score, used for texts that empty out
    /// during preprocessing.
    pub fn neutral() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            score: 0.0,
        }
    }
}

/// Errors raised by classifier implementations
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Inference failed: {message}")]
    Inference { message: String },
}

impl ClassifierError {
    /// Create an inference error
    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference {
            message: message.into(),
        }
    }
}

/// Contract for sentiment classifiers.
///
/// Implementations must be reentrant: the batch processor calls `classify`
/// from multiple workers concurrently against a single shared instance.
#[async_trait::async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_serialization() {
        let json = serde_json::to_string(&SentimentLabel::Positive).unwrap();
        assert_eq!(json, "\"positive\"");

        let label: SentimentLabel = serde_json::from_str("\"negative\"").unwrap();
        assert_eq!(label, SentimentLabel::Negative);
    }

    #[test]
    fn test_label_display() {
        assert_eq!(SentimentLabel::Neutral.to_string(), "neutral");
        assert_eq!(SentimentLabel::Error.to_string(), "error");
    }

    #[test]
    fn test_neutral_classification() {
        let c = Classification::neutral();
        assert_eq!(c.label, SentimentLabel::Neutral);
        assert_eq!(c.score, 0.0);
    }
}
