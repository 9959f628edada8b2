//! Shared test doubles for integration tests: deterministic classifiers with
//! controlled latency and failure behavior.

use sentiment_core::classifier::{
    Classification, ClassifierError, SentimentClassifier, SentimentLabel,
};
use std::time::Duration;

/// Classifier with a fixed simulated inference latency
pub struct FixedLatencyClassifier {
    latency: Duration,
}

impl FixedLatencyClassifier {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait::async_trait]
impl SentimentClassifier for FixedLatencyClassifier {
    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        tokio::time::sleep(self.latency).await;
        // Deterministic label keyed on the text so reprocessing matches
        let score = if text.contains("love") {
            0.8
        } else if text.contains("terrible") {
            -0.8
        } else {
            0.0
        };
        let label = if score > 0.0 {
            SentimentLabel::Positive
        } else if score < 0.0 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        };
        Ok(Classification { label, score })
    }
}

/// Classifier that fails every call, for exercising the circuit breaker
pub struct FailingClassifier;

#[async_trait::async_trait]
impl SentimentClassifier for FailingClassifier {
    async fn classify(&self, _text: &str) -> Result<Classification, ClassifierError> {
        Err(ClassifierError::inference("model process crashed"))
    }
}

/// Classifier that fails only for texts carrying a marker, so isolated item
/// failures can be tested without tripping the breaker
pub struct MarkerFailClassifier;

pub const FAIL_MARKER: &str = "##fail##";

#[async_trait::async_trait]
impl SentimentClassifier for MarkerFailClassifier {
    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        if text.contains(FAIL_MARKER) {
            return Err(ClassifierError::inference("unparseable input"));
        }
        Ok(Classification {
            label: SentimentLabel::Neutral,
            score: 0.0,
        })
    }
}
