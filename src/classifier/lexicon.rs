//! Deterministic weighted-lexicon sentiment scorer.
//!
//! Scores whitespace tokens against an embedded valence lexicon with negation
//! flips, intensity modifiers, and exclamation emphasis, then normalizes the
//! raw sum into a compound score in [-1, 1]. Deterministic by construction:
//! the same text always produces the same label and score, which the
//! redelivery/idempotence guarantees of the processing layer rely on.

use crate::classifier::{
    Classification, ClassifierError, SentimentClassifier, SentimentLabel, TextPreprocessor,
};
use crate::config::ClassifierConfig;
use std::collections::HashMap;
use tracing::debug;

/// Valence entries: word -> raw sentiment weight
const LEXICON: &[(&str, f64)] = &[
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("awful", -2.7),
    ("bad", -2.5),
    ("best", 3.2),
    ("boring", -1.9),
    ("broken", -2.2),
    ("brilliant", 2.9),
    ("delight", 2.5),
    ("delightful", 2.8),
    ("disappointed", -2.2),
    ("disappointing", -2.4),
    ("disaster", -3.1),
    ("dreadful", -2.8),
    ("excellent", 3.2),
    ("exceeded", 1.6),
    ("excited", 2.2),
    ("fail", -2.4),
    ("failed", -2.4),
    ("fantastic", 3.0),
    ("fine", 0.8),
    ("garbage", -2.7),
    ("good", 1.9),
    ("great", 2.6),
    ("happy", 2.4),
    ("hate", -2.9),
    ("horrible", -2.9),
    ("impressive", 2.3),
    ("like", 1.5),
    ("love", 3.2),
    ("loved", 3.0),
    ("mediocre", -1.4),
    ("nice", 1.8),
    ("okay", 0.9),
    ("perfect", 3.1),
    ("pleasant", 1.9),
    ("poor", -2.1),
    ("problem", -1.6),
    ("recommend", 1.8),
    ("refund", -1.2),
    ("sad", -2.1),
    ("scam", -3.0),
    ("slow", -1.3),
    ("terrible", -3.1),
    ("trash", -2.6),
    ("useless", -2.4),
    ("waste", -2.3),
    ("wonderful", 2.9),
    ("worst", -3.3),
    ("worthless", -2.6),
    ("wow", 2.0),
    ("wrong", -1.7),
];

/// Preceding-token modifiers: positive scalars amplify, negative ones dampen
const INTENSIFIERS: &[(&str, f64)] = &[
    ("absolutely", 0.293),
    ("completely", 0.293),
    ("extremely", 0.293),
    ("highly", 0.293),
    ("incredibly", 0.293),
    ("really", 0.293),
    ("so", 0.293),
    ("totally", 0.293),
    ("truly", 0.293),
    ("very", 0.293),
    ("barely", -0.293),
    ("hardly", -0.293),
    ("kinda", -0.293),
    ("slightly", -0.293),
    ("somewhat", -0.293),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "neither", "nor", "cannot", "cant", "can't", "dont", "don't", "wont",
    "won't", "isnt", "isn't", "wasnt", "wasn't", "aint", "ain't", "didnt", "didn't", "doesnt",
    "doesn't", "couldnt", "couldn't", "wouldnt", "wouldn't", "shouldnt", "shouldn't", "nothing",
];

/// How far back negations and intensifiers reach, in tokens
const MODIFIER_SCOPE: usize = 3;

/// Sign flip applied by a preceding negation
const NEGATION_FACTOR: f64 = -0.74;

/// Per-exclamation emphasis added to the raw sum, capped at 4 marks
const EXCLAMATION_BOOST: f64 = 0.292;

/// Normalization constant for squashing raw sums into [-1, 1]
const NORMALIZATION_ALPHA: f64 = 15.0;

/// Deterministic lexicon-based classifier.
///
/// All lookup tables are built at construction and never mutated, so a single
/// instance is safely shared across batch workers and concurrent stream calls.
pub struct LexiconClassifier {
    lexicon: HashMap<&'static str, f64>,
    intensifiers: HashMap<&'static str, f64>,
    preprocessor: TextPreprocessor,
    positive_threshold: f64,
    negative_threshold: f64,
}

impl LexiconClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            lexicon: LEXICON.iter().copied().collect(),
            intensifiers: INTENSIFIERS.iter().copied().collect(),
            preprocessor: TextPreprocessor::new(config.preprocessor.clone()),
            positive_threshold: config.positive_threshold,
            negative_threshold: config.negative_threshold,
        }
    }

    fn score(&self, text: &str) -> f64 {
        let processed = self.preprocessor.preprocess(text);
        if processed.is_empty() {
            return 0.0;
        }

        let tokens: Vec<&str> = processed.split_whitespace().collect();
        let mut sum = 0.0;

        for (i, raw_token) in tokens.iter().enumerate() {
            let token = trim_token(raw_token);
            let Some(&valence) = self.lexicon.get(token) else {
                continue;
            };

            let mut valence = valence;
            let scope_start = i.saturating_sub(MODIFIER_SCOPE);
            for preceding in &tokens[scope_start..i] {
                let preceding = trim_token(preceding);
                if let Some(&boost) = self.intensifiers.get(preceding) {
                    valence *= 1.0 + boost;
                }
                if NEGATIONS.contains(&preceding) {
                    valence *= NEGATION_FACTOR;
                }
            }

            sum += valence;
        }

        // Exclamation marks amplify whatever direction the text already leans
        let exclamations = text.matches('!').count().min(4) as f64;
        if sum > 0.0 {
            sum += exclamations * EXCLAMATION_BOOST;
        } else if sum < 0.0 {
            sum -= exclamations * EXCLAMATION_BOOST;
        }

        let compound = sum / (sum * sum + NORMALIZATION_ALPHA).sqrt();
        compound.clamp(-1.0, 1.0)
    }

    fn label_for(&self, score: f64) -> SentimentLabel {
        if score >= self.positive_threshold {
            SentimentLabel::Positive
        } else if score <= self.negative_threshold {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

#[async_trait::async_trait]
impl SentimentClassifier for LexiconClassifier {
    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        let score = self.score(text);
        let label = self.label_for(score);
        debug!(score = score, label = %label, "Classified text");
        Ok(Classification { label, score })
    }
}

/// Strip punctuation from token edges so "terrible." matches "terrible"
fn trim_token(token: &str) -> &str {
    token.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> LexiconClassifier {
        LexiconClassifier::default()
    }

    #[tokio::test]
    async fn test_positive_text() {
        let c = classifier().classify("I love this product!").await.unwrap();
        assert_eq!(c.label, SentimentLabel::Positive);
        assert!(c.score > 0.0);
    }

    #[tokio::test]
    async fn test_negative_text() {
        let c = classifier().classify("This is terrible.").await.unwrap();
        assert_eq!(c.label, SentimentLabel::Negative);
        assert!(c.score < 0.0);
    }

    #[tokio::test]
    async fn test_neutral_text() {
        let c = classifier().classify("The sky was grey today.").await.unwrap();
        assert_eq!(c.label, SentimentLabel::Neutral);
        assert_eq!(c.score, 0.0);
    }

    #[tokio::test]
    async fn test_negation_flips_sentiment() {
        let plain = classifier().classify("I love this").await.unwrap();
        let negated = classifier().classify("I don't love this").await.unwrap();
        assert_eq!(plain.label, SentimentLabel::Positive);
        assert_eq!(negated.label, SentimentLabel::Negative);
    }

    #[tokio::test]
    async fn test_intensifier_amplifies() {
        let plain = classifier().classify("This is good").await.unwrap();
        let boosted = classifier().classify("This is really good").await.unwrap();
        assert!(boosted.score > plain.score);
    }

    #[tokio::test]
    async fn test_exclamations_amplify() {
        let plain = classifier().classify("This is great").await.unwrap();
        let shouted = classifier().classify("This is great!!!").await.unwrap();
        assert!(shouted.score > plain.score);
    }

    #[tokio::test]
    async fn test_empty_after_preprocessing_is_neutral() {
        let c = classifier().classify("#tags @only https://x.io").await.unwrap();
        assert_eq!(c.label, SentimentLabel::Neutral);
        assert_eq!(c.score, 0.0);
    }

    #[tokio::test]
    async fn test_deterministic() {
        let a = classifier().classify("Amazing experience!").await.unwrap();
        let b = classifier().classify("Amazing experience!").await.unwrap();
        assert_eq!(a.label, b.label);
        assert_eq!(a.score, b.score);
    }

    #[tokio::test]
    async fn test_score_bounds() {
        let text = "love love love amazing excellent perfect best wonderful!!!!";
        let c = classifier().classify(text).await.unwrap();
        assert!(c.score <= 1.0);
        assert!(c.score >= -1.0);
    }
}
