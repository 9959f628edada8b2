//! Processing Comparison Binary
//!
//! Standalone binary that runs the batch vs stream comparison harness over a
//! sample dataset (or texts passed as arguments) and prints the report as
//! JSON for the dashboard collaborator to render.

use anyhow::Result;
use sentiment_core::classifier::LexiconClassifier;
use sentiment_core::config::EngineConfig;
use sentiment_core::logging::init_structured_logging;
use sentiment_core::processing::{Item, ProcessingComparison};
use std::sync::Arc;
use tracing::info;

const SAMPLE_TEXTS: &[&str] = &[
    "I love this product!",
    "This is terrible.",
    "It is okay, nothing special.",
    "Amazing experience!",
    "Worst purchase ever.",
    "Great service and quality!",
    "Not worth the money.",
    "Exceeded my expectations!",
    "Poor quality control.",
    "Highly recommend this!",
];

#[tokio::main]
async fn main() -> Result<()> {
    init_structured_logging();

    let config = EngineConfig::from_env()?;
    let classifier = Arc::new(LexiconClassifier::new(&config.classifier));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let items: Vec<Item> = if args.is_empty() {
        // Repeat the sample set so the run lands in throughput territory
        SAMPLE_TEXTS
            .iter()
            .cycle()
            .take(SAMPLE_TEXTS.len() * 5)
            .map(|text| Item::new(*text, "sample"))
            .collect()
    } else {
        args.into_iter().map(|text| Item::new(text, "cli")).collect()
    };

    info!(input_size = items.len(), "Running processing comparison");

    let harness = ProcessingComparison::new(classifier, &config);
    let report = harness.compare(items, config.batch.worker_count).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
