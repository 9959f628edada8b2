//! Property test: for any non-empty input and any worker count, the batch
//! processor returns one result per item with item ids in input order.

use proptest::prelude::*;
use sentiment_core::classifier::LexiconClassifier;
use sentiment_core::processing::{BatchProcessor, Item};
use sentiment_core::resilience::CircuitBreakerConfig;
use std::sync::Arc;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn batch_output_order_matches_input(
        texts in proptest::collection::vec("[a-zA-Z !\\.]{0,80}", 1..60),
        worker_count in 1usize..9,
    ) {
        let rt = tokio::runtime::Runtime::new().expect("runtime");
        rt.block_on(async move {
            let processor = BatchProcessor::new(
                Arc::new(LexiconClassifier::default()),
                CircuitBreakerConfig::default(),
            );
            let items: Vec<Item> = texts
                .iter()
                .map(|t| Item::new(t.clone(), "proptest"))
                .collect();
            let expected_ids: Vec<_> = items.iter().map(|i| i.id).collect();
            let input_size = items.len() as u64;

            let outcome = processor
                .process_batch(items, worker_count)
                .await
                .expect("batch should not fail with a healthy classifier");

            let got_ids: Vec<_> = outcome.results.iter().map(|r| r.item_id).collect();
            prop_assert!(outcome.complete);
            prop_assert_eq!(got_ids, expected_ids);
            prop_assert_eq!(
                outcome.stats.items_processed + outcome.stats.errors,
                input_size
            );
            Ok(())
        })?;
    }
}
