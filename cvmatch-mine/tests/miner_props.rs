//! Property tests for hard-negative selection.

use std::collections::HashSet;

use cvmatch_mine::{MinerConfig, select_negatives};
use proptest::prelude::*;

const CATEGORIES: [&str; 3] = ["X", "Y", "Z"];

/// Distinct scores (by construction) with arbitrary category labels.
fn arb_corpus() -> impl Strategy<Value = Vec<(f32, usize)>> {
    proptest::collection::vec(0usize..3, 4..24).prop_map(|cats| {
        cats.into_iter()
            .enumerate()
            // Distinct scores so reordering cannot change tie resolution.
            .map(|(i, cat)| (0.9 - 0.03 * i as f32, cat))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Selected negatives always satisfy the eligibility and floor rules.
    #[test]
    fn selection_respects_mask_floor_and_cap(
        corpus in arb_corpus(),
        positive_id in 0usize..4,
        floor in -1.0f32..1.0,
        max_negatives in 1usize..5,
        extra_pool in 0usize..8,
    ) {
        let scores: Vec<f32> = corpus.iter().map(|(s, _)| *s).collect();
        let categories: Vec<&str> = corpus.iter().map(|(_, c)| CATEGORIES[*c]).collect();
        let positive_category = categories[positive_id];
        let config = MinerConfig {
            similarity_floor: floor,
            max_negatives,
            pool_size: max_negatives + extra_pool,
        };

        let selected = select_negatives(&scores, &categories, positive_id, positive_category, &config);

        prop_assert!(selected.len() <= max_negatives);
        for (idx, score) in &selected {
            prop_assert_ne!(*idx, positive_id);
            prop_assert_ne!(categories[*idx], positive_category);
            prop_assert!(*score >= floor);
            prop_assert!((scores[*idx] - score).abs() < 1e-6);
        }
        // Descending score order.
        for window in selected.windows(2) {
            prop_assert!(window[0].1 >= window[1].1);
        }
    }

    /// Reordering the corpus must not change which documents win.
    #[test]
    fn selection_invariant_to_corpus_order(
        corpus in arb_corpus(),
        positive_id in 0usize..4,
        rotation in 1usize..8,
        max_negatives in 1usize..4,
    ) {
        let n = corpus.len();
        let rotation = rotation % n;
        let config = MinerConfig {
            similarity_floor: 0.0,
            max_negatives,
            pool_size: max_negatives + 3,
        };

        let scores: Vec<f32> = corpus.iter().map(|(s, _)| *s).collect();
        let categories: Vec<&str> = corpus.iter().map(|(_, c)| CATEGORIES[*c]).collect();
        let positive_category = categories[positive_id];

        // Rotate the corpus and track where the positive lands.
        let rotated: Vec<(f32, usize)> =
            corpus.iter().cycle().skip(rotation).take(n).copied().collect();
        let rotated_scores: Vec<f32> = rotated.iter().map(|(s, _)| *s).collect();
        let rotated_categories: Vec<&str> =
            rotated.iter().map(|(_, c)| CATEGORIES[*c]).collect();
        let rotated_positive = (positive_id + n - rotation) % n;

        let original = select_negatives(&scores, &categories, positive_id, positive_category, &config);
        let shuffled = select_negatives(
            &rotated_scores,
            &rotated_categories,
            rotated_positive,
            positive_category,
            &config,
        );

        // Scores are distinct, so the winning documents are identified by
        // their score regardless of position.
        let original_set: HashSet<u32> =
            original.iter().map(|(_, s)| s.to_bits()).collect();
        let shuffled_set: HashSet<u32> =
            shuffled.iter().map(|(_, s)| s.to_bits()).collect();
        prop_assert_eq!(original_set, shuffled_set);
    }
}
