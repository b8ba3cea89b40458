//! Relevance filter: cross-model audit of mined triplets.
//!
//! Each triplet's legs are scored independently by the relevance
//! collaborator; only triplets whose positive strictly outranks the
//! negative survive. A tie or inversion means the "negative" is not
//! demonstrably worse for this query, and keeping it would inject label
//! noise into training. The filter never modifies a triplet.

use std::sync::Arc;

use tracing::{info, warn};

use crate::document::{ScoredTriplet, Triplet};
use crate::error::Result;
use crate::relevance::RelevanceScorer;

/// Scores and filters mined triplets with an independent relevance model.
pub struct RelevanceFilter {
    scorer: Arc<dyn RelevanceScorer>,
}

impl RelevanceFilter {
    /// Create a filter around a relevance scorer.
    pub fn new(scorer: Arc<dyn RelevanceScorer>) -> Self {
        Self { scorer }
    }

    /// Score both legs of a triplet.
    pub async fn score(&self, triplet: Triplet) -> Result<ScoredTriplet> {
        let pos_score = self.scorer.score(&triplet.query, &triplet.positive_text).await?;
        let neg_score = self.scorer.score(&triplet.query, &triplet.negative_text).await?;
        Ok(ScoredTriplet { triplet, pos_score, neg_score })
    }

    /// Score a batch of triplets, skipping items whose scoring fails.
    pub async fn score_all(&self, triplets: Vec<Triplet>) -> Vec<ScoredTriplet> {
        let mut scored = Vec::with_capacity(triplets.len());
        for (i, triplet) in triplets.into_iter().enumerate() {
            match self.score(triplet).await {
                Ok(s) => scored.push(s),
                Err(e) => {
                    warn!(triplet = i, error = %e, "relevance scoring failed, skipping triplet");
                }
            }
        }
        scored
    }

    /// Keep only triplets whose positive strictly outranks the negative.
    ///
    /// Pure predicate over already-scored triplets: idempotent, and never
    /// modifies a triplet.
    pub fn retain(scored: Vec<ScoredTriplet>) -> Vec<ScoredTriplet> {
        let total = scored.len();
        let kept: Vec<ScoredTriplet> =
            scored.into_iter().filter(ScoredTriplet::is_consistent).collect();
        info!(kept = kept.len(), dropped = total - kept.len(), "filtered triplets");
        kept
    }
}
