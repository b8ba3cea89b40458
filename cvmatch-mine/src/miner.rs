//! Hard-negative mining: category-masked top-k selection over the corpus.
//!
//! For each (query, positive document) pair the miner scores the query
//! against every corpus embedding, masks out the document itself and every
//! same-category sibling, takes the top of the candidate pool, and accepts
//! candidates above the similarity floor until the per-query cap is hit.
//! Category-aware masking is the key choice: negatives are guaranteed to be
//! topically distinct, not merely different rows.

use tracing::{debug, info, warn};

use crate::corpus::Corpus;
use crate::document::{Document, Query, Triplet};
use crate::error::{MineError, Result};
use crate::index::SimilarityIndex;

/// Tunable parameters for negative mining.
///
/// The defaults reproduce the original pipeline's constants; none of them
/// is known to be optimal.
#[derive(Debug, Clone, PartialEq)]
pub struct MinerConfig {
    /// Minimum cosine similarity a candidate needs to be accepted.
    pub similarity_floor: f32,
    /// Maximum number of negatives accepted per query.
    pub max_negatives: usize,
    /// Size of the top-k candidate pool the negatives are drawn from.
    pub pool_size: usize,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self { similarity_floor: 0.25, max_negatives: 3, pool_size: 10 }
    }
}

impl MinerConfig {
    /// Validate parameter consistency.
    ///
    /// # Errors
    ///
    /// Returns [`MineError::ConfigError`] if `pool_size < max_negatives`,
    /// either count is zero, or the floor is outside [-1, 1].
    pub fn validate(&self) -> Result<()> {
        if self.max_negatives == 0 || self.pool_size == 0 {
            return Err(MineError::ConfigError(
                "max_negatives and pool_size must be greater than zero".to_string(),
            ));
        }
        if self.pool_size < self.max_negatives {
            return Err(MineError::ConfigError(format!(
                "pool_size ({}) must be at least max_negatives ({})",
                self.pool_size, self.max_negatives
            )));
        }
        if !(-1.0..=1.0).contains(&self.similarity_floor) {
            return Err(MineError::ConfigError(format!(
                "similarity_floor ({}) must be within [-1, 1]",
                self.similarity_floor
            )));
        }
        Ok(())
    }
}

/// Select hard-negative candidates from raw similarity scores.
///
/// Pure core of the miner, separated so it is testable without models.
/// `scores[i]` is the query's cosine similarity to corpus document `i`;
/// `categories[i]` is that document's category label.
///
/// A candidate is eligible iff its index differs from `positive_id` and its
/// category differs from `positive_category`. Ineligible scores are replaced
/// with negative infinity — strictly below any valid cosine similarity, so
/// they can never surface in the pool (the original used -1.0, which is a
/// legal cosine value). Ties break by ascending corpus index, so the result
/// is deterministic and invariant to corpus reordering given fixed scores.
///
/// Returns at most `config.max_negatives` `(corpus_index, score)` pairs in
/// descending score order, each with `score >= config.similarity_floor`.
pub fn select_negatives(
    scores: &[f32],
    categories: &[&str],
    positive_id: usize,
    positive_category: &str,
    config: &MinerConfig,
) -> Vec<(usize, f32)> {
    debug_assert_eq!(scores.len(), categories.len());

    let mut masked: Vec<(usize, f32)> = scores
        .iter()
        .enumerate()
        .map(|(idx, &score)| {
            let eligible = idx != positive_id && categories[idx] != positive_category;
            (idx, if eligible { score } else { f32::NEG_INFINITY })
        })
        .collect();

    // Descending score, ascending index on ties.
    masked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0)));
    masked.truncate(config.pool_size);

    masked
        .into_iter()
        .filter(|(_, score)| *score >= config.similarity_floor)
        .take(config.max_negatives)
        .collect()
}

/// Mines hard-negative triplets for synthesized queries.
pub struct NegativeMiner {
    config: MinerConfig,
}

impl NegativeMiner {
    /// Create a miner with validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MineError::ConfigError`] on inconsistent parameters.
    pub fn new(config: MinerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The miner's configuration.
    pub fn config(&self) -> &MinerConfig {
        &self.config
    }

    /// Mine triplets for one document's query.
    ///
    /// Encodes the query, scores it against the full corpus, and emits one
    /// raw triplet per accepted negative. A document with no eligible
    /// candidate above the floor yields zero triplets, never an error.
    pub async fn mine(
        &self,
        query: &str,
        positive: &Document,
        corpus: &Corpus,
        index: &SimilarityIndex,
    ) -> Result<Vec<Triplet>> {
        let query_embedding = index.encode_query(query).await?;
        let scores = index.similarities(&query_embedding);
        let categories = corpus.category_labels();

        let selected =
            select_negatives(&scores, &categories, positive.id, &positive.category, &self.config);

        if selected.is_empty() {
            debug!(document.id = positive.id, "no eligible negatives above floor");
            return Ok(Vec::new());
        }

        let triplets = selected
            .into_iter()
            .filter_map(|(idx, score)| {
                corpus.get(idx).map(|negative| Triplet {
                    query: query.to_string(),
                    positive_text: positive.text.clone(),
                    positive_category: positive.category.clone(),
                    negative_text: negative.text.clone(),
                    negative_category: negative.category.clone(),
                    negative_score: score,
                })
            })
            .collect();

        Ok(triplets)
    }

    /// Mine triplets for every synthesized query.
    ///
    /// Documents without a query (synthesis failed) are simply absent from
    /// `queries` and yield nothing. A transient encoding failure skips that
    /// query only; fatal errors abort the batch.
    pub async fn mine_all(
        &self,
        queries: &[Query],
        corpus: &Corpus,
        index: &SimilarityIndex,
    ) -> Result<Vec<Triplet>> {
        let mut triplets = Vec::new();
        let mut skipped = 0usize;

        for query in queries {
            let Some(document) = corpus.get(query.document_id) else {
                skipped += 1;
                continue;
            };
            match self.mine(&query.text, document, corpus, index).await {
                Ok(mined) => triplets.extend(mined),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    skipped += 1;
                    warn!(document.id = document.id, error = %e, "mining failed for query, skipping");
                }
            }
        }

        info!(
            triplets = triplets.len(),
            queries = queries.len(),
            skipped_queries = skipped,
            "mining complete"
        );
        Ok(triplets)
    }
}
