//! Pairwise relevance scoring trait and an offline fallback scorer.

use async_trait::async_trait;

use crate::error::Result;

/// A model that jointly scores a (query, passage) pair.
///
/// Typically a cross-encoder: costlier than a bi-encoder but more accurate,
/// which is why it is used to audit mined triplets rather than to retrieve.
/// Scores live on the model's own scale; the filter only ever compares two
/// scores from the same scorer, never mixes them with cosine similarity.
#[async_trait]
pub trait RelevanceScorer: Send + Sync {
    /// Score the relevance of `passage` to `query`. Higher is more relevant.
    async fn score(&self, query: &str, passage: &str) -> Result<f32>;
}

/// A lightweight scorer based on normalized query-term overlap.
///
/// No model behind it — useful for offline runs and tests where a real
/// cross-encoder is unavailable. Scores are in [0, 1].
#[derive(Debug, Clone, Copy, Default)]
pub struct TermOverlapScorer;

impl TermOverlapScorer {
    fn tokenize(text: &str) -> Vec<String> {
        text.split_whitespace().map(|t| t.to_lowercase()).collect()
    }
}

#[async_trait]
impl RelevanceScorer for TermOverlapScorer {
    async fn score(&self, query: &str, passage: &str) -> Result<f32> {
        let query_terms = Self::tokenize(query);
        let passage_terms = Self::tokenize(passage);
        if query_terms.is_empty() || passage_terms.is_empty() {
            return Ok(0.0);
        }
        let matches = query_terms.iter().filter(|t| passage_terms.contains(t)).count();
        Ok(matches as f32 / query_terms.len() as f32)
    }
}
