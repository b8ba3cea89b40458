//! Similarity index: corpus embeddings plus cosine scoring.
//!
//! The corpus is encoded once (batched) and the embeddings are held in
//! memory for the duration of mining as read-only shared state. Queries are
//! encoded on demand and scored against every corpus embedding.

use std::sync::Arc;

use tracing::{error, info};

use crate::corpus::Corpus;
use crate::embedding::EmbeddingProvider;
use crate::error::{MineError, Result};

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// A corpus-wide embedding table with cosine scoring against a query.
pub struct SimilarityIndex {
    provider: Arc<dyn EmbeddingProvider>,
    embeddings: Vec<Vec<f32>>,
}

impl SimilarityIndex {
    /// Encode every document in the corpus, in corpus order.
    ///
    /// # Errors
    ///
    /// Returns [`MineError::EncodingError`] if the provider rejects the
    /// batch or returns a different number of vectors than requested.
    pub async fn build(provider: Arc<dyn EmbeddingProvider>, corpus: &Corpus) -> Result<Self> {
        let texts = corpus.texts();
        let embeddings = provider.embed_batch(&texts).await.map_err(|e| {
            error!(error = %e, "corpus encoding failed");
            e
        })?;

        if embeddings.len() != texts.len() {
            return Err(MineError::EncodingError {
                provider: "index".into(),
                message: format!(
                    "provider returned {} embeddings for {} texts",
                    embeddings.len(),
                    texts.len()
                ),
            });
        }

        info!(
            documents = embeddings.len(),
            dimensions = provider.dimensions(),
            "encoded corpus"
        );
        Ok(Self { provider, embeddings })
    }

    /// Build an index from precomputed embeddings (tests, cached runs).
    pub fn from_embeddings(
        provider: Arc<dyn EmbeddingProvider>,
        embeddings: Vec<Vec<f32>>,
    ) -> Self {
        Self { provider, embeddings }
    }

    /// Encode a single query text.
    pub async fn encode_query(&self, text: &str) -> Result<Vec<f32>> {
        self.provider.embed(text).await
    }

    /// Cosine similarity of `query_embedding` against every corpus
    /// embedding, in corpus order.
    pub fn similarities(&self, query_embedding: &[f32]) -> Vec<f32> {
        self.embeddings.iter().map(|e| cosine_similarity(query_embedding, e)).collect()
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = vec![0.6, 0.8];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        assert!((cosine_similarity(&[1.0, 0.0], &[0.0, 1.0])).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_opposite_vectors_is_minus_one() {
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_scores_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }
}
