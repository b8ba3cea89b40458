//! Rank a candidate set against a job description.

use std::sync::Arc;

use cvmatch_mine::{EmbeddingProvider, cosine_similarity};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::metrics::rank_order;

/// One ranked candidate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedCandidate {
    /// Candidate id.
    pub id: String,
    /// Cosine similarity to the job description.
    pub score: f32,
    /// Candidate text.
    pub text: String,
}

/// Rank `(id, text)` candidates by similarity to `job_description`,
/// best first.
pub async fn rank_candidates(
    provider: &Arc<dyn EmbeddingProvider>,
    job_description: &str,
    candidates: &[(&str, &str)],
) -> Result<Vec<RankedCandidate>> {
    let jd_embedding = provider.embed(job_description).await?;
    let texts: Vec<&str> = candidates.iter().map(|(_, text)| *text).collect();
    let embeddings = provider.embed_batch(&texts).await?;

    let scores: Vec<f32> =
        embeddings.iter().map(|e| cosine_similarity(&jd_embedding, e)).collect();

    Ok(rank_order(&scores)
        .into_iter()
        .map(|i| RankedCandidate {
            id: candidates[i].0.to_string(),
            score: scores[i],
            text: candidates[i].1.to_string(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cvmatch_mine::Result as MineResult;

    struct LengthEmbeddings;

    #[async_trait]
    impl EmbeddingProvider for LengthEmbeddings {
        async fn embed(&self, text: &str) -> MineResult<Vec<f32>> {
            Ok(vec![1.0, text.len() as f32])
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    #[tokio::test]
    async fn candidates_come_back_best_first() {
        let provider: Arc<dyn EmbeddingProvider> = Arc::new(LengthEmbeddings);
        let ranked = rank_candidates(
            &provider,
            "12345",
            &[("short", "ab"), ("exact", "12345"), ("long", "abcdefghijklmno")],
        )
        .await
        .unwrap();
        assert_eq!(ranked[0].id, "exact");
        assert!(ranked[0].score >= ranked[1].score);
        assert!(ranked[1].score >= ranked[2].score);
    }
}
