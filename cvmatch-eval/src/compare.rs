//! Cross-model comparison on a shared trial set.

use std::sync::Arc;

use cvmatch_mine::EmbeddingProvider;
use tracing::info;

use crate::error::Result;
use crate::metrics::RankSummary;
use crate::simulated::evaluate_trials;
use crate::trial::Trial;

/// A named model under comparison.
pub struct NamedModel {
    /// Display name (e.g. "fine-tuned", "baseline").
    pub name: String,
    /// The model's embedding provider.
    pub provider: Arc<dyn EmbeddingProvider>,
}

/// Per-model results of a comparison run.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelResult {
    /// The model's display name.
    pub name: String,
    /// Its metrics, or `None` if no trial could be evaluated.
    pub summary: Option<RankSummary>,
}

/// Evaluate every model over the *same* trial set.
///
/// The trials are sampled once by the caller; reusing them across models is
/// what makes the comparison direct rather than two independent
/// evaluations.
pub async fn compare_models(
    models: &[NamedModel],
    trials: &[Trial],
    k: usize,
) -> Result<Vec<ModelResult>> {
    let mut results = Vec::with_capacity(models.len());
    for model in models {
        info!(model = %model.name, trials = trials.len(), "evaluating model");
        let summary = evaluate_trials(&model.provider, trials, k).await?;
        results.push(ModelResult { name: model.name.clone(), summary });
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cvmatch_mine::Result as MineResult;

    struct ConstantEmbeddings(f32);

    #[async_trait]
    impl EmbeddingProvider for ConstantEmbeddings {
        async fn embed(&self, _text: &str) -> MineResult<Vec<f32>> {
            Ok(vec![self.0, 1.0 - self.0])
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    #[tokio::test]
    async fn every_model_sees_the_same_trials() {
        let models = vec![
            NamedModel { name: "a".into(), provider: Arc::new(ConstantEmbeddings(0.3)) },
            NamedModel { name: "b".into(), provider: Arc::new(ConstantEmbeddings(0.8)) },
        ];
        let trials = vec![Trial {
            category: "x".into(),
            query: "q".into(),
            candidates: vec!["p".into(), "n".into()],
            labels: vec![true, false],
        }];

        let results = compare_models(&models, &trials, 2).await.unwrap();
        assert_eq!(results.len(), 2);
        // Constant embeddings rank by tie-break, identical for both models.
        assert_eq!(results[0].summary, results[1].summary);
    }
}
