//! Human-agreement evaluation: model ranking vs. collected human rankings.

use std::collections::HashMap;
use std::sync::Arc;

use cvmatch_mine::EmbeddingProvider;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::correlation::{kendall_tau, spearman_rho};
use crate::error::{EvalError, Result};
use crate::rank::rank_candidates;

/// A fixed job description, a small candidate set, and several
/// independently collected human rank-orderings (best first, by id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HumanStudy {
    /// The job description used as the query.
    pub job_description: String,
    /// Candidate id → resume text.
    pub candidates: Vec<Candidate>,
    /// Human orderings, each a permutation of the candidate ids.
    pub rankings: Vec<Vec<String>>,
}

/// One labeled candidate in a [`HumanStudy`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Short id (e.g. "A").
    pub id: String,
    /// Resume text.
    pub text: String,
}

/// Agreement between the model's ranking and the human rankings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HumanAgreement {
    /// Model ranking, best first, by candidate id.
    pub model_ranking: Vec<String>,
    /// (kendall tau, spearman rho) per human ranking.
    pub per_human: Vec<(f64, f64)>,
    /// Average Kendall tau across humans.
    pub mean_kendall: f64,
    /// Average Spearman rho across humans.
    pub mean_spearman: f64,
}

impl HumanStudy {
    /// Check that every ranking is a permutation of the candidate ids.
    pub fn validate(&self) -> Result<()> {
        if self.candidates.len() < 2 {
            return Err(EvalError::Ranking("need at least two candidates".to_string()));
        }
        if self.rankings.is_empty() {
            return Err(EvalError::Ranking("need at least one human ranking".to_string()));
        }
        let ids: Vec<&str> = self.candidates.iter().map(|c| c.id.as_str()).collect();
        for (i, ranking) in self.rankings.iter().enumerate() {
            let mut sorted: Vec<&str> = ranking.iter().map(String::as_str).collect();
            sorted.sort_unstable();
            let mut expected = ids.clone();
            expected.sort_unstable();
            if sorted != expected {
                return Err(EvalError::Ranking(format!(
                    "human ranking {i} is not a permutation of the candidate ids"
                )));
            }
        }
        Ok(())
    }
}

/// Rank the study's candidates with the model and correlate against each
/// human ordering.
pub async fn evaluate_study(
    provider: &Arc<dyn EmbeddingProvider>,
    study: &HumanStudy,
) -> Result<HumanAgreement> {
    study.validate()?;

    let pairs: Vec<(&str, &str)> =
        study.candidates.iter().map(|c| (c.id.as_str(), c.text.as_str())).collect();
    let ranked = rank_candidates(provider, &study.job_description, &pairs).await?;
    let model_ranking: Vec<String> = ranked.iter().map(|r| r.id.clone()).collect();

    // Position of each id in the model's ordering.
    let model_pos: HashMap<&str, usize> =
        model_ranking.iter().enumerate().map(|(i, id)| (id.as_str(), i)).collect();

    let mut per_human = Vec::with_capacity(study.rankings.len());
    for ranking in &study.rankings {
        let human_pos: HashMap<&str, usize> =
            ranking.iter().enumerate().map(|(i, id)| (id.as_str(), i)).collect();

        // Rank vectors in candidate-list order.
        let model_ranks: Vec<usize> =
            study.candidates.iter().map(|c| model_pos[c.id.as_str()]).collect();
        let human_ranks: Vec<usize> =
            study.candidates.iter().map(|c| human_pos[c.id.as_str()]).collect();

        let tau = kendall_tau(&human_ranks, &model_ranks)
            .ok_or_else(|| EvalError::Ranking("degenerate ranking".to_string()))?;
        let rho = spearman_rho(&human_ranks, &model_ranks)
            .ok_or_else(|| EvalError::Ranking("degenerate ranking".to_string()))?;
        per_human.push((tau, rho));
    }

    let n = per_human.len() as f64;
    let mean_kendall = per_human.iter().map(|(t, _)| t).sum::<f64>() / n;
    let mean_spearman = per_human.iter().map(|(_, r)| r).sum::<f64>() / n;

    info!(mean_kendall, mean_spearman, humans = per_human.len(), "human agreement computed");
    Ok(HumanAgreement { model_ranking, per_human, mean_kendall, mean_spearman })
}
