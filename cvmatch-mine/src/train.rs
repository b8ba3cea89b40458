//! Triplet dataset builder and the training collaborator trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::document::ScoredTriplet;
use crate::error::{MineError, Result};

/// One contrastive training example: query grouped with its positive and
/// hard negative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainExample {
    /// The query text.
    pub query: String,
    /// The matching document text.
    pub positive: String,
    /// The hard-negative document text.
    pub negative: String,
}

/// Hyperparameters for a training run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainOptions {
    /// Training batch size.
    pub batch_size: usize,
    /// Number of passes over the training set.
    pub epochs: usize,
    /// Linear learning-rate warmup steps.
    pub warmup_steps: usize,
    /// Where the trained model artifact is written.
    pub output_path: String,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            batch_size: 8,
            epochs: 3,
            warmup_steps: 100,
            output_path: "dual_encoder_model".to_string(),
        }
    }
}

/// A trainable bi-encoder fit routine.
///
/// Consumes the assembled triplet examples, updates model parameters, and
/// writes the resulting model artifact to `options.output_path`. Training
/// is all-or-nothing: any failure here aborts the run.
#[async_trait]
pub trait TripletTrainer: Send + Sync {
    /// Run one fit over the training set.
    async fn fit(&self, examples: &[TrainExample], options: &TrainOptions) -> Result<()>;
}

/// Assemble filtered triplets into the shape the trainer expects.
///
/// # Errors
///
/// Returns [`MineError::ConfigError`] if the filtered set is empty —
/// training on nothing is a configuration problem (threshold too strict,
/// corpus too small) and must be reported before any trainer call.
pub fn build_training_set(triplets: &[ScoredTriplet]) -> Result<Vec<TrainExample>> {
    if triplets.is_empty() {
        return Err(MineError::ConfigError(
            "no triplets survived filtering; nothing to train on".to_string(),
        ));
    }

    let examples: Vec<TrainExample> = triplets
        .iter()
        .map(|t| TrainExample {
            query: t.triplet.query.clone(),
            positive: t.triplet.positive_text.clone(),
            negative: t.triplet.negative_text.clone(),
        })
        .collect();

    info!(examples = examples.len(), "assembled training set");
    Ok(examples)
}
