//! Clients for a model-serving sidecar: relevance scoring and training.
//!
//! The cross-encoder relevance model and the bi-encoder fit routine run out
//! of process (a local inference/training server); these are thin JSON
//! clients over its `/rerank` and `/train` endpoints. Only available when
//! the `remote` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::{MineError, Result};
use crate::relevance::RelevanceScorer;
use crate::train::{TrainExample, TrainOptions, TripletTrainer};

/// Classify a non-success server response. 401/403 mean bad credentials: a
/// configuration error that aborts the run. Everything else keeps the
/// caller's variant and is handled at item granularity.
fn classify_failure(
    status: reqwest::StatusCode,
    message: String,
    transient: impl FnOnce(String) -> MineError,
) -> MineError {
    if matches!(status, reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN) {
        MineError::ConfigError(format!("authentication rejected: {message}"))
    } else {
        transient(message)
    }
}

/// A [`RelevanceScorer`] backed by a reranker endpoint.
///
/// Sends `{"query": ..., "texts": [...]}` to `POST {base_url}/rerank` and
/// reads back one score per text.
pub struct RemoteScorer {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteScorer {
    /// Create a scorer for the server at `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.into() }
    }
}

#[derive(Serialize)]
struct RerankRequest<'a> {
    query: &'a str,
    texts: Vec<&'a str>,
}

#[derive(Deserialize)]
struct RerankResponse {
    scores: Vec<f32>,
}

#[async_trait]
impl RelevanceScorer for RemoteScorer {
    async fn score(&self, query: &str, passage: &str) -> Result<f32> {
        debug!(scorer = "remote", query_len = query.len(), "scoring pair");

        let url = format!("{}/rerank", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&RerankRequest { query, texts: vec![passage] })
            .send()
            .await
            .map_err(|e| {
                error!(scorer = "remote", error = %e, "rerank request failed");
                MineError::RelevanceError {
                    scorer: "remote".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(classify_failure(status, format!("server returned {status}"), |message| {
                MineError::RelevanceError { scorer: "remote".into(), message }
            }));
        }

        let parsed: RerankResponse = response.json().await.map_err(|e| {
            MineError::RelevanceError {
                scorer: "remote".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        parsed.scores.into_iter().next().ok_or_else(|| {
            MineError::DataError("rerank server returned no scores".to_string())
        })
    }
}

/// A [`TripletTrainer`] backed by a training endpoint.
///
/// Posts the full example set plus hyperparameters to
/// `POST {base_url}/train`; the server fits the bi-encoder and writes the
/// model artifact to `options.output_path` on its filesystem.
pub struct RemoteTrainer {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteTrainer {
    /// Create a trainer client for the server at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.into() }
    }
}

#[derive(Serialize)]
struct TrainRequest<'a> {
    examples: &'a [TrainExample],
    options: &'a TrainOptions,
}

#[async_trait]
impl TripletTrainer for RemoteTrainer {
    async fn fit(&self, examples: &[TrainExample], options: &TrainOptions) -> Result<()> {
        info!(
            trainer = "remote",
            examples = examples.len(),
            epochs = options.epochs,
            "submitting training job"
        );

        let url = format!("{}/train", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&TrainRequest { examples, options })
            .send()
            .await
            .map_err(|e| {
                error!(trainer = "remote", error = %e, "train request failed");
                MineError::TrainingError(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(
                status,
                format!("server returned {status}: {body}"),
                MineError::TrainingError,
            ));
        }

        info!(trainer = "remote", output = %options.output_path, "training job complete");
        Ok(())
    }
}
