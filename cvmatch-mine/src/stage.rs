//! Pipeline stages with artifact caching.
//!
//! Each stage declares its name and output artifact path. When the artifact
//! already exists and parses, the stage is skipped and the artifact loaded;
//! otherwise the stage computes its output and writes the artifact. The
//! intermediate CSVs double as checkpoints: a re-run resumes from the last
//! completed stage.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::document::{ScoredTriplet, Triplet};
use crate::error::{MineError, Result};

/// A resumable pipeline stage with a cached CSV artifact.
#[async_trait]
pub trait Stage {
    /// The stage's output.
    type Output: Send;

    /// Stage name used in logs.
    fn name(&self) -> &str;

    /// Path of the stage's output artifact.
    fn output_path(&self) -> &Path;

    /// Compute the output from scratch.
    async fn compute(&mut self) -> Result<Self::Output>;

    /// Load the output from an existing artifact.
    fn load(&self) -> Result<Self::Output>;

    /// Persist the output as the stage artifact.
    fn store(&self, output: &Self::Output) -> Result<()>;
}

/// Run a stage, loading its artifact instead when present and valid.
pub async fn run<S: Stage + Send>(stage: &mut S) -> Result<S::Output> {
    let path = stage.output_path().to_path_buf();
    if path.exists() {
        match stage.load() {
            Ok(output) => {
                info!(stage = stage.name(), path = %path.display(), "loaded cached artifact");
                return Ok(output);
            }
            Err(e) => {
                warn!(stage = stage.name(), path = %path.display(), error = %e, "cached artifact invalid, recomputing");
            }
        }
    }

    info!(stage = stage.name(), "computing");
    let output = stage.compute().await?;
    stage.store(&output)?;
    info!(stage = stage.name(), path = %path.display(), "stage complete");
    Ok(output)
}

// ── CSV artifact helpers ───────────────────────────────────────────

/// Read all records from a CSV artifact.
pub fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| MineError::ArtifactError {
        path: path.display().to_string(),
        message: format!("failed to open: {e}"),
    })?;
    let mut rows = Vec::new();
    for record in reader.deserialize::<T>() {
        rows.push(record?);
    }
    Ok(rows)
}

/// Write records to a CSV artifact, creating parent directories as needed.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut writer = csv::Writer::from_path(path).map_err(|e| MineError::ArtifactError {
        path: path.display().to_string(),
        message: format!("failed to create: {e}"),
    })?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

// ── Artifact record schemas ────────────────────────────────────────

/// Row of the queries-augmented corpus artifact.
///
/// An empty `Query` marks a document whose synthesis failed and was skipped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryRecord {
    /// Document text.
    #[serde(rename = "Resume")]
    pub resume: String,
    /// Category label.
    #[serde(rename = "Category")]
    pub category: String,
    /// Synthesized query, or empty when synthesis failed.
    #[serde(rename = "Query")]
    pub query: String,
}

/// Row of the raw mined triplets artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TripletRecord {
    /// Query text.
    pub query: String,
    /// Positive document text.
    pub positive_resume: String,
    /// Positive document category.
    pub positive_category: String,
    /// Negative document text.
    pub negative_resume: String,
    /// Negative document category.
    pub negative_category: String,
    /// Cosine similarity at mining time.
    pub negative_score: f32,
}

/// Row of the relevance-scored (and filtered) triplets artifacts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredTripletRecord {
    /// Query text.
    pub query: String,
    /// Positive document text.
    pub positive_resume: String,
    /// Positive document category.
    pub positive_category: String,
    /// Negative document text.
    pub negative_resume: String,
    /// Negative document category.
    pub negative_category: String,
    /// Cosine similarity at mining time.
    pub negative_score: f32,
    /// Relevance score of (query, positive).
    pub pos_score: f32,
    /// Relevance score of (query, negative).
    pub neg_score: f32,
}

impl From<&Triplet> for TripletRecord {
    fn from(t: &Triplet) -> Self {
        Self {
            query: t.query.clone(),
            positive_resume: t.positive_text.clone(),
            positive_category: t.positive_category.clone(),
            negative_resume: t.negative_text.clone(),
            negative_category: t.negative_category.clone(),
            negative_score: t.negative_score,
        }
    }
}

impl From<TripletRecord> for Triplet {
    fn from(r: TripletRecord) -> Self {
        Self {
            query: r.query,
            positive_text: r.positive_resume,
            positive_category: r.positive_category,
            negative_text: r.negative_resume,
            negative_category: r.negative_category,
            negative_score: r.negative_score,
        }
    }
}

impl From<&ScoredTriplet> for ScoredTripletRecord {
    fn from(s: &ScoredTriplet) -> Self {
        Self {
            query: s.triplet.query.clone(),
            positive_resume: s.triplet.positive_text.clone(),
            positive_category: s.triplet.positive_category.clone(),
            negative_resume: s.triplet.negative_text.clone(),
            negative_category: s.triplet.negative_category.clone(),
            negative_score: s.triplet.negative_score,
            pos_score: s.pos_score,
            neg_score: s.neg_score,
        }
    }
}

impl From<ScoredTripletRecord> for ScoredTriplet {
    fn from(r: ScoredTripletRecord) -> Self {
        Self {
            triplet: Triplet {
                query: r.query,
                positive_text: r.positive_resume,
                positive_category: r.positive_category,
                negative_text: r.negative_resume,
                negative_category: r.negative_category,
                negative_score: r.negative_score,
            },
            pos_score: r.pos_score,
            neg_score: r.neg_score,
        }
    }
}

/// Standard artifact file names inside the pipeline output directory.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    /// Queries-augmented corpus.
    pub queries: PathBuf,
    /// Raw mined triplets.
    pub raw_triplets: PathBuf,
    /// Relevance-scored triplets.
    pub scored_triplets: PathBuf,
    /// Filtered triplets used for training.
    pub filtered_triplets: PathBuf,
}

impl ArtifactPaths {
    /// Conventional file names under `output_dir`.
    pub fn new(output_dir: &Path) -> Self {
        Self {
            queries: output_dir.join("resumes_with_queries.csv"),
            raw_triplets: output_dir.join("triplets_mined.csv"),
            scored_triplets: output_dir.join("triplets_scored.csv"),
            filtered_triplets: output_dir.join("triplets_filtered.csv"),
        }
    }
}
