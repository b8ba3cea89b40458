//! Mining pipeline orchestrator.
//!
//! [`MiningPipeline`] drives the full curation run: load corpus →
//! synthesize queries → encode corpus → mine hard negatives → score with
//! the relevance model → filter → assemble and train. The middle stages
//! are cached as CSV artifacts (see [`crate::stage`]), so an interrupted
//! run resumes from its last completed checkpoint.
//!
//! # Example
//!
//! ```rust,ignore
//! use cvmatch_mine::{MiningPipeline, PipelineConfig};
//!
//! let pipeline = MiningPipeline::builder()
//!     .config(config)
//!     .embedder(Arc::new(embedder))
//!     .generator(Arc::new(generator))
//!     .scorer(Arc::new(scorer))
//!     .trainer(Arc::new(trainer))
//!     .build()?;
//!
//! let report = pipeline.run().await?;
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::corpus::Corpus;
use crate::document::{Query, ScoredTriplet, Triplet};
use crate::embedding::EmbeddingProvider;
use crate::error::{MineError, Result};
use crate::filter::RelevanceFilter;
use crate::generate::TextGenerator;
use crate::index::SimilarityIndex;
use crate::miner::{MinerConfig, NegativeMiner};
use crate::relevance::RelevanceScorer;
use crate::stage::{
    self, ArtifactPaths, QueryRecord, ScoredTripletRecord, Stage, TripletRecord,
};
use crate::synthesize::{LinePolicy, QuerySynthesizer};
use crate::train::{TrainOptions, TripletTrainer, build_training_set};

/// Configuration for a full mining-and-training run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Path to the corpus CSV (`Resume`, `Category` columns).
    pub corpus_csv: PathBuf,
    /// Directory where stage artifacts are written.
    pub output_dir: PathBuf,
    /// Negative-mining parameters.
    pub miner: MinerConfig,
    /// Training hyperparameters.
    pub train: TrainOptions,
    /// Post-processing policy for synthesized queries.
    pub line_policy: LinePolicy,
}

impl PipelineConfig {
    /// Build a config with default mining and training parameters.
    pub fn new(corpus_csv: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            corpus_csv: corpus_csv.into(),
            output_dir: output_dir.into(),
            miner: MinerConfig::default(),
            train: TrainOptions::default(),
            line_policy: LinePolicy::default(),
        }
    }
}

/// Counts retained and dropped at each step of a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineReport {
    /// Documents in the loaded corpus.
    pub documents: usize,
    /// Documents with a usable synthesized query.
    pub queries: usize,
    /// Raw triplets out of the miner.
    pub mined: usize,
    /// Triplets the relevance model managed to score.
    pub scored: usize,
    /// Triplets retained after the strict ordering filter.
    pub filtered: usize,
}

/// The mining pipeline orchestrator. Construct via [`MiningPipeline::builder()`].
pub struct MiningPipeline {
    config: PipelineConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn TextGenerator>,
    scorer: Arc<dyn RelevanceScorer>,
    trainer: Arc<dyn TripletTrainer>,
}

impl MiningPipeline {
    /// Create a new [`MiningPipelineBuilder`].
    pub fn builder() -> MiningPipelineBuilder {
        MiningPipelineBuilder::default()
    }

    /// The pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full pipeline: mine, filter, and train.
    ///
    /// Corpus load and the final fit are all-or-nothing; everything in
    /// between degrades at document/triplet granularity.
    pub async fn run(&self) -> Result<PipelineReport> {
        let corpus = Corpus::from_csv(&self.config.corpus_csv)?;
        let paths = ArtifactPaths::new(&self.config.output_dir);

        let (report, filtered) = self.curate(&corpus, &paths).await?;
        let examples = build_training_set(&filtered)?;

        info!(
            examples = examples.len(),
            epochs = self.config.train.epochs,
            batch_size = self.config.train.batch_size,
            output = %self.config.train.output_path,
            "starting training"
        );
        self.trainer.fit(&examples, &self.config.train).await.map_err(|e| {
            error!(error = %e, "training failed");
            e
        })?;

        info!(
            documents = report.documents,
            queries = report.queries,
            mined = report.mined,
            scored = report.scored,
            filtered = report.filtered,
            "pipeline complete"
        );
        Ok(report)
    }

    /// Run only the data-curation stages, producing the artifact CSVs.
    ///
    /// Returns the per-stage counts and the filtered triplets.
    pub async fn curate(
        &self,
        corpus: &Corpus,
        paths: &ArtifactPaths,
    ) -> Result<(PipelineReport, Vec<ScoredTriplet>)> {
        let mut queries_stage = QueriesStage {
            corpus,
            synthesizer: QuerySynthesizer::new(Arc::clone(&self.generator))
                .with_policy(self.config.line_policy),
            path: paths.queries.clone(),
        };
        let queries = stage::run(&mut queries_stage).await?;
        let usable_queries = queries.len();

        let mut mine_stage = MineStage {
            corpus,
            queries: &queries,
            embedder: Arc::clone(&self.embedder),
            miner: NegativeMiner::new(self.config.miner.clone())?,
            path: paths.raw_triplets.clone(),
        };
        let mined = stage::run(&mut mine_stage).await?;

        let mut score_stage = ScoreStage {
            triplets: &mined,
            filter: RelevanceFilter::new(Arc::clone(&self.scorer)),
            path: paths.scored_triplets.clone(),
        };
        let scored = stage::run(&mut score_stage).await?;

        let mut filter_stage =
            FilterStage { scored: &scored, path: paths.filtered_triplets.clone() };
        let filtered = stage::run(&mut filter_stage).await?;

        let report = PipelineReport {
            documents: corpus.len(),
            queries: usable_queries,
            mined: mined.len(),
            scored: scored.len(),
            filtered: filtered.len(),
        };
        Ok((report, filtered))
    }
}

/// Builder for [`MiningPipeline`]. All fields are required.
#[derive(Default)]
pub struct MiningPipelineBuilder {
    config: Option<PipelineConfig>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    generator: Option<Arc<dyn TextGenerator>>,
    scorer: Option<Arc<dyn RelevanceScorer>>,
    trainer: Option<Arc<dyn TripletTrainer>>,
}

impl MiningPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the generative model used for query synthesis.
    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Set the pairwise relevance scorer.
    pub fn scorer(mut self, scorer: Arc<dyn RelevanceScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    /// Set the training collaborator.
    pub fn trainer(mut self, trainer: Arc<dyn TripletTrainer>) -> Self {
        self.trainer = Some(trainer);
        self
    }

    /// Build the [`MiningPipeline`], validating required fields and the
    /// mining configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MineError::ConfigError`] if any field is missing or the
    /// miner parameters are inconsistent.
    pub fn build(self) -> Result<MiningPipeline> {
        let config =
            self.config.ok_or_else(|| MineError::ConfigError("config is required".to_string()))?;
        config.miner.validate()?;
        let embedder = self
            .embedder
            .ok_or_else(|| MineError::ConfigError("embedder is required".to_string()))?;
        let generator = self
            .generator
            .ok_or_else(|| MineError::ConfigError("generator is required".to_string()))?;
        let scorer =
            self.scorer.ok_or_else(|| MineError::ConfigError("scorer is required".to_string()))?;
        let trainer = self
            .trainer
            .ok_or_else(|| MineError::ConfigError("trainer is required".to_string()))?;

        Ok(MiningPipeline { config, embedder, generator, scorer, trainer })
    }
}

// ── Stage implementations ──────────────────────────────────────────

struct QueriesStage<'a> {
    corpus: &'a Corpus,
    synthesizer: QuerySynthesizer,
    path: PathBuf,
}

#[async_trait]
impl Stage for QueriesStage<'_> {
    type Output = Vec<Query>;

    fn name(&self) -> &str {
        "synthesize-queries"
    }

    fn output_path(&self) -> &Path {
        &self.path
    }

    async fn compute(&mut self) -> Result<Self::Output> {
        Ok(self.synthesizer.synthesize_all(self.corpus).await)
    }

    fn load(&self) -> Result<Self::Output> {
        let records: Vec<QueryRecord> = stage::read_csv(&self.path)?;
        if records.len() != self.corpus.len() {
            return Err(MineError::DataError(format!(
                "queries artifact has {} rows but corpus has {} documents",
                records.len(),
                self.corpus.len()
            )));
        }
        // An empty Query column marks a document whose synthesis failed.
        Ok(records
            .into_iter()
            .enumerate()
            .filter(|(_, r)| !r.query.trim().is_empty())
            .map(|(document_id, r)| Query { document_id, text: r.query })
            .collect())
    }

    fn store(&self, output: &Self::Output) -> Result<()> {
        let by_id: std::collections::HashMap<usize, &str> =
            output.iter().map(|q| (q.document_id, q.text.as_str())).collect();
        let records: Vec<QueryRecord> = self
            .corpus
            .documents()
            .iter()
            .map(|doc| QueryRecord {
                resume: doc.text.clone(),
                category: doc.category.clone(),
                query: by_id.get(&doc.id).copied().unwrap_or_default().to_string(),
            })
            .collect();
        stage::write_csv(&self.path, &records)
    }
}

struct MineStage<'a> {
    corpus: &'a Corpus,
    queries: &'a [Query],
    embedder: Arc<dyn EmbeddingProvider>,
    miner: NegativeMiner,
    path: PathBuf,
}

#[async_trait]
impl Stage for MineStage<'_> {
    type Output = Vec<Triplet>;

    fn name(&self) -> &str {
        "mine-negatives"
    }

    fn output_path(&self) -> &Path {
        &self.path
    }

    async fn compute(&mut self) -> Result<Self::Output> {
        // Corpus embeddings are only needed when mining actually runs.
        let index = SimilarityIndex::build(Arc::clone(&self.embedder), self.corpus).await?;
        self.miner.mine_all(self.queries, self.corpus, &index).await
    }

    fn load(&self) -> Result<Self::Output> {
        Ok(stage::read_csv::<TripletRecord>(&self.path)?.into_iter().map(Triplet::from).collect())
    }

    fn store(&self, output: &Self::Output) -> Result<()> {
        let records: Vec<TripletRecord> = output.iter().map(TripletRecord::from).collect();
        stage::write_csv(&self.path, &records)
    }
}

struct ScoreStage<'a> {
    triplets: &'a [Triplet],
    filter: RelevanceFilter,
    path: PathBuf,
}

#[async_trait]
impl Stage for ScoreStage<'_> {
    type Output = Vec<ScoredTriplet>;

    fn name(&self) -> &str {
        "score-relevance"
    }

    fn output_path(&self) -> &Path {
        &self.path
    }

    async fn compute(&mut self) -> Result<Self::Output> {
        Ok(self.filter.score_all(self.triplets.to_vec()).await)
    }

    fn load(&self) -> Result<Self::Output> {
        Ok(stage::read_csv::<ScoredTripletRecord>(&self.path)?
            .into_iter()
            .map(ScoredTriplet::from)
            .collect())
    }

    fn store(&self, output: &Self::Output) -> Result<()> {
        let records: Vec<ScoredTripletRecord> =
            output.iter().map(ScoredTripletRecord::from).collect();
        stage::write_csv(&self.path, &records)
    }
}

struct FilterStage<'a> {
    scored: &'a [ScoredTriplet],
    path: PathBuf,
}

#[async_trait]
impl Stage for FilterStage<'_> {
    type Output = Vec<ScoredTriplet>;

    fn name(&self) -> &str {
        "filter-triplets"
    }

    fn output_path(&self) -> &Path {
        &self.path
    }

    async fn compute(&mut self) -> Result<Self::Output> {
        Ok(RelevanceFilter::retain(self.scored.to_vec()))
    }

    fn load(&self) -> Result<Self::Output> {
        let rows: Vec<ScoredTriplet> = stage::read_csv::<ScoredTripletRecord>(&self.path)?
            .into_iter()
            .map(ScoredTriplet::from)
            .collect();
        if rows.iter().any(|s| !s.is_consistent()) {
            return Err(MineError::DataError(
                "filtered artifact contains rows violating pos_score > neg_score".to_string(),
            ));
        }
        Ok(rows)
    }

    fn store(&self, output: &Self::Output) -> Result<()> {
        let records: Vec<ScoredTripletRecord> =
            output.iter().map(ScoredTripletRecord::from).collect();
        stage::write_csv(&self.path, &records)
    }
}
