//! Triplet mining and training pipeline for resume retrieval models.
//!
//! `cvmatch-mine` turns a flat `(resume, category)` dataset into a clean
//! contrastive training set: it synthesizes one query per resume, mines
//! category-disjoint hard negatives by dense retrieval, audits each mined
//! triplet with an independent relevance model, and hands the surviving
//! triplets to a trainable bi-encoder. The embedding, generative, relevance,
//! and training models are external collaborators behind async traits.
//!
//! The pipeline is batch-oriented and single-threaded; each stage writes a
//! CSV artifact that doubles as a checkpoint for resumed runs.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cvmatch_mine::{MiningPipeline, PipelineConfig};
//!
//! let pipeline = MiningPipeline::builder()
//!     .config(PipelineConfig::new("resumes.csv", "out"))
//!     .embedder(Arc::new(embedder))
//!     .generator(Arc::new(generator))
//!     .scorer(Arc::new(scorer))
//!     .trainer(Arc::new(trainer))
//!     .build()?;
//!
//! let report = pipeline.run().await?;
//! println!("kept {} triplets for training", report.filtered);
//! ```

pub mod corpus;
pub mod document;
pub mod embedding;
pub mod error;
pub mod filter;
pub mod generate;
pub mod index;
pub mod miner;
pub mod pipeline;
pub mod relevance;
pub mod stage;
pub mod synthesize;
pub mod train;

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "remote")]
pub mod remote;

pub use corpus::Corpus;
pub use document::{Document, Query, ScoredTriplet, Triplet};
pub use embedding::EmbeddingProvider;
pub use error::{MineError, Result};
pub use filter::RelevanceFilter;
pub use generate::TextGenerator;
pub use index::{SimilarityIndex, cosine_similarity};
pub use miner::{MinerConfig, NegativeMiner, select_negatives};
pub use pipeline::{MiningPipeline, PipelineConfig, PipelineReport};
pub use relevance::{RelevanceScorer, TermOverlapScorer};
pub use synthesize::{LinePolicy, QuerySynthesizer};
pub use train::{TrainExample, TrainOptions, TripletTrainer, build_training_set};
