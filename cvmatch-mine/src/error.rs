//! Error types for the `cvmatch-mine` crate.

use thiserror::Error;

/// Errors that can occur while mining and training.
#[derive(Debug, Error)]
pub enum MineError {
    /// An error occurred during embedding generation.
    #[error("Encoding error ({provider}): {message}")]
    EncodingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during query generation.
    #[error("Generation error ({provider}): {message}")]
    GenerationError {
        /// The text-generation provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during pairwise relevance scoring.
    #[error("Relevance error ({scorer}): {message}")]
    RelevanceError {
        /// The scorer that produced the error.
        scorer: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the training collaborator.
    #[error("Training error: {0}")]
    TrainingError(String),

    /// A configuration validation error. Always aborts the run.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Input data did not have the expected shape.
    #[error("Data error: {0}")]
    DataError(String),

    /// A pipeline-stage artifact could not be read or written.
    #[error("Artifact error at '{path}': {message}")]
    ArtifactError {
        /// The artifact path involved.
        path: String,
        /// A description of the failure.
        message: String,
    },

    /// An error in pipeline orchestration.
    #[error("Pipeline error: {0}")]
    PipelineError(String),

    /// A CSV parse or serialization failure.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// An I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MineError {
    /// Whether this error must abort the whole run.
    ///
    /// Configuration errors are never safe to skip past; everything else is
    /// handled at document/triplet granularity by the pipeline.
    pub fn is_fatal(&self) -> bool {
        matches!(self, MineError::ConfigError(_))
    }
}

/// A convenience result type for mining operations.
pub type Result<T> = std::result::Result<T, MineError>;
