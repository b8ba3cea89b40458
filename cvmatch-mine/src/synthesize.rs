//! Query synthesis: one short question per source document.

use std::sync::Arc;

use tracing::warn;

use crate::corpus::Corpus;
use crate::document::Query;
use crate::error::{MineError, Result};
use crate::generate::TextGenerator;

/// How to reduce a multi-line completion to a single query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinePolicy {
    /// Keep the first non-blank line, trimmed. A response with no newline is
    /// returned whole (trimmed).
    #[default]
    FirstNonBlankLine,
    /// Keep the whole completion, trimmed.
    Whole,
}

impl LinePolicy {
    /// Apply the policy to a raw completion.
    ///
    /// Returns `None` if nothing usable remains.
    pub fn apply(self, raw: &str) -> Option<String> {
        let text = match self {
            LinePolicy::FirstNonBlankLine => {
                raw.lines().map(str::trim).find(|line| !line.is_empty())?.to_string()
            }
            LinePolicy::Whole => raw.trim().to_string(),
        };
        if text.is_empty() { None } else { Some(text) }
    }
}

/// Synthesizes a retrieval query from a document via a generative model.
pub struct QuerySynthesizer {
    generator: Arc<dyn TextGenerator>,
    policy: LinePolicy,
}

impl QuerySynthesizer {
    /// Create a synthesizer with the default first-line policy.
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator, policy: LinePolicy::default() }
    }

    /// Override the post-processing policy.
    pub fn with_policy(mut self, policy: LinePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build the question-generation prompt for a document.
    fn prompt(document_text: &str) -> String {
        format!(
            "Generate 3 short generic questions that could be asked based on \
             the following paragraph:\n\nParagraph: {document_text}\n\nQuestions:"
        )
    }

    /// Produce exactly one short query for a document.
    ///
    /// # Errors
    ///
    /// Returns [`MineError::DataError`] if the completion is empty after
    /// post-processing; callers treat this as a per-document skip.
    pub async fn synthesize(&self, document_text: &str) -> Result<String> {
        let completion = self.generator.complete(&Self::prompt(document_text)).await?;
        self.policy.apply(&completion).ok_or_else(|| {
            MineError::DataError("generator returned an empty or blank completion".to_string())
        })
    }

    /// Synthesize a query for every document in the corpus.
    ///
    /// Per-document failures are logged and skipped; they never abort the
    /// batch. Results are in corpus order, keyed by `document_id`.
    pub async fn synthesize_all(&self, corpus: &Corpus) -> Vec<Query> {
        let mut queries = Vec::with_capacity(corpus.len());
        for document in corpus.documents() {
            match self.synthesize(&document.text).await {
                Ok(text) => queries.push(Query { document_id: document.id, text }),
                Err(e) => {
                    warn!(document.id = document.id, error = %e, "query synthesis failed, skipping document");
                }
            }
        }
        queries
    }
}
