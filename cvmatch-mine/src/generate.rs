//! Text generation trait for the query-synthesis collaborator.

use async_trait::async_trait;

use crate::error::Result;

/// A generative chat model that completes a prompt with free-form text.
///
/// Used by the query synthesizer to turn a document into a short question.
/// The raw completion may span multiple lines; post-processing is the
/// synthesizer's job, not the provider's.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produce a completion for the given prompt.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
