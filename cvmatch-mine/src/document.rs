//! Data types for documents, queries, and mined triplets.

use serde::{Deserialize, Serialize};

/// A resume (or other source document) with its category label.
///
/// Documents are created at corpus load and never mutated afterwards. The
/// `id` is the document's position in the corpus and doubles as the index
/// into the corpus embedding table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Position of the document in the corpus.
    pub id: usize,
    /// The full text of the document.
    pub text: String,
    /// The category label (e.g. "Data Science").
    pub category: String,
}

/// A short natural-language query derived from exactly one document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Query {
    /// The id of the document this query was derived from.
    pub document_id: usize,
    /// The query text.
    pub text: String,
}

/// A raw mined training triplet: query, matching document, hard negative.
///
/// Invariants at creation: the negative comes from a different category
/// than the positive and is a different corpus row. `negative_score` is the
/// cosine similarity between the query and the negative at mining time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Triplet {
    /// The query text.
    pub query: String,
    /// Text of the matching document.
    pub positive_text: String,
    /// Category of the matching document.
    pub positive_category: String,
    /// Text of the mined hard negative.
    pub negative_text: String,
    /// Category of the hard negative.
    pub negative_category: String,
    /// Cosine similarity between query and negative at mining time.
    pub negative_score: f32,
}

/// A [`Triplet`] with both legs re-scored by the relevance collaborator.
///
/// The two scores live on the relevance model's own scale and are only ever
/// compared to each other, never to the miner's cosine similarities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredTriplet {
    /// The underlying triplet, unmodified.
    #[serde(flatten)]
    pub triplet: Triplet,
    /// Relevance score of (query, positive).
    pub pos_score: f32,
    /// Relevance score of (query, negative).
    pub neg_score: f32,
}

impl ScoredTriplet {
    /// Whether the positive strictly outranks the negative.
    ///
    /// A tie means the negative is not demonstrably worse than the positive
    /// for this query, so the triplet is not usable as training signal.
    pub fn is_consistent(&self) -> bool {
        self.pos_score > self.neg_score
    }
}
