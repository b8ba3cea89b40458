//! Corpus loading and the category index.
//!
//! A [`Corpus`] is loaded once from a CSV file with `Resume` and `Category`
//! columns, validated, and never mutated afterwards. The category index is
//! built at load time and shared by the negative miner and the evaluator.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::document::Document;
use crate::error::{MineError, Result};

/// One row of the input corpus CSV.
#[derive(Debug, Deserialize)]
struct CorpusRow {
    #[serde(rename = "Resume")]
    resume: String,
    #[serde(rename = "Category")]
    category: String,
}

/// An immutable collection of labeled documents with a category index.
#[derive(Debug, Clone)]
pub struct Corpus {
    documents: Vec<Document>,
    by_category: HashMap<String, Vec<usize>>,
}

impl Corpus {
    /// Build a corpus from pre-labeled (text, category) pairs.
    ///
    /// Rows with empty text or an empty category are dropped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`MineError::DataError`] if no usable rows remain.
    pub fn new<I>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut documents = Vec::new();
        let mut by_category: HashMap<String, Vec<usize>> = HashMap::new();
        let mut dropped = 0usize;

        for (text, category) in rows {
            if text.trim().is_empty() || category.trim().is_empty() {
                dropped += 1;
                continue;
            }
            let id = documents.len();
            by_category.entry(category.clone()).or_default().push(id);
            documents.push(Document { id, text, category });
        }

        if dropped > 0 {
            warn!(dropped, "dropped rows with empty text or category");
        }
        if documents.is_empty() {
            return Err(MineError::DataError("corpus is empty after filtering".to_string()));
        }

        Ok(Self { documents, by_category })
    }

    /// Load a corpus from a CSV file with `Resume` and `Category` columns.
    ///
    /// # Errors
    ///
    /// Returns [`MineError::DataError`] if the required columns are missing
    /// or the file contains no usable rows; this aborts the run.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::Reader::from_path(path).map_err(|e| MineError::ArtifactError {
            path: path.display().to_string(),
            message: format!("failed to open corpus: {e}"),
        })?;

        let headers = reader.headers()?.clone();
        for required in ["Resume", "Category"] {
            if !headers.iter().any(|h| h == required) {
                return Err(MineError::DataError(format!(
                    "corpus CSV '{}' is missing required column '{required}'",
                    path.display()
                )));
            }
        }

        let mut rows = Vec::new();
        for record in reader.deserialize::<CorpusRow>() {
            let row = record?;
            rows.push((row.resume, row.category));
        }

        let corpus = Self::new(rows)?;
        info!(
            path = %path.display(),
            documents = corpus.len(),
            categories = corpus.categories().count(),
            "loaded corpus"
        );
        Ok(corpus)
    }

    /// All documents in corpus order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// The document at `id`, if present.
    pub fn get(&self, id: usize) -> Option<&Document> {
        self.documents.get(id)
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the corpus holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Iterator over category names.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.by_category.keys().map(String::as_str)
    }

    /// Document ids belonging to `category`.
    pub fn ids_in_category(&self, category: &str) -> &[usize] {
        self.by_category.get(category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Document ids in every category except `category`.
    pub fn ids_outside_category(&self, category: &str) -> Vec<usize> {
        let mut ids: Vec<usize> = self
            .by_category
            .iter()
            .filter(|(cat, _)| cat.as_str() != category)
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Category labels of all documents, in corpus order.
    pub fn category_labels(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.category.as_str()).collect()
    }

    /// Texts of all documents, in corpus order.
    pub fn texts(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.text.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample() -> Corpus {
        Corpus::new([
            ("java dev".to_string(), "Java".to_string()),
            ("senior java dev".to_string(), "Java".to_string()),
            ("hr generalist".to_string(), "HR".to_string()),
        ])
        .unwrap()
    }

    #[test]
    fn index_groups_by_category() {
        let corpus = sample();
        assert_eq!(corpus.ids_in_category("Java"), &[0, 1]);
        assert_eq!(corpus.ids_in_category("HR"), &[2]);
        assert_eq!(corpus.ids_outside_category("Java"), vec![2]);
    }

    #[test]
    fn empty_rows_are_dropped() {
        let corpus = Corpus::new([
            ("".to_string(), "Java".to_string()),
            ("text".to_string(), "  ".to_string()),
            ("ok".to_string(), "HR".to_string()),
        ])
        .unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.get(0).unwrap().text, "ok");
    }

    #[test]
    fn all_empty_is_fatal() {
        let err = Corpus::new([("".to_string(), "X".to_string())]).unwrap_err();
        assert!(matches!(err, MineError::DataError(_)));
    }

    #[test]
    fn missing_column_is_fatal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Resume,Label").unwrap();
        writeln!(file, "text,Java").unwrap();
        let err = Corpus::from_csv(file.path()).unwrap_err();
        assert!(matches!(err, MineError::DataError(_)));
    }

    #[test]
    fn loads_well_formed_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Category,Resume").unwrap();
        writeln!(file, "Java,java dev").unwrap();
        writeln!(file, "HR,hr generalist").unwrap();
        let corpus = Corpus::from_csv(file.path()).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.get(1).unwrap().category, "HR");
    }
}
