//! Ranking trials: one positive among category-disjoint negatives.

use cvmatch_mine::Corpus;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

/// One retrieval trial: a query, a candidate set, and positive labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    /// The category this trial was drawn from.
    pub category: String,
    /// The simulated query text.
    pub query: String,
    /// Candidate texts; the positive is always at index 0 before ranking.
    pub candidates: Vec<String>,
    /// `labels[i]` is true iff `candidates[i]` is the positive.
    pub labels: Vec<bool>,
}

/// Sample one trial per category: a simulated query, one random positive
/// from the category, and `negatives` random documents from other
/// categories.
///
/// Categories that cannot field a full trial (no documents, or too few
/// out-of-category documents) are skipped with a log line, never an error.
pub fn sample_trials<R: Rng>(corpus: &Corpus, negatives: usize, rng: &mut R) -> Vec<Trial> {
    let mut categories: Vec<&str> = corpus.categories().collect();
    categories.sort_unstable();

    let mut trials = Vec::new();
    for category in categories {
        let positives = corpus.ids_in_category(category);
        let others = corpus.ids_outside_category(category);
        if positives.is_empty() || others.len() < negatives {
            debug!(category, "skipping category: not enough documents for a trial");
            continue;
        }

        let Some(&positive_id) = positives.choose(rng) else { continue };
        let Some(positive) = corpus.get(positive_id) else { continue };

        let mut candidates = Vec::with_capacity(negatives + 1);
        let mut labels = Vec::with_capacity(negatives + 1);
        candidates.push(positive.text.clone());
        labels.push(true);
        for &id in others.choose_multiple(rng, negatives) {
            let Some(negative) = corpus.get(id) else { continue };
            candidates.push(negative.text.clone());
            labels.push(false);
        }

        trials.push(Trial {
            category: category.to_string(),
            query: format!("{category} job description"),
            candidates,
            labels,
        });
    }

    info!(trials = trials.len(), "sampled evaluation trials");
    trials
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn corpus() -> Corpus {
        Corpus::new([
            ("java one".to_string(), "Java".to_string()),
            ("java two".to_string(), "Java".to_string()),
            ("web one".to_string(), "Web".to_string()),
            ("web two".to_string(), "Web".to_string()),
            ("hr one".to_string(), "HR".to_string()),
        ])
        .unwrap()
    }

    #[test]
    fn one_trial_per_viable_category() {
        let mut rng = StdRng::seed_from_u64(7);
        let trials = sample_trials(&corpus(), 2, &mut rng);
        assert_eq!(trials.len(), 3);
        for trial in &trials {
            assert_eq!(trial.candidates.len(), 3);
            assert_eq!(trial.labels.iter().filter(|&&l| l).count(), 1);
            assert!(trial.labels[0]);
        }
    }

    #[test]
    fn starved_categories_are_skipped() {
        // No category can see 5 out-of-category documents here.
        let mut rng = StdRng::seed_from_u64(7);
        let trials = sample_trials(&corpus(), 5, &mut rng);
        assert!(trials.is_empty());
    }

    #[test]
    fn sampling_is_deterministic_for_a_fixed_seed() {
        let a = sample_trials(&corpus(), 2, &mut StdRng::seed_from_u64(42));
        let b = sample_trials(&corpus(), 2, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
