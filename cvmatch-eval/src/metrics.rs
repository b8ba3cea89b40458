//! Ranking metrics: Recall@1, Recall@K, MRR, and per-rank hit counts.

use serde::{Deserialize, Serialize};

/// Accumulates ranking trial outcomes.
///
/// Each trial records the 1-based rank at which the positive appeared
/// within the considered window, or `None` if it fell outside it. MRR
/// contribution is `1/rank` inside the window and 0 outside.
#[derive(Debug, Clone, Default)]
pub struct RankTally {
    window: usize,
    trials: usize,
    reciprocal_sum: f64,
    hits_at_rank: Vec<usize>,
}

impl RankTally {
    /// Create a tally considering the top `window` ranks.
    pub fn new(window: usize) -> Self {
        Self { window, trials: 0, reciprocal_sum: 0.0, hits_at_rank: vec![0; window] }
    }

    /// Record one trial. `rank` is 1-based; `None` means the positive was
    /// outside the considered window.
    pub fn record(&mut self, rank: Option<usize>) {
        self.trials += 1;
        if let Some(rank) = rank {
            if rank >= 1 && rank <= self.window {
                self.reciprocal_sum += 1.0 / rank as f64;
                self.hits_at_rank[rank - 1] += 1;
            }
        }
    }

    /// Number of recorded trials.
    pub fn trials(&self) -> usize {
        self.trials
    }

    /// Summarize the tally, or `None` when no trials were recorded —
    /// "no data" instead of a division by zero.
    pub fn summary(&self) -> Option<RankSummary> {
        if self.trials == 0 {
            return None;
        }
        let trials = self.trials as f64;
        let hits: usize = self.hits_at_rank.iter().sum();
        Some(RankSummary {
            window: self.window,
            trials: self.trials,
            mrr: self.reciprocal_sum / trials,
            recall_at_1: self.hits_at_rank.first().copied().unwrap_or(0) as f64 / trials,
            recall_at_k: hits as f64 / trials,
            hits_at_rank: self.hits_at_rank.clone(),
        })
    }
}

/// Aggregated ranking metrics over a trial set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankSummary {
    /// The considered window size K.
    pub window: usize,
    /// Number of trials.
    pub trials: usize,
    /// Mean reciprocal rank.
    pub mrr: f64,
    /// Fraction of trials with the positive ranked first.
    pub recall_at_1: f64,
    /// Fraction of trials with the positive within the top K.
    pub recall_at_k: f64,
    /// Hit count per rank position (index 0 = rank 1).
    pub hits_at_rank: Vec<usize>,
}

impl RankSummary {
    /// Render the plain-text report block.
    pub fn render(&self, label: &str) -> String {
        let mut out = String::new();
        out.push_str(&format!("Evaluation Results: {label}\n"));
        out.push_str(&format!("MRR:        {:.4}\n", self.mrr));
        out.push_str(&format!("Recall@1:   {:.4}\n", self.recall_at_1));
        out.push_str(&format!("Recall@{}:   {:.4}\n", self.window, self.recall_at_k));
        out.push_str("Hits by Rank Position:\n");
        for (i, count) in self.hits_at_rank.iter().enumerate() {
            out.push_str(&format!(
                "  Rank {}: {} matches ({:.2}%)\n",
                i + 1,
                count,
                100.0 * *count as f64 / self.trials as f64
            ));
        }
        out
    }
}

/// Rank (1-based) of the first candidate with `label == true` within the
/// top `window` of `order`, where `order` holds candidate indices sorted by
/// descending score.
pub fn positive_rank(order: &[usize], labels: &[bool], window: usize) -> Option<usize> {
    order
        .iter()
        .take(window)
        .position(|&idx| labels.get(idx).copied().unwrap_or(false))
        .map(|pos| pos + 1)
}

/// Indices of `scores` sorted by descending score, ties by ascending index.
pub fn rank_order(scores: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tally_reports_no_data() {
        assert!(RankTally::new(5).summary().is_none());
    }

    #[test]
    fn mrr_is_reciprocal_of_rank() {
        let mut tally = RankTally::new(5);
        tally.record(Some(2));
        let summary = tally.summary().unwrap();
        assert!((summary.mrr - 0.5).abs() < 1e-9);
        assert_eq!(summary.recall_at_1, 0.0);
        assert_eq!(summary.recall_at_k, 1.0);
    }

    #[test]
    fn outside_window_contributes_zero() {
        let mut tally = RankTally::new(3);
        tally.record(None);
        tally.record(Some(1));
        let summary = tally.summary().unwrap();
        assert!((summary.mrr - 0.5).abs() < 1e-9);
        assert_eq!(summary.recall_at_k, 0.5);
    }

    #[test]
    fn recall_at_1_never_exceeds_recall_at_k() {
        let mut tally = RankTally::new(4);
        for rank in [Some(1), Some(3), Some(4), None, Some(2), Some(1)] {
            tally.record(rank);
        }
        let summary = tally.summary().unwrap();
        assert!(summary.recall_at_1 <= summary.recall_at_k);
    }

    #[test]
    fn rank_order_sorts_descending_with_stable_ties() {
        assert_eq!(rank_order(&[0.1, 0.9, 0.5, 0.5]), vec![1, 2, 3, 0]);
    }

    #[test]
    fn positive_rank_respects_window() {
        let order = [3, 0, 2, 1];
        let labels = [false, true, false, false];
        assert_eq!(positive_rank(&order, &labels, 4), Some(4));
        assert_eq!(positive_rank(&order, &labels, 3), None);
    }
}
