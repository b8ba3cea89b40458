//! Retrieval evaluation for resume-matching models.
//!
//! Three interchangeable protocols, all built on an
//! [`EmbeddingProvider`](cvmatch_mine::EmbeddingProvider):
//!
//! - **simulated-query** — per category, rank one positive among sampled
//!   category-disjoint negatives ([`simulated`], [`trial`]);
//! - **cross-model** — the same sampled trials run against several models
//!   for a direct comparison ([`compare`]);
//! - **human-agreement** — rank-correlate the model's ordering of a fixed
//!   candidate set against collected human orderings ([`human`]).
//!
//! Metrics: Recall@1, Recall@K, MRR, per-rank hit counts ([`metrics`]),
//! Kendall tau and Spearman rho ([`correlation`]).

pub mod compare;
pub mod correlation;
pub mod error;
pub mod human;
pub mod metrics;
pub mod rank;
pub mod simulated;
pub mod trial;

pub use compare::{ModelResult, NamedModel, compare_models};
pub use correlation::{kendall_tau, spearman_rho};
pub use error::{EvalError, Result};
pub use human::{Candidate, HumanAgreement, HumanStudy, evaluate_study};
pub use metrics::{RankSummary, RankTally, positive_rank, rank_order};
pub use rank::{RankedCandidate, rank_candidates};
pub use simulated::evaluate_trials;
pub use trial::{Trial, sample_trials};
