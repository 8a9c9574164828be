//! Offline evaluation of recommendation quality.
//!
//! This crate provides:
//! - Ranking metrics: precision@k, recall@k, NDCG@k, MAP
//! - List-quality metrics: intra-list diversity, genre entropy, coverage
//! - A single-call [`evaluate`] producing an [`EvaluationReport`]
//!
//! All functions are pure and operate on lightweight [`RankedItem`] /
//! [`RelevantItem`] views; callers project their own result types into them.

pub mod metrics;
pub mod report;
pub mod types;

// Re-export main types
pub use metrics::{
    average_precision, coverage, diversity_at_k, genre_diversity_at_k, genre_similarity,
    mean_average_precision, ndcg_at_k, precision_at_k, recall_at_k,
};
pub use report::{evaluate, evaluate_with_catalog, EvaluationReport};
pub use types::{RankedItem, RelevantItem};
