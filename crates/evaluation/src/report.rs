//! One-call evaluation over a ranked list.

use crate::metrics::{
    coverage, diversity_at_k, genre_diversity_at_k, genre_similarity, ndcg_at_k, precision_at_k,
    recall_at_k,
};
use crate::types::{RankedItem, RelevantItem};
use serde::{Deserialize, Serialize};

/// Bundle of the standard ranking metrics at a single cutoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub k: usize,
    pub precision: f64,
    pub recall: f64,
    pub ndcg: f64,
    pub diversity: f64,
    pub genre_diversity: f64,
    /// Only present when the caller supplied a catalog size.
    pub coverage: Option<f64>,
}

/// Computes every metric at cutoff `k` in one pass. Diversity uses genre
/// Jaccard similarity; pass a catalog size via [`evaluate_with_catalog`] to
/// also get coverage.
pub fn evaluate(
    recommendations: &[RankedItem],
    relevant: &[RelevantItem],
    k: usize,
) -> EvaluationReport {
    EvaluationReport {
        k,
        precision: precision_at_k(recommendations, relevant, k),
        recall: recall_at_k(recommendations, relevant, k),
        ndcg: ndcg_at_k(recommendations, relevant, k),
        diversity: diversity_at_k(recommendations, genre_similarity, k),
        genre_diversity: genre_diversity_at_k(recommendations, k),
        coverage: None,
    }
}

/// [`evaluate`] plus catalog coverage.
pub fn evaluate_with_catalog(
    recommendations: &[RankedItem],
    relevant: &[RelevantItem],
    k: usize,
    total_items: usize,
) -> EvaluationReport {
    let mut report = evaluate(recommendations, relevant, k);
    report.coverage = Some(coverage(recommendations, total_items));
    report
}
