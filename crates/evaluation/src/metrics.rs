//! Offline ranking-quality metrics.
//!
//! Pure, stateless functions over `(ranked list, ground truth, k)`. Nothing
//! here touches the live scoring path; these run over result objects after
//! the fact.

use crate::types::{RankedItem, RelevantItem};
use std::collections::{HashMap, HashSet};

/// Precision@K: fraction of the top-k that is relevant.
///
/// The denominator is `min(k, list length)`, so a short list isn't punished
/// for positions it never filled.
pub fn precision_at_k(recommendations: &[RankedItem], relevant: &[RelevantItem], k: usize) -> f64 {
    if recommendations.is_empty() {
        return 0.0;
    }

    let relevant_set: HashSet<&str> = relevant.iter().map(|r| r.id.as_str()).collect();
    let top_k = &recommendations[..k.min(recommendations.len())];
    let hits = top_k
        .iter()
        .filter(|rec| relevant_set.contains(rec.id.as_str()))
        .count();

    hits as f64 / k.min(recommendations.len()) as f64
}

/// Recall@K: fraction of all relevant items that made the top-k.
pub fn recall_at_k(recommendations: &[RankedItem], relevant: &[RelevantItem], k: usize) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }

    let relevant_set: HashSet<&str> = relevant.iter().map(|r| r.id.as_str()).collect();
    let top_k = &recommendations[..k.min(recommendations.len())];
    let hits = top_k
        .iter()
        .filter(|rec| relevant_set.contains(rec.id.as_str()))
        .count();

    hits as f64 / relevant.len() as f64
}

/// NDCG@K: DCG with `relevance / log2(rank + 1)` discounting, normalized by
/// the ideal DCG of the ground-truth relevances sorted descending.
///
/// Returns 0 when the ideal DCG is 0 (no relevant items).
pub fn ndcg_at_k(recommendations: &[RankedItem], relevant: &[RelevantItem], k: usize) -> f64 {
    if recommendations.is_empty() {
        return 0.0;
    }

    let relevance_map: HashMap<&str, f64> = relevant
        .iter()
        .map(|r| (r.id.as_str(), r.relevance))
        .collect();

    let dcg: f64 = recommendations
        .iter()
        .take(k)
        .enumerate()
        .map(|(index, rec)| {
            let relevance = relevance_map.get(rec.id.as_str()).copied().unwrap_or(0.0);
            relevance / ((index + 2) as f64).log2()
        })
        .sum();

    let mut ideal: Vec<f64> = relevance_map.values().copied().collect();
    ideal.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    let idcg: f64 = ideal
        .iter()
        .take(k)
        .enumerate()
        .map(|(index, relevance)| relevance / ((index + 2) as f64).log2())
        .sum();

    if idcg > 0.0 {
        dcg / idcg
    } else {
        0.0
    }
}

/// Intra-list diversity: `1 - mean(pairwise similarity)` over the top-k.
///
/// A single-item list is perfectly diverse (1.0); an empty list carries no
/// diversity at all (0.0).
pub fn diversity_at_k<F>(recommendations: &[RankedItem], similarity: F, k: usize) -> f64
where
    F: Fn(&RankedItem, &RankedItem) -> f64,
{
    if recommendations.is_empty() {
        return 0.0;
    }
    if recommendations.len() == 1 {
        return 1.0;
    }

    let top_k = &recommendations[..k.min(recommendations.len())];
    let mut total = 0.0;
    let mut pairs = 0u64;

    for i in 0..top_k.len() {
        for j in (i + 1)..top_k.len() {
            total += similarity(&top_k[i], &top_k[j]);
            pairs += 1;
        }
    }

    if pairs == 0 {
        return 1.0;
    }
    1.0 - total / pairs as f64
}

/// Genre diversity: Shannon entropy of the genre distribution in the top-k,
/// normalized by `log2(distinct genre count)`. A single distinct genre (or
/// an empty list) scores 0.
pub fn genre_diversity_at_k(recommendations: &[RankedItem], k: usize) -> f64 {
    if recommendations.is_empty() {
        return 0.0;
    }

    let top_k = &recommendations[..k.min(recommendations.len())];
    let mut genre_counts: HashMap<&str, u64> = HashMap::new();
    for rec in top_k {
        for genre in &rec.genres {
            *genre_counts.entry(genre.as_str()).or_insert(0) += 1;
        }
    }

    let total = top_k.len() as f64;
    let entropy: f64 = genre_counts
        .values()
        .map(|&count| {
            let p = count as f64 / total;
            if p > 0.0 {
                -p * p.log2()
            } else {
                0.0
            }
        })
        .sum();

    let max_entropy = (genre_counts.len().max(1) as f64).log2();
    if max_entropy > 0.0 {
        entropy / max_entropy
    } else {
        0.0
    }
}

/// Coverage: unique recommended ids over the total catalog size.
pub fn coverage(recommendations: &[RankedItem], total_items: usize) -> f64 {
    if total_items == 0 {
        return 0.0;
    }
    let unique: HashSet<&str> = recommendations.iter().map(|r| r.id.as_str()).collect();
    unique.len() as f64 / total_items as f64
}

/// Average precision for one ranked list, normalized by `|relevant|`.
pub fn average_precision(
    recommendations: &[RankedItem],
    relevant: &[RelevantItem],
    k: usize,
) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }

    let relevant_set: HashSet<&str> = relevant.iter().map(|r| r.id.as_str()).collect();
    let mut hits = 0u64;
    let mut precision_sum = 0.0;

    for (index, rec) in recommendations.iter().take(k).enumerate() {
        if relevant_set.contains(rec.id.as_str()) {
            hits += 1;
            precision_sum += hits as f64 / (index + 1) as f64;
        }
    }

    if hits > 0 {
        precision_sum / relevant.len() as f64
    } else {
        0.0
    }
}

/// Mean average precision across many users' ranked lists.
///
/// `all_relevant` is indexed alongside `all_recommendations`; a missing
/// ground-truth list counts as empty.
pub fn mean_average_precision(
    all_recommendations: &[Vec<RankedItem>],
    all_relevant: &[Vec<RelevantItem>],
    k: usize,
) -> f64 {
    if all_recommendations.is_empty() {
        return 0.0;
    }

    static EMPTY: Vec<RelevantItem> = Vec::new();
    let total: f64 = all_recommendations
        .iter()
        .enumerate()
        .map(|(index, recommendations)| {
            let relevant = all_relevant.get(index).unwrap_or(&EMPTY);
            average_precision(recommendations, relevant, k)
        })
        .sum();

    total / all_recommendations.len() as f64
}

/// Genre Jaccard similarity, the default for [`diversity_at_k`].
pub fn genre_similarity(a: &RankedItem, b: &RankedItem) -> f64 {
    let genres_a: HashSet<&str> = a.genres.iter().map(String::as_str).collect();
    let genres_b: HashSet<&str> = b.genres.iter().map(String::as_str).collect();

    let union = genres_a.union(&genres_b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = genres_a.intersection(&genres_b).count();
    intersection as f64 / union as f64
}
