//! Candidate scoring, watched-content penalties and diversity re-ranking.
//!
//! The scoring pass is a pure parallel map over the catalog: each candidate
//! is scored independently against the same user, mood and context, then the
//! caller filters, sorts and re-ranks.

use catalog::{ContentItem, WatchRecord};
use mood::{MoodAnalysis, MoodAnalyzer};
use pipeline::{ContextFeatures, FeatureEngineer, UserFeatures};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};

// Composite score weights
const SIMILARITY_WEIGHT: f32 = 0.4;
const MOOD_WEIGHT: f32 = 0.3;
const GENRE_BOOST_WEIGHT: f32 = 0.2;
const NOVELTY_WEIGHT: f32 = 0.1;

/// One content item scored against one user + mood + context.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub content: ContentItem,
    /// Composite score; the diversity bonus may push it slightly over 1
    pub score: f32,
    pub similarity: f32,
    pub mood_score: f32,
    pub genre_boost: f32,
    pub watched_penalty: f32,
}

/// Scores every catalog item against the user.
///
/// Composite per candidate:
/// `similarity*0.4 + mood*0.3 + genre_boost*0.2 + (1 - penalty)*0.1`.
pub fn score_candidates(
    engineer: &FeatureEngineer,
    analyzer: &MoodAnalyzer,
    user: &UserFeatures,
    context: &ContextFeatures,
    analysis: &MoodAnalysis,
    history: &[WatchRecord],
    items: Vec<ContentItem>,
) -> Vec<ScoredCandidate> {
    items
        .into_par_iter()
        .map(|item| {
            let content = engineer.extract_content_features(&item);
            let similarity = engineer.calculate_similarity(user, &content, context);
            let mood_score = analyzer.compatibility(&content.mood_tags, analysis);
            let watched_penalty = watched_penalty(history, &item.id);
            let genre_boost =
                genre_boost(&user.genre_weights, &content.genres, &analysis.genres);

            let score = similarity * SIMILARITY_WEIGHT
                + mood_score * MOOD_WEIGHT
                + genre_boost * GENRE_BOOST_WEIGHT
                + (1.0 - watched_penalty) * NOVELTY_WEIGHT;

            ScoredCandidate {
                content: item,
                score,
                similarity,
                mood_score,
                genre_boost,
                watched_penalty,
            }
        })
        .collect()
}

/// Penalty for content the user has already watched.
///
/// 0 if never watched; 0.9 once completed (>= 90%); 0.5 if watched past the
/// halfway mark; 0.3 if rated >= 4 (a rewatch candidate); 0.7 otherwise.
pub fn watched_penalty(history: &[WatchRecord], content_id: &str) -> f32 {
    let Some(record) = history.iter().find(|h| h.content_id == content_id) else {
        return 0.0;
    };

    if let Some(completion) = record.completion() {
        if completion >= 0.9 {
            return 0.9;
        }
        if completion >= 0.5 {
            return 0.5;
        }
    }

    if record.rating.map(|r| r >= 4.0).unwrap_or(false) {
        return 0.3;
    }

    0.7
}

/// Genre preference boost: 0.5 base, +0.3 x the user's weight for each
/// matching genre, +0.2 flat when any content genre matches the mood's genre
/// set, capped at 1.0.
pub fn genre_boost(
    user_weights: &HashMap<String, f32>,
    content_genres: &[String],
    mood_genres: &[String],
) -> f32 {
    let mut boost = 0.5;

    for genre in content_genres {
        if let Some(weight) = user_weights.get(genre) {
            boost += weight * 0.3;
        }
    }

    let mood_set: HashSet<&str> = mood_genres.iter().map(String::as_str).collect();
    if content_genres.iter().any(|g| mood_set.contains(g.as_str())) {
        boost += 0.2;
    }

    boost.min(1.0)
}

/// Sorts candidates by score, highest first.
pub fn sort_by_score(candidates: &mut [ScoredCandidate]) {
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Diversity re-ranking over a score-sorted list.
///
/// Only applied when there are more candidates than the requested limit. A
/// single greedy pass walks the sorted list tracking the genres and
/// platforms seen so far; each item gets a bonus
/// `(1 - genre_overlap_fraction)*0.1 + (1 - platform_seen)*0.05` added to
/// its score, then the whole list is re-sorted by the boosted scores. This
/// is a deliberate approximation rather than an optimal diverse top-k; the
/// one-pass-then-re-sort ordering is part of the contract.
pub fn apply_diversity_boost(candidates: &mut [ScoredCandidate], limit: usize) {
    if candidates.len() <= limit {
        return;
    }

    let mut used_genres: HashSet<String> = HashSet::new();
    let mut used_platforms: HashSet<String> = HashSet::new();

    for candidate in candidates.iter_mut() {
        let genres = &candidate.content.genres;
        let overlap = genres.iter().filter(|g| used_genres.contains(*g)).count();
        let genre_overlap_fraction = overlap as f32 / genres.len().max(1) as f32;

        let platform_seen = candidate
            .content
            .platform
            .as_ref()
            .map(|p| used_platforms.contains(p))
            .unwrap_or(false);

        let bonus = (1.0 - genre_overlap_fraction) * 0.1
            + if platform_seen { 0.0 } else { 0.05 };
        candidate.score += bonus;

        used_genres.extend(genres.iter().cloned());
        if let Some(platform) = &candidate.content.platform {
            used_platforms.insert(platform.clone());
        }
    }

    sort_by_score(candidates);
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::ContentItem;
    use chrono::Utc;
    use std::collections::HashMap;

    fn watch(
        content_id: &str,
        rating: Option<f32>,
        position: Option<f32>,
        duration: Option<f32>,
    ) -> WatchRecord {
        WatchRecord {
            content_id: content_id.to_string(),
            rating,
            last_watch_position: position,
            total_duration: duration,
            watch_time: 30.0,
            timestamp: Utc::now(),
        }
    }

    fn candidate(id: &str, score: f32, genres: &[&str], platform: &str) -> ScoredCandidate {
        let mut content = ContentItem::new(id, id);
        content.genres = genres.iter().map(|g| g.to_string()).collect();
        content.platform = Some(platform.to_string());
        ScoredCandidate {
            content,
            score,
            similarity: 0.0,
            mood_score: 0.0,
            genre_boost: 0.0,
            watched_penalty: 0.0,
        }
    }

    #[test]
    fn test_penalty_unwatched_is_zero() {
        assert_eq!(watched_penalty(&[], "c1"), 0.0);
        let history = vec![watch("other", Some(5.0), None, None)];
        assert_eq!(watched_penalty(&history, "c1"), 0.0);
    }

    #[test]
    fn test_penalty_tiers() {
        let completed = vec![watch("c1", None, Some(95.0), Some(100.0))];
        assert_eq!(watched_penalty(&completed, "c1"), 0.9);

        let halfway = vec![watch("c1", None, Some(60.0), Some(100.0))];
        assert_eq!(watched_penalty(&halfway, "c1"), 0.5);

        let loved = vec![watch("c1", Some(5.0), Some(20.0), Some(100.0))];
        assert_eq!(watched_penalty(&loved, "c1"), 0.3);

        let watched = vec![watch("c1", Some(2.0), None, None)];
        assert_eq!(watched_penalty(&watched, "c1"), 0.7);
    }

    #[test]
    fn test_genre_boost_base_and_cap() {
        let weights = HashMap::new();
        assert_eq!(genre_boost(&weights, &[], &[]), 0.5);

        let mut heavy = HashMap::new();
        heavy.insert("Action".to_string(), 1.0);
        heavy.insert("Drama".to_string(), 1.0);
        let genres = vec!["Action".to_string(), "Drama".to_string()];
        let moods = vec!["Action".to_string()];
        // 0.5 + 0.3 + 0.3 + 0.2 = 1.3, capped
        assert_eq!(genre_boost(&heavy, &genres, &moods), 1.0);
    }

    #[test]
    fn test_genre_boost_user_and_mood_components() {
        let mut weights = HashMap::new();
        weights.insert("Action".to_string(), 0.5);
        let genres = vec!["Action".to_string()];

        // User weight only: 0.5 + 0.5*0.3
        let user_only = genre_boost(&weights, &genres, &[]);
        assert!((user_only - 0.65).abs() < 1e-6);

        // Plus flat mood match
        let with_mood = genre_boost(&weights, &genres, &["Action".to_string()]);
        assert!((with_mood - 0.85).abs() < 1e-6);
    }

    #[test]
    fn test_diversity_skipped_at_or_below_limit() {
        let mut candidates = vec![
            candidate("a", 0.9, &["Action"], "netflix"),
            candidate("b", 0.8, &["Action"], "netflix"),
        ];
        apply_diversity_boost(&mut candidates, 2);
        assert_eq!(candidates[0].score, 0.9);
        assert_eq!(candidates[1].score, 0.8);
    }

    #[test]
    fn test_diversity_bonus_favors_fresh_genres() {
        let mut candidates = vec![
            candidate("a", 0.90, &["Action"], "netflix"),
            candidate("b", 0.89, &["Action"], "netflix"),
            candidate("c", 0.88, &["Romance"], "hulu"),
        ];
        apply_diversity_boost(&mut candidates, 2);

        // a: +0.10 + 0.05 = 1.05; b: +0 + 0 = 0.89; c: +0.10 + 0.05 = 1.03
        let scores: Vec<(&str, f32)> = candidates
            .iter()
            .map(|c| (c.content.id.as_str(), c.score))
            .collect();
        assert_eq!(scores[0].0, "a");
        assert_eq!(scores[1].0, "c");
        assert_eq!(scores[2].0, "b");
        assert!((scores[0].1 - 1.05).abs() < 1e-6);
        assert!((scores[1].1 - 1.03).abs() < 1e-6);
        assert!((scores[2].1 - 0.89).abs() < 1e-6);
    }

    #[test]
    fn test_composite_score_formula() {
        use mood::MoodAnalyzer;
        use pipeline::FeatureEngineer;

        let engineer = FeatureEngineer::with_current_year(2026);
        let analyzer = MoodAnalyzer::new();
        let analysis = analyzer.analyze("excited", None);

        let mut user = catalog::UserProfile::new("u1");
        user.genre_preferences = vec!["Action".to_string()];
        let user_features = engineer.extract_user_features(&user);
        let context = engineer.extract_context_features(&catalog::ContextSignal {
            hour: Some(14),
            ..Default::default()
        });

        let mut item = ContentItem::new("c1", "Test");
        item.genres = vec!["Action".to_string()];
        item.mood_tags = vec!["excited".to_string()];
        item.rating = Some(8.0);
        item.year = Some(2026);

        let scored = score_candidates(
            &engineer,
            &analyzer,
            &user_features,
            &context,
            &analysis,
            &[],
            vec![item],
        );
        assert_eq!(scored.len(), 1);
        let c = &scored[0];
        let expected = c.similarity * 0.4
            + c.mood_score * 0.3
            + c.genre_boost * 0.2
            + (1.0 - c.watched_penalty) * 0.1;
        assert!((c.score - expected).abs() < 1e-6);
        assert_eq!(c.watched_penalty, 0.0);
    }
}
