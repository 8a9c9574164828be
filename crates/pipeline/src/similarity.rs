//! Multi-factor user↔content similarity.
//!
//! Six sub-scores combined by a fixed weighted sum: genre 0.40, platform
//! 0.10, rating 0.20, cast/director 0.15, context 0.10, freshness 0.05. The
//! total is divided by the sum of weights actually applied so missing
//! sub-scores don't bias the result.

use crate::features::{ContentFeatures, ContextFeatures, FeatureEngineer, TimeCategory, UserFeatures};
use std::collections::HashSet;

const GENRE_WEIGHT: f32 = 0.40;
const PLATFORM_WEIGHT: f32 = 0.10;
const RATING_WEIGHT: f32 = 0.20;
const CAST_WEIGHT: f32 = 0.15;
const CONTEXT_WEIGHT: f32 = 0.10;
const FRESHNESS_WEIGHT: f32 = 0.05;

impl FeatureEngineer {
    /// Weighted similarity score in [0, 1].
    pub fn calculate_similarity(
        &self,
        user: &UserFeatures,
        content: &ContentFeatures,
        context: &ContextFeatures,
    ) -> f32 {
        let mut score = 0.0;
        let mut weights = 0.0;

        score += genre_similarity(user, content) * GENRE_WEIGHT;
        weights += GENRE_WEIGHT;

        let platform_score = content
            .platform
            .as_deref()
            .and_then(|p| user.platform_weights.get(p))
            .copied()
            .unwrap_or(0.0);
        score += platform_score * PLATFORM_WEIGHT;
        weights += PLATFORM_WEIGHT;

        score += rating_similarity(user.avg_rating, content.rating) * RATING_WEIGHT;
        weights += RATING_WEIGHT;

        score += cast_similarity(user, content) * CAST_WEIGHT;
        weights += CAST_WEIGHT;

        score += context_similarity(content, context) * CONTEXT_WEIGHT;
        weights += CONTEXT_WEIGHT;

        score += content.freshness_score * FRESHNESS_WEIGHT;
        weights += FRESHNESS_WEIGHT;

        if weights > 0.0 {
            score / weights
        } else {
            0.0
        }
    }
}

/// Jaccard similarity between the user's genre-weight keys and the content's
/// genres. Content without genres scores a neutral 0.5.
fn genre_similarity(user: &UserFeatures, content: &ContentFeatures) -> f32 {
    if content.genres.is_empty() {
        return 0.5;
    }

    let user_genres: HashSet<&str> = user.genre_weights.keys().map(String::as_str).collect();
    let content_genres: HashSet<&str> = content.genres.iter().map(String::as_str).collect();

    let intersection = user_genres.intersection(&content_genres).count();
    let union = user_genres.union(&content_genres).count();

    if union == 0 {
        0.5
    } else {
        intersection as f32 / union as f32
    }
}

/// Closer ratings score higher; unknown content rating is neutral.
fn rating_similarity(user_avg: f32, content_rating: Option<f32>) -> f32 {
    match content_rating {
        Some(rating) => (1.0 - (user_avg - rating).abs() / 5.0).max(0.0),
        None => 0.5,
    }
}

/// 0.7 × matched-actor fraction + 0.3 × director match, capped at 1.0.
fn cast_similarity(user: &UserFeatures, content: &ContentFeatures) -> f32 {
    let mut score = 0.0;

    if !content.cast.is_empty() {
        let matches = content
            .cast
            .iter()
            .filter(|actor| user.preferred_actors.contains_key(*actor))
            .count();
        score += matches as f32 / content.cast.len().max(1) as f32 * 0.7;
    }

    if let Some(director) = &content.director {
        if user.preferred_directors.contains_key(director) {
            score += 0.3;
        }
    }

    score.min(1.0)
}

/// Neutral 0.5 base plus fixed bonuses for time-of-day fits, capped at 1.0.
fn context_similarity(content: &ContentFeatures, context: &ContextFeatures) -> f32 {
    let mut score: f32 = 0.5;

    if context.time_category == TimeCategory::Night
        && content.genres.iter().any(|g| g == "Horror")
    {
        score += 0.2;
    }
    if context.time_category == TimeCategory::Morning
        && content.genres.iter().any(|g| g == "Comedy")
    {
        score += 0.2;
    }
    // Longer content fits an evening slot
    if context.time_category == TimeCategory::Evening && content.duration > 90.0 {
        score += 0.1;
    }

    score.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{ContentItem, ContextSignal, UserProfile};

    fn engineer() -> FeatureEngineer {
        FeatureEngineer::with_current_year(2026)
    }

    fn context_at(hour: u32) -> ContextFeatures {
        engineer().extract_context_features(&ContextSignal {
            hour: Some(hour),
            ..ContextSignal::default()
        })
    }

    fn user_with_genres(genres: &[&str]) -> UserFeatures {
        let mut user = UserProfile::new("u1");
        user.genre_preferences = genres.iter().map(|g| g.to_string()).collect();
        engineer().extract_user_features(&user)
    }

    fn content_with(genres: &[&str], rating: Option<f32>, year: i32) -> ContentFeatures {
        let mut item = ContentItem::new("c1", "Test Item");
        item.genres = genres.iter().map(|g| g.to_string()).collect();
        item.rating = rating;
        item.year = Some(year);
        engineer().extract_content_features(&item)
    }

    #[test]
    fn test_similarity_in_unit_range() {
        let user = user_with_genres(&["Action", "Drama"]);
        let content = content_with(&["Action"], Some(8.0), 2026);
        let score = engineer().calculate_similarity(&user, &content, &context_at(20));
        assert!((0.0..=1.0).contains(&score), "score {score} out of range");
    }

    #[test]
    fn test_genre_overlap_raises_similarity() {
        let user = user_with_genres(&["Action"]);
        let matching = content_with(&["Action"], Some(5.0), 2020);
        let disjoint = content_with(&["Romance"], Some(5.0), 2020);
        let ctx = context_at(14);

        let hit = engineer().calculate_similarity(&user, &matching, &ctx);
        let miss = engineer().calculate_similarity(&user, &disjoint, &ctx);
        assert!(hit > miss);
    }

    #[test]
    fn test_genre_similarity_neutral_without_content_genres() {
        let user = user_with_genres(&["Action"]);
        let content = content_with(&[], Some(5.0), 2020);
        assert_eq!(genre_similarity(&user, &content), 0.5);
    }

    #[test]
    fn test_rating_similarity() {
        assert!((rating_similarity(5.0, Some(5.0)) - 1.0).abs() < 1e-6);
        assert!((rating_similarity(5.0, Some(7.5)) - 0.5).abs() < 1e-6);
        assert_eq!(rating_similarity(1.0, Some(10.0)), 0.0);
        assert_eq!(rating_similarity(5.0, None), 0.5);
    }

    #[test]
    fn test_cast_similarity_actor_and_director() {
        let mut user = user_with_genres(&[]);
        user.preferred_actors.insert("Ana Reyes".to_string(), 2.0);
        user.preferred_directors.insert("R. Okafor".to_string(), 1.0);

        let mut item = ContentItem::new("c1", "Cast Test");
        item.cast = vec!["Ana Reyes".to_string(), "Unknown".to_string()];
        item.director = Some("R. Okafor".to_string());
        let content = engineer().extract_content_features(&item);

        // 0.7 * (1/2) + 0.3 = 0.65
        assert!((cast_similarity(&user, &content) - 0.65).abs() < 1e-6);
    }

    #[test]
    fn test_context_bonus_horror_at_night() {
        let content = content_with(&["Horror"], None, 2020);
        assert!((context_similarity(&content, &context_at(23)) - 0.7).abs() < 1e-6);
        assert!((context_similarity(&content, &context_at(10)) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_context_bonus_long_content_in_evening() {
        let mut item = ContentItem::new("c1", "Long Film");
        item.duration = Some(120.0);
        let content = engineer().extract_content_features(&item);
        assert!((context_similarity(&content, &context_at(19)) - 0.6).abs() < 1e-6);
    }
}
