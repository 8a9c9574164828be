//! End-to-end engine tests over an in-memory catalog.

use catalog::{CatalogIndex, ContentItem, ContextSignal, UserProfile, WatchRecord};
use chrono::Utc;
use engine::{ExplanationGenerator, RecommendError, RecommendOptions, RecommendationEngine};
use pipeline::FeatureEngineer;
use std::sync::Arc;

const YEAR: i32 = 2026;

fn test_engine(catalog: CatalogIndex) -> RecommendationEngine {
    RecommendationEngine::new(Arc::new(catalog))
        .with_feature_engineer(FeatureEngineer::with_current_year(YEAR))
        .with_explainer(ExplanationGenerator::with_seed(7, YEAR))
}

fn item(id: &str, genres: &[&str], mood_tags: &[&str], rating: f32, year: i32) -> ContentItem {
    let mut content = ContentItem::new(id, format!("Title {id}"));
    content.genres = genres.iter().map(|g| g.to_string()).collect();
    content.mood_tags = mood_tags.iter().map(|t| t.to_string()).collect();
    content.rating = Some(rating);
    content.year = Some(year);
    content.platform = Some("streamflix".to_string());
    content
}

fn options(mood_text: &str, limit: usize) -> RecommendOptions {
    RecommendOptions {
        mood_text: mood_text.to_string(),
        intensity: None,
        context: ContextSignal {
            hour: Some(14),
            ..ContextSignal::default()
        },
        limit,
    }
}

#[tokio::test]
async fn test_excited_action_fan_gets_boosted_action_content() {
    let mut catalog = CatalogIndex::new();
    let mut user = UserProfile::new("u1");
    user.genre_preferences = vec!["Action".to_string()];
    catalog.insert_user(user);
    catalog.insert_content(item("c1", &["Action"], &["excited"], 9.0, YEAR));

    let engine = test_engine(catalog);
    let recommendations = engine
        .get_recommendations("u1", options("I feel excited and pumped", 10))
        .await
        .unwrap();

    assert_eq!(recommendations.len(), 1);
    let top = &recommendations[0];
    assert_eq!(top.rank, 1);
    assert!(
        top.metadata.genre_boost >= 0.8,
        "genre boost {} too low",
        top.metadata.genre_boost
    );
    assert!(
        top.explanation.contains("excited"),
        "explanation should mention the mood, got: {}",
        top.explanation
    );
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let engine = test_engine(CatalogIndex::new());
    let result = engine.get_recommendations("ghost", options("", 10)).await;
    assert!(matches!(
        result,
        Err(RecommendError::UserNotFound { user_id }) if user_id == "ghost"
    ));
}

#[tokio::test]
async fn test_empty_catalog_yields_empty_list() {
    let mut catalog = CatalogIndex::new();
    catalog.insert_user(UserProfile::new("u1"));

    let engine = test_engine(catalog);
    let recommendations = engine
        .get_recommendations("u1", options("happy", 10))
        .await
        .unwrap();
    assert!(recommendations.is_empty());
}

#[tokio::test]
async fn test_completed_content_is_dropped() {
    let mut catalog = CatalogIndex::new();
    let mut user = UserProfile::new("u1");
    user.viewing_history = vec![WatchRecord {
        content_id: "seen".to_string(),
        rating: None,
        last_watch_position: Some(98.0),
        total_duration: Some(100.0),
        watch_time: 98.0,
        timestamp: Utc::now(),
    }];
    catalog.insert_user(user);
    catalog.insert_content(item("seen", &["Action"], &[], 9.5, YEAR));
    catalog.insert_content(item("fresh", &["Action"], &[], 7.0, YEAR));

    let engine = test_engine(catalog);
    let recommendations = engine
        .get_recommendations("u1", options("", 10))
        .await
        .unwrap();

    let ids: Vec<&str> = recommendations
        .iter()
        .map(|r| r.content_id.as_str())
        .collect();
    assert_eq!(ids, vec!["fresh"]);
}

#[tokio::test]
async fn test_ranks_are_contiguous_and_limited() {
    let mut catalog = CatalogIndex::new();
    catalog.insert_user(UserProfile::new("u1"));
    for index in 0..15 {
        catalog.insert_content(item(
            &format!("c{index}"),
            &["Drama"],
            &[],
            5.0 + (index % 5) as f32,
            YEAR - index % 4,
        ));
    }

    let engine = test_engine(catalog);
    let recommendations = engine
        .get_recommendations("u1", options("", 5))
        .await
        .unwrap();

    assert_eq!(recommendations.len(), 5);
    for (index, rec) in recommendations.iter().enumerate() {
        assert_eq!(rec.rank, index + 1);
    }
    // Scores are non-increasing after the diversity re-sort
    for pair in recommendations.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn test_cold_start_blends_popularity_and_mood() {
    let mut catalog = CatalogIndex::new();
    catalog.insert_content(item("popular_mismatch", &["Horror"], &["thrilled"], 9.5, 2020));
    catalog.insert_content(item("happy_hit", &["Comedy"], &["happy"], 8.5, 2024));
    catalog.insert_content(item("weak", &["Drama"], &[], 4.0, 2015));

    let engine = test_engine(catalog);
    let recommendations = engine
        .get_cold_start_recommendations(options("feeling happy and cheerful", 2))
        .await
        .unwrap();

    assert_eq!(recommendations.len(), 2);
    // 8.5-rated happy content outranks the 9.5-rated mismatch:
    // 0.85*0.6 + 1.0*0.4 = 0.91 vs 0.95*0.6 + 0*0.4 = 0.57
    assert_eq!(recommendations[0].content_id, "happy_hit");
    assert_eq!(
        recommendations[0].explanation,
        "Popular happy content with high ratings"
    );
}
