//! Feature extraction for users, content items and request context.
//!
//! Raw records become normalized feature vectors consumed by the similarity
//! scorer. Weight maps are built by uniform redistribution: each listed
//! preference gets `1 / count`, so non-empty maps sum to 1.0 per source list.

use catalog::{ContentItem, ContextSignal, UserProfile};
use chrono::{Datelike, Local, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Normalized projection of a user profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserFeatures {
    /// Stated genre preferences, uniformly weighted to sum to 1.0
    pub genre_weights: HashMap<String, f32>,
    /// Stated platform preferences, uniformly weighted to sum to 1.0
    pub platform_weights: HashMap<String, f32>,
    /// Average rating the user gave; 5.0 (neutral) without rated history
    pub avg_rating: f32,
    /// Total minutes watched across the whole history
    pub total_watch_time: f32,
    /// Number of history entries
    pub watch_frequency: usize,
    /// Fraction of history entries watched to >= 90%
    pub completion_rate: f32,
    /// Actors from highly-rated history, weighted by occurrence count.
    /// Empty unless extracted with catalog access.
    pub preferred_actors: HashMap<String, f32>,
    /// Directors from highly-rated history, weighted by occurrence count.
    /// Empty unless extracted with catalog access.
    pub preferred_directors: HashMap<String, f32>,
}

/// Derived view of a content item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentFeatures {
    pub genres: Vec<String>,
    pub mood_tags: Vec<String>,
    pub cast: Vec<String>,
    pub director: Option<String>,
    pub platform: Option<String>,
    /// Aggregate rating on a 0-10 scale; None scores a neutral 0.5
    pub rating: Option<f32>,
    /// Release year, defaulting to the current year when missing
    pub year: i32,
    /// Runtime in minutes, defaulting to 0
    pub duration: f32,
    /// Released within the last two years
    pub is_recent: bool,
    /// `max(0, 1 - age/5)` where age is years since release
    pub freshness_score: f32,
}

/// Coarse time-of-day bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeCategory {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeCategory {
    /// Bucket an hour of day using fixed boundaries [6, 12, 17, 22).
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => TimeCategory::Morning,
            12..=16 => TimeCategory::Afternoon,
            17..=21 => TimeCategory::Evening,
            _ => TimeCategory::Night,
        }
    }
}

/// Derived view of request-time context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextFeatures {
    pub hour: u32,
    pub time_category: TimeCategory,
    pub device: String,
    pub social_context: bool,
    pub day_of_week: u32,
}

/// Converts raw records into feature vectors and scores user↔content
/// similarity.
///
/// The current year is injectable so freshness and recency features are
/// deterministic under test.
#[derive(Debug, Clone, Copy)]
pub struct FeatureEngineer {
    pub(crate) current_year: i32,
}

impl FeatureEngineer {
    /// Create an engineer pinned to the system clock's current year.
    pub fn new() -> Self {
        Self {
            current_year: Local::now().year(),
        }
    }

    /// Create an engineer with a fixed current year (tests).
    pub fn with_current_year(current_year: i32) -> Self {
        Self { current_year }
    }

    /// Build a user feature vector from the profile alone.
    ///
    /// Actor/director preference maps stay empty here; use
    /// [`extract_user_features_with_history`](Self::extract_user_features_with_history)
    /// when catalog records are on hand.
    pub fn extract_user_features(&self, user: &UserProfile) -> UserFeatures {
        let history = &user.viewing_history;

        let ratings: Vec<f32> = history.iter().filter_map(|h| h.rating).collect();
        let avg_rating = if ratings.is_empty() {
            5.0
        } else {
            ratings.iter().sum::<f32>() / ratings.len() as f32
        };

        let completed = history
            .iter()
            .filter(|h| h.completion().map(|c| c >= 0.9).unwrap_or(false))
            .count();
        let completion_rate = if history.is_empty() {
            0.0
        } else {
            completed as f32 / history.len() as f32
        };

        UserFeatures {
            genre_weights: normalize_weights(&user.genre_preferences),
            platform_weights: normalize_weights(&user.platform_preferences),
            avg_rating,
            total_watch_time: history.iter().map(|h| h.watch_time).sum(),
            watch_frequency: history.len(),
            completion_rate,
            preferred_actors: HashMap::new(),
            preferred_directors: HashMap::new(),
        }
    }

    /// Build a user feature vector, filling actor/director preferences from
    /// the items the user rated >= 4 or watched to completion.
    pub fn extract_user_features_with_history(
        &self,
        user: &UserProfile,
        items: &[ContentItem],
    ) -> UserFeatures {
        let mut features = self.extract_user_features(user);

        for record in &user.viewing_history {
            let liked = record.rating.map(|r| r >= 4.0).unwrap_or(false)
                || record.completion().map(|c| c >= 0.9).unwrap_or(false);
            if !liked {
                continue;
            }
            let Some(item) = items.iter().find(|i| i.id == record.content_id) else {
                continue;
            };
            for actor in &item.cast {
                *features.preferred_actors.entry(actor.clone()).or_insert(0.0) += 1.0;
            }
            if let Some(director) = &item.director {
                *features
                    .preferred_directors
                    .entry(director.clone())
                    .or_insert(0.0) += 1.0;
            }
        }

        features
    }

    /// Build a content feature vector, substituting neutral defaults for
    /// missing fields.
    pub fn extract_content_features(&self, content: &ContentItem) -> ContentFeatures {
        let year = content.year.unwrap_or(self.current_year);
        ContentFeatures {
            genres: content.genres.clone(),
            mood_tags: content.mood_tags.clone(),
            cast: content.cast.clone(),
            director: content.director.clone(),
            platform: content.platform.clone(),
            rating: content.rating,
            year,
            duration: content.duration.unwrap_or(0.0),
            is_recent: year >= self.current_year - 2,
            freshness_score: self.freshness(year),
        }
    }

    /// Build context features, filling unset fields from the system clock.
    pub fn extract_context_features(&self, context: &ContextSignal) -> ContextFeatures {
        let now = Local::now();
        let hour = context.hour.unwrap_or_else(|| now.hour());
        ContextFeatures {
            hour,
            time_category: TimeCategory::from_hour(hour),
            device: context.device.clone().unwrap_or_else(|| "unknown".to_string()),
            social_context: context.social_context,
            day_of_week: context
                .day_of_week
                .unwrap_or_else(|| now.weekday().num_days_from_sunday()),
        }
    }

    fn freshness(&self, year: i32) -> f32 {
        let age = (self.current_year - year) as f32;
        (1.0 - age / 5.0).max(0.0)
    }
}

impl Default for FeatureEngineer {
    fn default() -> Self {
        Self::new()
    }
}

/// Uniform redistribution: each listed label gets `1 / count`.
fn normalize_weights(labels: &[String]) -> HashMap<String, f32> {
    let mut weights = HashMap::new();
    if labels.is_empty() {
        return weights;
    }
    let weight = 1.0 / labels.len() as f32;
    for label in labels {
        *weights.entry(label.clone()).or_insert(0.0) += weight;
    }
    weights
}
