//! Core domain records handed to the recommendation core by the surrounding
//! service layer.
//!
//! Persistence, auth and transport live outside this workspace; the core only
//! ever sees these records read-only, one request at a time. Optional fields
//! carry explicit `Option<T>` types with documented neutral defaults rather
//! than runtime fallback chains.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user
pub type UserId = String;

/// Unique identifier for a content item
pub type ContentId = String;

// =============================================================================
// User-related Types
// =============================================================================

/// One entry in a user's viewing history.
///
/// Entries are append/update-only and keyed by `content_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchRecord {
    pub content_id: ContentId,
    /// User's rating for the item on a 1-5 scale, if they rated it
    #[serde(default)]
    pub rating: Option<f32>,
    /// Last playback position in minutes
    #[serde(default)]
    pub last_watch_position: Option<f32>,
    /// Total runtime of the item in minutes
    #[serde(default)]
    pub total_duration: Option<f32>,
    /// Minutes actually watched across all sessions
    #[serde(default)]
    pub watch_time: f32,
    pub timestamp: DateTime<Utc>,
}

impl WatchRecord {
    /// Fraction of the item the user got through, if both position and
    /// duration are known.
    pub fn completion(&self) -> Option<f32> {
        match (self.last_watch_position, self.total_duration) {
            (Some(pos), Some(total)) if total > 0.0 => Some(pos / total),
            _ => None,
        }
    }
}

/// A person's taste signal: stated preferences plus viewing history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    /// Genres the user listed as preferred (free-form labels)
    #[serde(default)]
    pub genre_preferences: Vec<String>,
    /// Streaming platforms the user listed as preferred
    #[serde(default)]
    pub platform_preferences: Vec<String>,
    #[serde(default)]
    pub viewing_history: Vec<WatchRecord>,
}

impl UserProfile {
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            genre_preferences: Vec::new(),
            platform_preferences: Vec::new(),
            viewing_history: Vec::new(),
        }
    }

    /// Look up the watch record for a content item, if the user has watched it.
    pub fn watch_record(&self, content_id: &str) -> Option<&WatchRecord> {
        self.viewing_history
            .iter()
            .find(|record| record.content_id == content_id)
    }

    /// Append or update a watch record, keyed by content id.
    pub fn record_watch(&mut self, record: WatchRecord) {
        match self
            .viewing_history
            .iter_mut()
            .find(|existing| existing.content_id == record.content_id)
        {
            Some(existing) => *existing = record,
            None => self.viewing_history.push(record),
        }
    }
}

// =============================================================================
// Content-related Types
// =============================================================================

/// A catalog entry.
///
/// Missing optional fields default to neutral values at feature-extraction
/// time: rating behaves as "unknown" (neutral 0.5 sub-score), year defaults
/// to the current year, duration to 0, sets to empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ContentId,
    pub title: String,
    #[serde(default)]
    pub genres: Vec<String>,
    /// Editorial mood labels (e.g. "relaxed", "excited")
    #[serde(default)]
    pub mood_tags: Vec<String>,
    #[serde(default)]
    pub cast: Vec<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    /// Aggregate rating on a 0-10 scale
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub year: Option<i32>,
    /// Runtime in minutes
    #[serde(default)]
    pub duration: Option<f32>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

impl ContentItem {
    pub fn new(id: impl Into<ContentId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            genres: Vec::new(),
            mood_tags: Vec::new(),
            cast: Vec::new(),
            director: None,
            platform: None,
            rating: None,
            year: None,
            duration: None,
            thumbnail_url: None,
        }
    }
}

// =============================================================================
// Context Signal
// =============================================================================

/// Request-time situational input. Derived per request, never persisted.
///
/// Unset fields are filled from the system clock at feature-extraction time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextSignal {
    /// Hour of day, 0-23
    #[serde(default)]
    pub hour: Option<u32>,
    /// Device class (e.g. "tv", "mobile")
    #[serde(default)]
    pub device: Option<String>,
    /// Whether the user is watching with others
    #[serde(default)]
    pub social_context: bool,
    /// Day of week, 0 = Sunday
    #[serde(default)]
    pub day_of_week: Option<u32>,
}

// =============================================================================
// CatalogIndex - In-Memory Store
// =============================================================================

/// Seam to the excluded persistence layer.
///
/// The engine only ever reads user and content records through this trait;
/// it never touches storage directly.
pub trait CatalogProvider {
    /// Fetch a user profile by id
    fn find_user(&self, id: &str) -> Option<UserProfile>;

    /// Fetch the entire content catalog
    fn all_content(&self) -> Vec<ContentItem>;

    /// Fetch up to `limit` items sorted by rating descending (cold start)
    fn top_rated(&self, limit: usize) -> Vec<ContentItem>;
}

/// In-memory catalog used by tests and the demo CLI.
///
/// Provides O(1) lookups for users and content items.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    users: HashMap<UserId, UserProfile>,
    content: HashMap<ContentId, ContentItem>,
}

impl CatalogIndex {
    /// Creates a new, empty CatalogIndex
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a user by id
    pub fn get_user(&self, id: &str) -> Option<&UserProfile> {
        self.users.get(id)
    }

    /// Get a content item by id
    pub fn get_content(&self, id: &str) -> Option<&ContentItem> {
        self.content.get(id)
    }

    /// Insert a user into the index
    pub fn insert_user(&mut self, user: UserProfile) {
        self.users.insert(user.id.clone(), user);
    }

    /// Insert a content item into the index
    pub fn insert_content(&mut self, item: ContentItem) {
        self.content.insert(item.id.clone(), item);
    }

    /// Iterate over all users
    pub fn users(&self) -> impl Iterator<Item = &UserProfile> {
        self.users.values()
    }

    /// Get counts for debugging/validation
    pub fn counts(&self) -> (usize, usize) {
        (self.users.len(), self.content.len())
    }
}

impl CatalogProvider for CatalogIndex {
    fn find_user(&self, id: &str) -> Option<UserProfile> {
        self.users.get(id).cloned()
    }

    fn all_content(&self) -> Vec<ContentItem> {
        self.content.values().cloned().collect()
    }

    fn top_rated(&self, limit: usize) -> Vec<ContentItem> {
        let mut items: Vec<ContentItem> = self.content.values().cloned().collect();
        items.sort_by(|a, b| {
            let ra = a.rating.unwrap_or(0.0);
            let rb = b.rating.unwrap_or(0.0);
            rb.partial_cmp(&ra).unwrap_or(std::cmp::Ordering::Equal)
        });
        items.truncate(limit);
        items
    }
}
