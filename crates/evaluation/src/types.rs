//! Item views used by the offline metrics.
//!
//! Metrics only need an id (set membership) and, for the diversity measures,
//! a genre list; callers project their richer result objects down to these.

use serde::{Deserialize, Serialize};

/// One entry of a ranked recommendation list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedItem {
    pub id: String,
    pub genres: Vec<String>,
}

impl RankedItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            genres: Vec::new(),
        }
    }

    pub fn with_genres(id: impl Into<String>, genres: &[&str]) -> Self {
        Self {
            id: id.into(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
        }
    }
}

/// One ground-truth item with a graded relevance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelevantItem {
    pub id: String,
    pub relevance: f64,
}

impl RelevantItem {
    pub fn new(id: impl Into<String>, relevance: f64) -> Self {
        Self {
            id: id.into(),
            relevance,
        }
    }

    /// Binary relevance (1.0), the default when no grade is known.
    pub fn binary(id: impl Into<String>) -> Self {
        Self::new(id, 1.0)
    }
}
