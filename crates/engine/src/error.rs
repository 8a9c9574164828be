//! Error types for the recommendation engine.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecommendError {
    #[error("User not found: {user_id}")]
    UserNotFound { user_id: String },

    #[error("Scoring task failed: {0}")]
    ScoringTask(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, RecommendError>;
