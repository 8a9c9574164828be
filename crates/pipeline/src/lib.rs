//! Feature engineering for the recommendation pipeline.
//!
//! This crate provides:
//! - Extraction of normalized user/content/context feature vectors
//! - The six-factor weighted user↔content similarity score
//!
//! ## Architecture
//! The engine extracts user and context features once per request, content
//! features once per candidate, then calls `calculate_similarity` for every
//! candidate. Extraction and scoring are pure; every candidate can be scored
//! independently.
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::FeatureEngineer;
//!
//! let engineer = FeatureEngineer::new();
//! let user_features = engineer.extract_user_features(&user);
//! let context_features = engineer.extract_context_features(&context);
//! let content_features = engineer.extract_content_features(&item);
//!
//! let score = engineer.calculate_similarity(
//!     &user_features,
//!     &content_features,
//!     &context_features,
//! );
//! ```

pub mod features;
pub mod similarity;

// Re-export main types
pub use features::{
    ContentFeatures, ContextFeatures, FeatureEngineer, TimeCategory, UserFeatures,
};
