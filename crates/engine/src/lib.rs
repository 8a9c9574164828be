//! Mood- and history-aware recommendation engine.
//!
//! This crate provides:
//! - [`RecommendationEngine`]: per-request scoring, filtering, diversity
//!   re-ranking and explanation over a [`catalog::CatalogProvider`]
//! - A cold-start path for users without profiles
//! - [`ExplanationGenerator`]: templated natural-language reasons
//!
//! ## Architecture
//! A request is a pure pipeline over the catalog: every candidate is scored
//! independently (in parallel, on the blocking pool), then filtered by
//! watched penalty, sorted, diversity-boosted and truncated. The engine
//! holds no per-request state, so one instance serves concurrent requests.

pub mod engine;
pub mod error;
pub mod explain;
pub mod scoring;

// Re-export main types
pub use engine::{Recommendation, RecommendationEngine, RecommendOptions, ScoreBreakdown};
pub use error::{RecommendError, Result};
pub use explain::{ExplanationFactor, ExplanationGenerator};
pub use scoring::ScoredCandidate;
