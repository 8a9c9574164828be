//! A/B experimentation for the recommendation stack.
//!
//! This crate provides:
//! - Experiment registration with validated traffic splits
//! - Deterministic, sticky hash-based variant assignment
//! - Telemetry capture (impressions, clicks, conversions, engagement)
//! - Results with per-variant rates and a chi-square significance test
//!
//! The [`ExperimentStore`] is lock-free at the map level and safe to share
//! behind an `Arc` across request handlers.

pub mod error;
pub mod framework;
pub mod results;

// Re-export main types
pub use error::{ExperimentError, Result};
pub use framework::{EngagementSummary, ExperimentConfig, ExperimentStore, Variant, CONTROL_VARIANT};
pub use results::{ExperimentResults, Significance, VariantReport};
