//! Error types for experiment management.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExperimentError {
    #[error("Experiment not found: {experiment_id}")]
    NotFound { experiment_id: String },

    #[error("Experiment already exists: {experiment_id}")]
    AlreadyExists { experiment_id: String },

    #[error("Traffic split must sum to 1.0, got {total}")]
    InvalidTrafficSplit { total: f64 },

    #[error("Experiment has no variants: {experiment_id}")]
    NoVariants { experiment_id: String },
}

pub type Result<T> = std::result::Result<T, ExperimentError>;
