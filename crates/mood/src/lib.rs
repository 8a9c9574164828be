//! # Mood Crate
//!
//! Maps free-text mood descriptions to structured mood signals.
//!
//! ## Components
//!
//! - **Mood**: the fixed label set with keyword and genre tables
//! - **MoodAnalyzer**: text → `MoodAnalysis` (primary/secondary moods,
//!   associated genres, intensity, confidence) plus content compatibility
//!   scoring
//!
//! The analyzer never fails: empty or unrecognized input degrades to a
//! neutral default mood.

pub mod analyzer;

pub use analyzer::{Mood, MoodAnalysis, MoodAnalyzer};
