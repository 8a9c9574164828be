//! Human-readable explanations for recommendations.
//!
//! Reasons are collected in a fixed priority order (mood, genre, similarity,
//! rating, freshness) behind score thresholds; the top two are joined into
//! one sentence pair. Template variants are picked with an internal RNG so
//! repeated requests don't read identically; seed it for deterministic
//! output in tests.

use crate::scoring::ScoredCandidate;
use chrono::{Datelike, Local};
use mood::MoodAnalysis;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

const MOOD_TEMPLATES: &[&str] = &[
    "Perfect for your {mood} mood",
    "Matches your current {mood} vibe",
    "Ideal for when you're feeling {mood}",
    "Great choice for a {mood} evening",
];

const GENRE_TEMPLATES: &[&str] = &[
    "Features your favorite {genre} genre",
    "A {genre} film you'll love",
    "Classic {genre} content",
    "Top-rated {genre} selection",
];

const SIMILARITY_TEMPLATES: &[&str] = &[
    "Similar to content you've enjoyed",
    "Based on your viewing history",
    "Matches your preferences",
    "Recommended based on your past watches",
];

const RATING_TEMPLATES: &[&str] = &[
    "Highly rated ({rating}/10)",
    "Well-reviewed content",
    "Critically acclaimed",
    "Top-rated selection",
];

const FRESHNESS_TEMPLATES: &[&str] = &[
    "Recently released",
    "New and trending",
    "Fresh content",
    "Latest release",
];

const FALLBACK_REASON: &str = "Recommended based on your viewing preferences";

/// One factor of a detailed explanation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationFactor {
    pub factor: String,
    pub strength: f32,
    pub text: String,
}

/// Turns scoring metadata into short natural-language reasons.
#[derive(Debug)]
pub struct ExplanationGenerator {
    rng: Mutex<StdRng>,
    current_year: i32,
}

impl ExplanationGenerator {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
            current_year: Local::now().year(),
        }
    }

    /// Deterministic generator for tests.
    pub fn with_seed(seed: u64, current_year: i32) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            current_year,
        }
    }

    /// Builds the one-line explanation for a scored candidate.
    ///
    /// Collects applicable reasons in priority order and returns the first
    /// two joined with ". ", terminated with ".".
    pub fn generate(
        &self,
        candidate: &ScoredCandidate,
        user_genre_weights: &HashMap<String, f32>,
        analysis: &MoodAnalysis,
    ) -> String {
        let mut reasons: Vec<String> = Vec::new();

        if candidate.mood_score > 0.7 {
            reasons.push(self.fill(MOOD_TEMPLATES, "{mood}", analysis.primary.label()));
        } else if candidate.mood_score > 0.5 {
            reasons.push("Matches your current mood".to_string());
        }

        if candidate.genre_boost > 0.7 {
            if let Some(genre) =
                top_genre(&candidate.content.genres, user_genre_weights, analysis)
            {
                reasons.push(self.fill(GENRE_TEMPLATES, "{genre}", &genre));
            }
        }

        if candidate.similarity > 0.7 {
            reasons.push(self.pick(SIMILARITY_TEMPLATES));
        }

        if let Some(rating) = candidate.content.rating {
            if rating >= 8.0 {
                reasons.push(self.fill(RATING_TEMPLATES, "{rating}", &format_rating(rating)));
            } else if rating >= 7.0 {
                reasons.push("Well-reviewed content".to_string());
            }
        }

        if let Some(year) = candidate.content.year {
            if year >= self.current_year - 1 {
                reasons.push(self.pick(FRESHNESS_TEMPLATES));
            }
        }

        if reasons.is_empty() {
            reasons.push(FALLBACK_REASON.to_string());
        }

        let mut explanation = reasons[..reasons.len().min(2)].join(". ");
        explanation.push('.');
        explanation
    }

    /// Structured multi-factor breakdown of why a candidate scored well.
    pub fn detailed_explanation(
        &self,
        candidate: &ScoredCandidate,
        analysis: &MoodAnalysis,
    ) -> Vec<ExplanationFactor> {
        let mut factors = Vec::new();

        if candidate.mood_score > 0.5 {
            factors.push(ExplanationFactor {
                factor: "mood".to_string(),
                strength: candidate.mood_score,
                text: format!(
                    "Strong match for {} mood ({}%)",
                    analysis.primary,
                    percent(candidate.mood_score)
                ),
            });
        }

        if candidate.genre_boost > 0.5 {
            factors.push(ExplanationFactor {
                factor: "genre".to_string(),
                strength: candidate.genre_boost,
                text: format!(
                    "Matches your genre preferences ({}%)",
                    percent(candidate.genre_boost)
                ),
            });
        }

        if candidate.similarity > 0.5 {
            factors.push(ExplanationFactor {
                factor: "similarity".to_string(),
                strength: candidate.similarity,
                text: format!(
                    "Similar to your viewing history ({}%)",
                    percent(candidate.similarity)
                ),
            });
        }

        if let Some(rating) = candidate.content.rating {
            if rating >= 7.0 {
                factors.push(ExplanationFactor {
                    factor: "quality".to_string(),
                    strength: rating / 10.0,
                    text: format!("High rating: {}/10", format_rating(rating)),
                });
            }
        }

        factors
    }

    /// Fixed template for the cold-start path.
    pub fn cold_start_explanation(&self, analysis: &MoodAnalysis) -> String {
        format!("Popular {} content with high ratings", analysis.primary)
    }

    fn pick(&self, templates: &[&str]) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let index = rng.gen_range(0..templates.len());
        templates[index].to_string()
    }

    fn fill(&self, templates: &[&str], placeholder: &str, value: &str) -> String {
        self.pick(templates).replace(placeholder, value)
    }
}

impl Default for ExplanationGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// The genre worth citing: mood-associated genres first, then the user's
/// preferences by descending weight, then the content's first genre.
fn top_genre(
    content_genres: &[String],
    user_genre_weights: &HashMap<String, f32>,
    analysis: &MoodAnalysis,
) -> Option<String> {
    for genre in &analysis.genres {
        if content_genres.contains(genre) {
            return Some(genre.clone());
        }
    }

    let mut by_weight: Vec<(&String, &f32)> = user_genre_weights.iter().collect();
    by_weight.sort_by(|a, b| {
        b.1.partial_cmp(a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    for (genre, _) in by_weight {
        if content_genres.contains(genre) {
            return Some(genre.clone());
        }
    }

    content_genres.first().cloned()
}

/// Drops the trailing ".0" for whole-number ratings ("8.5" but "8").
fn format_rating(rating: f32) -> String {
    if (rating - rating.trunc()).abs() < f32::EPSILON {
        format!("{}", rating.trunc() as i32)
    } else {
        format!("{rating:.1}")
    }
}

fn percent(score: f32) -> i32 {
    (score * 100.0).round() as i32
}
