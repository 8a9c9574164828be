//! Request orchestration: mood analysis, scoring, ranking and explanation.

use crate::error::{RecommendError, Result};
use crate::explain::ExplanationGenerator;
use crate::scoring::{self, ScoredCandidate};
use catalog::{CatalogProvider, ContextSignal};
use mood::{MoodAnalysis, MoodAnalyzer};
use pipeline::FeatureEngineer;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Default penalty threshold: completed content is dropped, everything else
/// stays eligible at a discount.
const DEFAULT_PENALTY_THRESHOLD: f32 = 0.9;

const DEFAULT_LIMIT: usize = 10;

/// Options for one recommendation request.
#[derive(Debug, Clone)]
pub struct RecommendOptions {
    /// Free-text mood description; empty means the neutral default mood
    pub mood_text: String,
    /// Overrides the modifier-word intensity scan when set
    pub intensity: Option<f32>,
    pub context: ContextSignal,
    pub limit: usize,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            mood_text: String::new(),
            intensity: None,
            context: ContextSignal::default(),
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Sub-scores carried alongside each recommendation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub similarity: f32,
    pub mood_score: f32,
    pub genre_boost: f32,
}

/// One ranked, explained recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    /// 1-based, contiguous
    pub rank: usize,
    pub content_id: String,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub platform: Option<String>,
    pub rating: Option<f32>,
    pub genres: Vec<String>,
    pub score: f32,
    pub explanation: String,
    pub metadata: ScoreBreakdown,
}

/// Hybrid recommendation engine combining content similarity, mood
/// compatibility and genre preference.
///
/// Holds no per-request state; a request runs
/// `fetch -> analyze-mood -> extract-features -> score-all -> filter ->
/// sort -> diversify -> explain -> truncate`.
pub struct RecommendationEngine {
    catalog: Arc<dyn CatalogProvider + Send + Sync>,
    feature_engineer: FeatureEngineer,
    mood_analyzer: MoodAnalyzer,
    explainer: ExplanationGenerator,
    penalty_threshold: f32,
}

impl RecommendationEngine {
    pub fn new(catalog: Arc<dyn CatalogProvider + Send + Sync>) -> Self {
        Self {
            catalog,
            feature_engineer: FeatureEngineer::new(),
            mood_analyzer: MoodAnalyzer::new(),
            explainer: ExplanationGenerator::new(),
            penalty_threshold: DEFAULT_PENALTY_THRESHOLD,
        }
    }

    /// Replaces the explanation generator (seeded for deterministic output).
    pub fn with_explainer(mut self, explainer: ExplanationGenerator) -> Self {
        self.explainer = explainer;
        self
    }

    /// Pins the feature engineer's current year (tests).
    pub fn with_feature_engineer(mut self, feature_engineer: FeatureEngineer) -> Self {
        self.feature_engineer = feature_engineer;
        self
    }

    /// Adjusts the watched-penalty cutoff above which candidates are
    /// dropped before ranking.
    pub fn with_penalty_threshold(mut self, threshold: f32) -> Self {
        self.penalty_threshold = threshold;
        self
    }

    /// Personalized recommendations for a known user.
    ///
    /// Fails with [`RecommendError::UserNotFound`] for an unknown user; an
    /// empty catalog yields an empty list. The per-candidate scoring pass
    /// runs on the blocking pool so a large catalog doesn't stall the async
    /// runtime.
    pub async fn get_recommendations(
        &self,
        user_id: &str,
        options: RecommendOptions,
    ) -> Result<Vec<Recommendation>> {
        let user = self
            .catalog
            .find_user(user_id)
            .ok_or_else(|| RecommendError::UserNotFound {
                user_id: user_id.to_string(),
            })?;

        let items = self.catalog.all_content();
        if items.is_empty() {
            debug!(user_id, "catalog is empty, returning no recommendations");
            return Ok(Vec::new());
        }

        let analysis = self
            .mood_analyzer
            .analyze(&options.mood_text, options.intensity);
        debug!(
            user_id,
            mood = %analysis.primary,
            intensity = analysis.intensity,
            confidence = analysis.confidence,
            "mood analyzed"
        );

        let user_features = self
            .feature_engineer
            .extract_user_features_with_history(&user, &items);
        let context_features = self.feature_engineer.extract_context_features(&options.context);

        let engineer = self.feature_engineer;
        let analyzer = self.mood_analyzer;
        let history = user.viewing_history.clone();
        let scoring_analysis = analysis.clone();
        let scoring_user = user_features.clone();
        let mut scored = tokio::task::spawn_blocking(move || {
            scoring::score_candidates(
                &engineer,
                &analyzer,
                &scoring_user,
                &context_features,
                &scoring_analysis,
                &history,
                items,
            )
        })
        .await?;

        let threshold = self.penalty_threshold;
        scored.retain(|candidate| candidate.watched_penalty < threshold);
        scoring::sort_by_score(&mut scored);
        scoring::apply_diversity_boost(&mut scored, options.limit);

        let recommendations: Vec<Recommendation> = scored
            .into_iter()
            .take(options.limit)
            .enumerate()
            .map(|(index, candidate)| {
                let explanation =
                    self.explainer
                        .generate(&candidate, &user_features.genre_weights, &analysis);
                self.build_recommendation(index, candidate, explanation)
            })
            .collect();

        info!(
            user_id,
            mood = %analysis.primary,
            count = recommendations.len(),
            "recommendations ready"
        );
        Ok(recommendations)
    }

    /// Recommendations for anonymous or no-history users: popular content
    /// re-scored by mood compatibility.
    pub async fn get_cold_start_recommendations(
        &self,
        options: RecommendOptions,
    ) -> Result<Vec<Recommendation>> {
        let analysis = self
            .mood_analyzer
            .analyze(&options.mood_text, options.intensity);
        let candidates = self.catalog.top_rated(options.limit * 3);

        let mut scored: Vec<ScoredCandidate> = candidates
            .into_iter()
            .map(|item| {
                let content = self.feature_engineer.extract_content_features(&item);
                let mood_score = self.mood_analyzer.compatibility(&content.mood_tags, &analysis);
                let popularity = item.rating.unwrap_or(0.0) / 10.0;
                let score = popularity * 0.6 + mood_score * 0.4;
                ScoredCandidate {
                    content: item,
                    score,
                    similarity: 0.0,
                    mood_score,
                    genre_boost: 0.0,
                    watched_penalty: 0.0,
                }
            })
            .collect();

        scoring::sort_by_score(&mut scored);

        let explanation = self.explainer.cold_start_explanation(&analysis);
        let recommendations = scored
            .into_iter()
            .take(options.limit)
            .enumerate()
            .map(|(index, candidate)| {
                self.build_recommendation(index, candidate, explanation.clone())
            })
            .collect();

        Ok(recommendations)
    }

    /// Structured factor breakdown for one already-scored candidate.
    pub fn explain_in_detail(
        &self,
        candidate: &ScoredCandidate,
        analysis: &MoodAnalysis,
    ) -> Vec<crate::explain::ExplanationFactor> {
        self.explainer.detailed_explanation(candidate, analysis)
    }

    fn build_recommendation(
        &self,
        index: usize,
        candidate: ScoredCandidate,
        explanation: String,
    ) -> Recommendation {
        let metadata = ScoreBreakdown {
            similarity: candidate.similarity,
            mood_score: candidate.mood_score,
            genre_boost: candidate.genre_boost,
        };
        let content = candidate.content;
        Recommendation {
            rank: index + 1,
            content_id: content.id,
            title: content.title,
            thumbnail_url: content.thumbnail_url,
            platform: content.platform,
            rating: content.rating,
            genres: content.genres,
            score: candidate.score,
            explanation,
            metadata,
        }
    }
}
