//! Free-text mood analysis.
//!
//! Maps a textual mood description to a structured signal: a primary mood,
//! up to two secondary moods, associated genres, an intensity and a
//! confidence. Absence of signal always degrades to a neutral default;
//! analysis never fails.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The fixed set of mood labels the analyzer can detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Excited,
    Relaxed,
    Stressed,
    Bored,
    Romantic,
    Adventurous,
    Thoughtful,
    Energetic,
    Melancholic,
    Nostalgic,
    Thrilled,
    Peaceful,
    Curious,
}

impl Mood {
    pub const ALL: [Mood; 15] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Excited,
        Mood::Relaxed,
        Mood::Stressed,
        Mood::Bored,
        Mood::Romantic,
        Mood::Adventurous,
        Mood::Thoughtful,
        Mood::Energetic,
        Mood::Melancholic,
        Mood::Nostalgic,
        Mood::Thrilled,
        Mood::Peaceful,
        Mood::Curious,
    ];

    /// Lower-case label, as it appears in content mood tags.
    pub fn label(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Excited => "excited",
            Mood::Relaxed => "relaxed",
            Mood::Stressed => "stressed",
            Mood::Bored => "bored",
            Mood::Romantic => "romantic",
            Mood::Adventurous => "adventurous",
            Mood::Thoughtful => "thoughtful",
            Mood::Energetic => "energetic",
            Mood::Melancholic => "melancholic",
            Mood::Nostalgic => "nostalgic",
            Mood::Thrilled => "thrilled",
            Mood::Peaceful => "peaceful",
            Mood::Curious => "curious",
        }
    }

    /// Keywords whose presence in the text signals this mood.
    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Mood::Happy => &["happy", "joyful", "cheerful", "upbeat", "positive", "good mood"],
            Mood::Sad => &["sad", "down", "depressed", "melancholy", "blue", "low"],
            Mood::Excited => &["excited", "pumped", "energized", "thrilled", "hyped"],
            Mood::Relaxed => &["relaxed", "calm", "chill", "peaceful", "zen", "mellow"],
            Mood::Stressed => &["stressed", "anxious", "worried", "tense", "overwhelmed"],
            Mood::Bored => &["bored", "uninterested", "tired", "dull"],
            Mood::Romantic => &["romantic", "loving", "intimate", "passionate"],
            Mood::Adventurous => &["adventurous", "bold", "daring", "exploratory"],
            Mood::Thoughtful => &["thoughtful", "contemplative", "reflective", "philosophical"],
            Mood::Energetic => &["energetic", "active", "vibrant", "lively"],
            Mood::Melancholic => &["melancholic", "somber", "pensive", "wistful"],
            Mood::Nostalgic => &["nostalgic", "sentimental", "reminiscent"],
            Mood::Thrilled => &["thrilled", "excited", "on edge", "suspenseful"],
            Mood::Peaceful => &["peaceful", "serene", "tranquil", "quiet"],
            Mood::Curious => &["curious", "inquisitive", "wondering", "intrigued"],
        }
    }

    /// Genres associated with this mood.
    pub fn genres(&self) -> &'static [&'static str] {
        match self {
            Mood::Happy => &["Comedy", "Musical", "Romance", "Family"],
            Mood::Sad => &["Drama", "Romance", "Melodrama"],
            Mood::Excited => &["Action", "Adventure", "Thriller", "Sci-Fi"],
            Mood::Relaxed => &["Drama", "Documentary", "Nature", "Meditation"],
            Mood::Stressed => &["Comedy", "Light Drama", "Romance"],
            Mood::Bored => &["Action", "Thriller", "Mystery", "Horror"],
            Mood::Romantic => &["Romance", "Romantic Comedy", "Drama"],
            Mood::Adventurous => &["Adventure", "Action", "Thriller"],
            Mood::Thoughtful => &["Drama", "Documentary", "Biography", "Historical"],
            Mood::Energetic => &["Action", "Sports", "Musical", "Comedy"],
            Mood::Melancholic => &["Drama", "Romance", "Art House"],
            Mood::Nostalgic => &["Classic", "Retro", "Period Drama"],
            Mood::Thrilled => &["Thriller", "Horror", "Action", "Mystery"],
            Mood::Peaceful => &["Documentary", "Nature", "Meditation", "Drama"],
            Mood::Curious => &["Mystery", "Documentary", "Sci-Fi", "Thriller"],
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Intensity modifiers, checked in this order; first match wins.
const INTENSITY_MODIFIERS: &[(&str, f32)] = &[
    ("very", 1.5),
    ("extremely", 2.0),
    ("quite", 1.2),
    ("slightly", 0.8),
    ("somewhat", 0.9),
    ("a bit", 0.7),
];

/// Result of interpreting free text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodAnalysis {
    pub primary: Mood,
    /// At most two secondary moods, strongest first
    pub secondary: Vec<Mood>,
    /// Union of the genre associations of primary + secondary moods
    pub genres: Vec<String>,
    /// Derived or caller-supplied intensity in [0, 1]
    pub intensity: f32,
    /// Keyword match strength for the primary mood, in [0, 1]
    pub confidence: f32,
    /// Labels of primary + secondary moods
    pub mood_tags: Vec<String>,
}

impl MoodAnalysis {
    /// All detected moods: primary first, then secondaries.
    pub fn moods(&self) -> impl Iterator<Item = Mood> + '_ {
        std::iter::once(self.primary).chain(self.secondary.iter().copied())
    }
}

/// Analyzes free-text mood descriptions against fixed keyword tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoodAnalyzer;

impl MoodAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze a mood description.
    ///
    /// `intensity`, when supplied, overrides the modifier-word scan.
    /// Empty or unrecognized text returns the neutral default mood.
    pub fn analyze(&self, mood_text: &str, intensity: Option<f32>) -> MoodAnalysis {
        let text = mood_text.trim().to_lowercase();
        if text.is_empty() {
            return Self::default_mood();
        }

        let detected_intensity = intensity.unwrap_or_else(|| Self::scan_intensity(&text));

        // Score every mood by keyword match fraction
        let mut detected: Vec<(Mood, f32)> = Mood::ALL
            .iter()
            .filter_map(|mood| {
                let keywords = mood.keywords();
                let matches = keywords.iter().filter(|kw| text.contains(*kw)).count();
                if matches > 0 {
                    let confidence = (matches as f32 / keywords.len() as f32).min(1.0);
                    Some((*mood, confidence))
                } else {
                    None
                }
            })
            .collect();

        if detected.is_empty() {
            return Self::default_mood();
        }

        // Stable sort keeps table order on confidence ties
        detected.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let (primary, confidence) = detected[0];
        let secondary: Vec<Mood> = detected.iter().skip(1).take(2).map(|(m, _)| *m).collect();

        let mut genres = BTreeSet::new();
        for mood in std::iter::once(primary).chain(secondary.iter().copied()) {
            genres.extend(mood.genres().iter().map(|g| g.to_string()));
        }

        let mood_tags = std::iter::once(primary)
            .chain(secondary.iter().copied())
            .map(|m| m.label().to_string())
            .collect();

        MoodAnalysis {
            primary,
            secondary,
            genres: genres.into_iter().collect(),
            intensity: detected_intensity,
            confidence,
            mood_tags,
        }
    }

    /// The neutral default used when no signal is present.
    pub fn default_mood() -> MoodAnalysis {
        MoodAnalysis {
            primary: Mood::Relaxed,
            secondary: Vec::new(),
            genres: vec!["Drama".to_string(), "Comedy".to_string(), "Action".to_string()],
            intensity: 0.5,
            confidence: 0.5,
            mood_tags: vec!["relaxed".to_string()],
        }
    }

    /// Compatibility between content mood tags and an analyzed mood.
    ///
    /// Jaccard similarity between the user's detected moods and the
    /// lower-cased content tags, boosted by `(1 + intensity)` and clamped to
    /// 1.0. Content without mood tags scores a neutral 0.5.
    pub fn compatibility(&self, content_mood_tags: &[String], analysis: &MoodAnalysis) -> f32 {
        if content_mood_tags.is_empty() {
            return 0.5;
        }

        let user_moods: BTreeSet<&str> = analysis.moods().map(|m| m.label()).collect();
        let content_moods: BTreeSet<String> = content_mood_tags
            .iter()
            .map(|tag| tag.to_lowercase())
            .collect();

        let intersection = user_moods
            .iter()
            .filter(|m| content_moods.contains(**m))
            .count();
        let union = user_moods.len() + content_moods.len()
            - content_moods
                .iter()
                .filter(|m| user_moods.contains(m.as_str()))
                .count();

        if union == 0 {
            return 0.5;
        }

        let jaccard = intersection as f32 / union as f32;
        (jaccard * (1.0 + analysis.intensity)).min(1.0)
    }

    /// Derive intensity from modifier words; 0.5 if none found.
    fn scan_intensity(text: &str) -> f32 {
        for (modifier, multiplier) in INTENSITY_MODIFIERS {
            if text.contains(modifier) {
                return (multiplier * 0.5).min(1.0);
            }
        }
        0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> MoodAnalyzer {
        MoodAnalyzer::new()
    }

    #[test]
    fn test_empty_text_returns_default_mood() {
        let analysis = analyzer().analyze("   ", None);
        assert_eq!(analysis.primary, Mood::Relaxed);
        assert!(analysis.secondary.is_empty());
        assert_eq!(analysis.intensity, 0.5);
        assert_eq!(analysis.confidence, 0.5);
    }

    #[test]
    fn test_unrecognized_text_returns_default_mood() {
        let analysis = analyzer().analyze("qwertyuiop", None);
        assert_eq!(analysis.primary, Mood::Relaxed);
    }

    #[test]
    fn test_detects_excited_from_keywords() {
        let analysis = analyzer().analyze("I feel excited and pumped", None);
        assert_eq!(analysis.primary, Mood::Excited);
        assert!(analysis.genres.iter().any(|g| g == "Action"));
        assert!(analysis.mood_tags.contains(&"excited".to_string()));
    }

    #[test]
    fn test_shared_keyword_favors_denser_table() {
        // "excited" appears in both the excited and thrilled keyword lists;
        // thrilled's shorter list gives it the higher match fraction
        let analysis = analyzer().analyze("I feel excited", None);
        assert_eq!(analysis.primary, Mood::Thrilled);
        assert!(analysis.secondary.contains(&Mood::Excited));
    }

    #[test]
    fn test_multiple_keywords_raise_confidence() {
        let one = analyzer().analyze("feeling happy", None);
        let two = analyzer().analyze("happy and cheerful today", None);
        assert_eq!(two.primary, Mood::Happy);
        assert!(two.confidence > one.confidence);
    }

    #[test]
    fn test_secondary_moods_capped_at_two() {
        // "thrilled" matches Excited and Thrilled, "calm" Relaxed,
        // "curious" Curious: at least four candidate moods
        let analysis = analyzer().analyze("thrilled, calm and curious", None);
        assert!(analysis.secondary.len() <= 2);
    }

    #[test]
    fn test_intensity_modifier_scan() {
        let very = analyzer().analyze("very happy", None);
        assert!((very.intensity - 0.75).abs() < 1e-6);

        let extremely = analyzer().analyze("extremely sad", None);
        assert!((extremely.intensity - 1.0).abs() < 1e-6);

        let slightly = analyzer().analyze("slightly bored", None);
        assert!((slightly.intensity - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_explicit_intensity_overrides_scan() {
        let analysis = analyzer().analyze("very happy", Some(0.2));
        assert!((analysis.intensity - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_compatibility_neutral_without_tags() {
        let analysis = analyzer().analyze("happy", None);
        assert_eq!(analyzer().compatibility(&[], &analysis), 0.5);
    }

    #[test]
    fn test_compatibility_exact_match_boosted_by_intensity() {
        let analysis = analyzer().analyze("happy", None);
        // Single user mood vs matching single tag: Jaccard 1.0, boost clamps to 1.0
        let score = analyzer().compatibility(&["Happy".to_string()], &analysis);
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_compatibility_disjoint_tags_scores_zero() {
        let analysis = analyzer().analyze("happy", None);
        let score = analyzer().compatibility(&["somber".to_string()], &analysis);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_compatibility_is_case_insensitive() {
        let analysis = analyzer().analyze("feeling romantic", None);
        let upper = analyzer().compatibility(&["ROMANTIC".to_string()], &analysis);
        let lower = analyzer().compatibility(&["romantic".to_string()], &analysis);
        assert_eq!(upper, lower);
        assert!(upper > 0.9);
    }
}
