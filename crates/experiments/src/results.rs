//! Experiment readouts and the two-variant significance test.

use crate::error::Result;
use crate::framework::{EngagementSummary, ExperimentStore};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Chi-square critical value for p < 0.05 at one degree of freedom.
const CHI_SQUARE_CRITICAL: f64 = 3.84;

/// Aggregated counters for one variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantReport {
    pub variant: String,
    /// Impression events (one per recommendation list shown).
    pub impressions: u64,
    /// Distinct users who saw at least one impression.
    pub unique_users: u64,
    /// Total items shown across all impressions.
    pub total_recommendations: u64,
    pub clicks: u64,
    /// Clicks over impressions; 0 when there are no impressions.
    pub click_through_rate: f64,
    /// Unique clickers over unique impression viewers.
    pub conversion_rate: f64,
    /// Event counts per conversion type.
    pub conversions: HashMap<String, u64>,
    /// Aggregates per engagement metric.
    pub engagement: HashMap<String, EngagementSummary>,
}

/// Outcome of the chi-square test over the first two variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Significance {
    pub chi_square: f64,
    pub is_significant: bool,
    pub p_value: String,
}

/// Full readout for one experiment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentResults {
    pub experiment_id: String,
    pub name: String,
    /// In the order variants were declared.
    pub variants: Vec<VariantReport>,
    /// Present with at least two variants and enough traffic for every
    /// expected cell of the contingency table to be non-zero.
    pub significance: Option<Significance>,
}

impl ExperimentStore {
    /// Builds the current results for an experiment.
    ///
    /// Significance is a chi-square test (one degree of freedom) on the
    /// click/no-click table of the first two declared variants; experiments
    /// with more arms report per-variant numbers but no omnibus test.
    pub fn results(&self, experiment_id: &str) -> Result<ExperimentResults> {
        let (config, stats) = self.snapshot(experiment_id)?;

        let variants: Vec<VariantReport> = config
            .variants
            .iter()
            .filter_map(|variant| {
                let snapshot = stats.get(&variant.name)?;
                Some(VariantReport {
                    variant: variant.name.clone(),
                    impressions: snapshot.impressions,
                    unique_users: snapshot.unique_users,
                    total_recommendations: snapshot.total_recommendations,
                    clicks: snapshot.clicks,
                    click_through_rate: rate(snapshot.clicks, snapshot.impressions),
                    conversion_rate: rate(snapshot.unique_clickers, snapshot.unique_users),
                    conversions: snapshot.conversions.clone(),
                    engagement: snapshot.engagement.clone(),
                })
            })
            .collect();

        let significance = match variants.as_slice() {
            [first, second, ..] => chi_square_ctr(first, second).map(|chi_square| Significance {
                chi_square,
                is_significant: chi_square > CHI_SQUARE_CRITICAL,
                p_value: if chi_square > CHI_SQUARE_CRITICAL {
                    "< 0.05".to_string()
                } else {
                    ">= 0.05".to_string()
                },
            }),
            _ => None,
        };

        Ok(ExperimentResults {
            experiment_id: config.experiment_id,
            name: config.name,
            variants,
            significance,
        })
    }
}

fn rate(events: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        events as f64 / denominator as f64
    }
}

/// Chi-square statistic over the 2x2 contingency table of clicks versus
/// non-clicks. Returns `None` when any expected cell count is zero.
fn chi_square_ctr(a: &VariantReport, b: &VariantReport) -> Option<f64> {
    let observed = [
        [
            a.clicks as f64,
            a.impressions.saturating_sub(a.clicks) as f64,
        ],
        [
            b.clicks as f64,
            b.impressions.saturating_sub(b.clicks) as f64,
        ],
    ];

    let row_totals = [
        observed[0][0] + observed[0][1],
        observed[1][0] + observed[1][1],
    ];
    let col_totals = [
        observed[0][0] + observed[1][0],
        observed[0][1] + observed[1][1],
    ];
    let grand_total = row_totals[0] + row_totals[1];
    if grand_total == 0.0 {
        return None;
    }

    let mut statistic = 0.0;
    for row in 0..2 {
        for col in 0..2 {
            let expected = row_totals[row] * col_totals[col] / grand_total;
            if expected == 0.0 {
                return None;
            }
            let diff = observed[row][col] - expected;
            statistic += diff * diff / expected;
        }
    }
    Some(statistic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::{ExperimentConfig, Variant};
    use chrono::{Duration, Utc};

    fn store_with_experiment() -> ExperimentStore {
        let store = ExperimentStore::new();
        let now = Utc::now();
        store
            .create_experiment(ExperimentConfig {
                experiment_id: "exp1".to_string(),
                name: "CTR test".to_string(),
                variants: vec![
                    Variant::new("control", "baseline"),
                    Variant::new("treatment", "new model"),
                ],
                traffic_split: vec![
                    ("control".to_string(), 0.5),
                    ("treatment".to_string(), 0.5),
                ],
                start: now - Duration::hours(1),
                end: now + Duration::hours(1),
            })
            .unwrap();
        store
    }

    fn fill_variant(store: &ExperimentStore, variant: &str, impressions: u32, clicks: u32) {
        for user in 0..impressions {
            store.record_impression("exp1", &format!("{variant}-u{user}"), variant, 10);
        }
        for user in 0..clicks {
            store.record_click("exp1", &format!("{variant}-u{user}"), variant, "content-1");
        }
    }

    #[test]
    fn test_large_ctr_gap_is_significant() {
        let store = store_with_experiment();
        fill_variant(&store, "control", 100, 10);
        fill_variant(&store, "treatment", 100, 30);

        let results = store.results("exp1").unwrap();
        // Contingency table (10/90 vs 30/70) gives chi-square 12.5
        let significance = results.significance.unwrap();
        assert!((significance.chi_square - 12.5).abs() < 1e-6);
        assert!(significance.is_significant);
        assert_eq!(significance.p_value, "< 0.05");
    }

    #[test]
    fn test_identical_ctr_is_not_significant() {
        let store = store_with_experiment();
        fill_variant(&store, "control", 100, 20);
        fill_variant(&store, "treatment", 100, 20);

        let results = store.results("exp1").unwrap();
        let significance = results.significance.unwrap();
        assert!(significance.chi_square < 1e-9);
        assert!(!significance.is_significant);
    }

    #[test]
    fn test_no_traffic_yields_no_test() {
        let store = store_with_experiment();
        let results = store.results("exp1").unwrap();
        assert!(results.significance.is_none());
    }

    #[test]
    fn test_report_rates_and_order() {
        let store = store_with_experiment();
        fill_variant(&store, "control", 50, 5);
        store.record_conversion("exp1", "control-u0", "control", "watch_complete");
        store.record_conversion("exp1", "control-u1", "control", "watch_complete");

        let results = store.results("exp1").unwrap();
        assert_eq!(results.variants[0].variant, "control");
        assert_eq!(results.variants[1].variant, "treatment");

        let control = &results.variants[0];
        assert_eq!(control.impressions, 50);
        assert_eq!(control.unique_users, 50);
        assert!((control.click_through_rate - 0.1).abs() < 1e-9);
        // 5 unique clickers out of 50 unique viewers
        assert!((control.conversion_rate - 0.1).abs() < 1e-9);
        assert_eq!(control.conversions["watch_complete"], 2);
    }

    #[test]
    fn test_unknown_experiment_results_error() {
        let store = ExperimentStore::new();
        assert!(store.results("missing").is_err());
    }
}
