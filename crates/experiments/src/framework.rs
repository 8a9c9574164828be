//! Experiment definitions, deterministic assignment, and telemetry capture.
//!
//! ## Assignment algorithm
//! A user is assigned once per experiment and the assignment sticks for the
//! process lifetime. The variant is picked by hashing the user id into
//! [0, 1] and walking the cumulative traffic split in its declared order, so
//! recomputing an assignment concurrently yields the same variant and a
//! read-before-write race is harmless. Outside the experiment's active
//! window every user falls back to `"control"` without a sticky record, so
//! traffic arriving before launch does not pin users to the fallback.

use crate::error::{ExperimentError, Result};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Variant returned whenever an experiment is not currently running.
pub const CONTROL_VARIANT: &str = "control";

/// Tolerance when validating that a traffic split sums to 1.0.
const SPLIT_TOLERANCE: f64 = 0.01;

/// One arm of an experiment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    pub name: String,
    pub description: String,
}

impl Variant {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Static definition of an experiment.
///
/// `traffic_split` is an ordered list of `(variant name, fraction)` pairs;
/// assignment walks it in this order, so the order is part of the
/// experiment's identity and must stay stable once users are assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub experiment_id: String,
    pub name: String,
    pub variants: Vec<Variant>,
    pub traffic_split: Vec<(String, f64)>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ExperimentConfig {
    fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.start && now <= self.end
    }
}

/// Per-variant counters and unique-user sets, updated as telemetry arrives.
#[derive(Debug, Clone, Default)]
struct VariantStats {
    impressions: u64,
    impression_users: HashSet<String>,
    total_recommendations: u64,
    clicks: u64,
    click_users: HashSet<String>,
    clicked_content: HashSet<String>,
    conversions: HashMap<String, ConversionStat>,
    engagement: HashMap<String, EngagementStat>,
}

#[derive(Debug, Clone, Default)]
struct ConversionStat {
    count: u64,
    users: HashSet<String>,
}

/// Running sum and count; the average is derived at report time.
#[derive(Debug, Clone, Copy, Default)]
struct EngagementStat {
    sum: f64,
    count: u64,
}

#[derive(Debug)]
struct Experiment {
    config: ExperimentConfig,
    stats: HashMap<String, VariantStats>,
}

/// Concurrent registry of experiments and sticky user assignments.
///
/// Safe to share across request handlers behind an `Arc`; per-experiment
/// updates lock only that experiment's map entry.
#[derive(Debug, Default)]
pub struct ExperimentStore {
    experiments: DashMap<String, Experiment>,
    assignments: DashMap<(String, String), String>,
}

impl ExperimentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new experiment.
    ///
    /// Rejects duplicate ids and traffic splits that do not sum to 1.0
    /// (within a small tolerance).
    pub fn create_experiment(&self, config: ExperimentConfig) -> Result<()> {
        if config.variants.is_empty() || config.traffic_split.is_empty() {
            return Err(ExperimentError::NoVariants {
                experiment_id: config.experiment_id.clone(),
            });
        }

        let total: f64 = config.traffic_split.iter().map(|(_, share)| share).sum();
        if (total - 1.0).abs() > SPLIT_TOLERANCE {
            return Err(ExperimentError::InvalidTrafficSplit { total });
        }

        if self.experiments.contains_key(&config.experiment_id) {
            return Err(ExperimentError::AlreadyExists {
                experiment_id: config.experiment_id.clone(),
            });
        }

        info!(
            experiment_id = %config.experiment_id,
            variants = config.variants.len(),
            "experiment created"
        );

        let stats = config
            .variants
            .iter()
            .map(|variant| (variant.name.clone(), VariantStats::default()))
            .collect();
        self.experiments.insert(
            config.experiment_id.clone(),
            Experiment { config, stats },
        );
        Ok(())
    }

    /// Sticky variant assignment evaluated at the current time.
    pub fn assign_user(&self, experiment_id: &str, user_id: &str) -> Result<String> {
        self.assign_user_at(experiment_id, user_id, Utc::now())
    }

    /// Sticky variant assignment evaluated at `now`.
    ///
    /// Returns [`CONTROL_VARIANT`] without recording anything when the
    /// experiment is outside its active window.
    pub fn assign_user_at(
        &self,
        experiment_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let experiment = self
            .experiments
            .get(experiment_id)
            .ok_or_else(|| ExperimentError::NotFound {
                experiment_id: experiment_id.to_string(),
            })?;

        if !experiment.config.is_active_at(now) {
            return Ok(CONTROL_VARIANT.to_string());
        }

        let key = (experiment_id.to_string(), user_id.to_string());
        if let Some(existing) = self.assignments.get(&key) {
            return Ok(existing.clone());
        }

        let variant = pick_variant(&experiment.config.traffic_split, user_id);
        debug!(experiment_id, user_id, variant = %variant, "user assigned");
        self.assignments.insert(key, variant.clone());
        Ok(variant)
    }

    /// Records one recommendation impression: a list of `shown` items was
    /// displayed to `user_id`.
    ///
    /// Telemetry for unknown experiments or variants is dropped silently so
    /// late events from a deleted experiment cannot fail a request path.
    pub fn record_impression(&self, experiment_id: &str, user_id: &str, variant: &str, shown: usize) {
        self.with_stats(experiment_id, variant, |stats| {
            stats.impressions += 1;
            stats.impression_users.insert(user_id.to_string());
            stats.total_recommendations += shown as u64;
        });
    }

    /// Records a click on a recommended item.
    pub fn record_click(&self, experiment_id: &str, user_id: &str, variant: &str, content_id: &str) {
        self.with_stats(experiment_id, variant, |stats| {
            stats.clicks += 1;
            stats.click_users.insert(user_id.to_string());
            stats.clicked_content.insert(content_id.to_string());
        });
    }

    /// Records a conversion event of the given type (e.g. "watch_complete").
    pub fn record_conversion(
        &self,
        experiment_id: &str,
        user_id: &str,
        variant: &str,
        conversion_type: &str,
    ) {
        self.with_stats(experiment_id, variant, |stats| {
            let stat = stats
                .conversions
                .entry(conversion_type.to_string())
                .or_default();
            stat.count += 1;
            stat.users.insert(user_id.to_string());
        });
    }

    /// Records a named engagement measurement (e.g. watch time in minutes).
    pub fn record_engagement(&self, experiment_id: &str, variant: &str, metric: &str, value: f64) {
        self.with_stats(experiment_id, variant, |stats| {
            let stat = stats.engagement.entry(metric.to_string()).or_default();
            stat.sum += value;
            stat.count += 1;
        });
    }

    fn with_stats<F>(&self, experiment_id: &str, variant: &str, update: F)
    where
        F: FnOnce(&mut VariantStats),
    {
        match self.experiments.get_mut(experiment_id) {
            Some(mut experiment) => match experiment.stats.get_mut(variant) {
                Some(stats) => update(stats),
                None => debug!(experiment_id, variant, "telemetry for unknown variant dropped"),
            },
            None => debug!(experiment_id, "telemetry for unknown experiment dropped"),
        }
    }

    pub(crate) fn snapshot(
        &self,
        experiment_id: &str,
    ) -> Result<(ExperimentConfig, HashMap<String, VariantSnapshot>)> {
        let experiment = self
            .experiments
            .get(experiment_id)
            .ok_or_else(|| ExperimentError::NotFound {
                experiment_id: experiment_id.to_string(),
            })?;

        let stats = experiment
            .stats
            .iter()
            .map(|(name, stats)| {
                let engagement = stats
                    .engagement
                    .iter()
                    .map(|(metric, stat)| {
                        let average = if stat.count > 0 {
                            stat.sum / stat.count as f64
                        } else {
                            0.0
                        };
                        (
                            metric.clone(),
                            EngagementSummary {
                                average,
                                total: stat.sum,
                                count: stat.count,
                            },
                        )
                    })
                    .collect();
                let conversions = stats
                    .conversions
                    .iter()
                    .map(|(conversion_type, stat)| (conversion_type.clone(), stat.count))
                    .collect();
                (
                    name.clone(),
                    VariantSnapshot {
                        impressions: stats.impressions,
                        unique_users: stats.impression_users.len() as u64,
                        total_recommendations: stats.total_recommendations,
                        clicks: stats.clicks,
                        unique_clickers: stats.click_users.len() as u64,
                        conversions,
                        engagement,
                    },
                )
            })
            .collect();

        Ok((experiment.config.clone(), stats))
    }
}

/// Per-metric engagement aggregate exposed in results.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EngagementSummary {
    pub average: f64,
    pub total: f64,
    pub count: u64,
}

/// Point-in-time copy of one variant's counters.
#[derive(Debug, Clone)]
pub(crate) struct VariantSnapshot {
    pub impressions: u64,
    pub unique_users: u64,
    pub total_recommendations: u64,
    pub clicks: u64,
    pub unique_clickers: u64,
    pub conversions: HashMap<String, u64>,
    pub engagement: HashMap<String, EngagementSummary>,
}

/// Walks the cumulative traffic split with a normalized user hash.
fn pick_variant(traffic_split: &[(String, f64)], user_id: &str) -> String {
    let normalized = normalized_hash(user_id);

    let mut cumulative = 0.0;
    for (variant, share) in traffic_split {
        cumulative += share;
        if normalized <= cumulative {
            return variant.clone();
        }
    }

    // Float accumulation can leave the last boundary a hair under 1.0
    traffic_split[0].0.clone()
}

/// 32-bit rolling string hash mapped to [0, 1].
fn normalized_hash(input: &str) -> f64 {
    let mut hash: i32 = 0;
    for byte in input.bytes() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(byte as i32);
    }
    hash.unsigned_abs() as f64 / 2_147_483_647.0
}
