use anyhow::{anyhow, Context, Result};
use catalog::{CatalogIndex, ContextSignal};
use chrono::{Datelike, Duration, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use engine::{ExplanationGenerator, Recommendation, RecommendOptions, RecommendationEngine};
use evaluation::{evaluate_with_catalog, RankedItem, RelevantItem};
use experiments::{ExperimentConfig, ExperimentStore, Variant};
use rand::Rng;
use std::path::PathBuf;
use std::sync::Arc;

/// MoodRec - mood-aware content recommendations
#[derive(Parser)]
#[command(name = "moodrec")]
#[command(about = "Mood- and history-aware recommendation engine", long_about = None)]
struct Cli {
    /// Path to a directory holding users.json and content.json
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get recommendations for a user
    Recommend {
        /// User ID to recommend for
        #[arg(long)]
        user_id: String,

        /// Free-text mood description (e.g. "very excited")
        #[arg(long, default_value = "")]
        mood: String,

        /// Mood intensity override in [0, 1]
        #[arg(long)]
        intensity: Option<f32>,

        /// Number of recommendations to return
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Show the score breakdown for each recommendation
        #[arg(long)]
        explain: bool,

        /// Seed for explanation templates (deterministic output)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Popular recommendations for a user without a profile
    ColdStart {
        /// Free-text mood description
        #[arg(long, default_value = "")]
        mood: String,

        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Show a user's profile and viewing history
    User {
        #[arg(long)]
        user_id: String,
    },

    /// Score a user's recommendations against their liked history
    Evaluate {
        #[arg(long)]
        user_id: String,

        /// Metric cutoff
        #[arg(long, default_value = "10")]
        k: usize,
    },

    /// Simulate an A/B experiment over synthetic traffic
    Experiment {
        /// Number of synthetic users to drive through the experiment
        #[arg(long, default_value = "10000")]
        users: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // The experiment simulation runs on synthetic traffic only
    if let Commands::Experiment { users } = &cli.command {
        return handle_experiment(*users);
    }

    let catalog = catalog::load_from_dir(&cli.data_dir)
        .with_context(|| format!("Failed to load catalog from {}", cli.data_dir.display()))?;
    let (user_count, content_count) = catalog.counts();
    println!(
        "{} Loaded {} users, {} content items",
        "✓".green(),
        user_count,
        content_count
    );

    match cli.command {
        Commands::Recommend {
            user_id,
            mood,
            intensity,
            limit,
            explain,
            seed,
        } => handle_recommend(catalog, user_id, mood, intensity, limit, explain, seed).await,
        Commands::ColdStart { mood, limit } => handle_cold_start(catalog, mood, limit).await,
        Commands::User { user_id } => handle_user(&catalog, &user_id),
        Commands::Evaluate { user_id, k } => handle_evaluate(catalog, user_id, k).await,
        Commands::Experiment { .. } => unreachable!("handled above"),
    }
}

async fn handle_recommend(
    catalog: CatalogIndex,
    user_id: String,
    mood: String,
    intensity: Option<f32>,
    limit: usize,
    explain: bool,
    seed: Option<u64>,
) -> Result<()> {
    let mut engine = RecommendationEngine::new(Arc::new(catalog));
    if let Some(seed) = seed {
        engine = engine.with_explainer(ExplanationGenerator::with_seed(seed, Utc::now().year()));
    }

    let options = RecommendOptions {
        mood_text: mood.clone(),
        intensity,
        context: ContextSignal::default(),
        limit,
    };
    let recommendations = engine.get_recommendations(&user_id, options).await?;

    if !mood.is_empty() {
        println!("{}", format!("Mood: {mood}").bold());
    }
    print_recommendations(&recommendations, explain);
    Ok(())
}

async fn handle_cold_start(catalog: CatalogIndex, mood: String, limit: usize) -> Result<()> {
    let engine = RecommendationEngine::new(Arc::new(catalog));
    let options = RecommendOptions {
        mood_text: mood,
        intensity: None,
        context: ContextSignal::default(),
        limit,
    };
    let recommendations = engine.get_cold_start_recommendations(options).await?;
    print_recommendations(&recommendations, false);
    Ok(())
}

fn handle_user(catalog: &CatalogIndex, user_id: &str) -> Result<()> {
    let user = catalog
        .get_user(user_id)
        .ok_or_else(|| anyhow!("User {user_id} not found"))?;

    println!("{}", format!("User: {}", user.id).bold().blue());
    println!(
        "{}Genre preferences: {}",
        "• ".green(),
        user.genre_preferences.join(", ")
    );
    println!(
        "{}Platform preferences: {}",
        "• ".green(),
        user.platform_preferences.join(", ")
    );
    println!(
        "{}History entries: {}",
        "• ".cyan(),
        user.viewing_history.len()
    );

    for record in &user.viewing_history {
        let title = catalog
            .get_content(&record.content_id)
            .map(|item| item.title.as_str())
            .unwrap_or(record.content_id.as_str());
        let rating = record
            .rating
            .map(|r| format!("rated {r}"))
            .unwrap_or_else(|| "unrated".to_string());
        let completion = record
            .completion()
            .map(|c| format!("{:.0}% watched", c * 100.0))
            .unwrap_or_else(|| format!("{} min", record.watch_time));
        println!("  - {title} ({rating}, {completion})");
    }
    Ok(())
}

async fn handle_evaluate(catalog: CatalogIndex, user_id: String, k: usize) -> Result<()> {
    // Liked history (rated >= 4 or watched to completion) is the ground truth
    let user = catalog
        .get_user(&user_id)
        .ok_or_else(|| anyhow!("User {user_id} not found"))?
        .clone();
    let relevant: Vec<RelevantItem> = user
        .viewing_history
        .iter()
        .filter(|record| {
            record.rating.map(|r| r >= 4.0).unwrap_or(false)
                || record.completion().map(|c| c >= 0.9).unwrap_or(false)
        })
        .map(|record| RelevantItem::binary(record.content_id.clone()))
        .collect();
    let total_items = catalog.counts().1;

    // Rank with rewatches allowed so history items can appear in the list
    let engine = RecommendationEngine::new(Arc::new(catalog)).with_penalty_threshold(1.1);
    let options = RecommendOptions {
        limit: k,
        ..RecommendOptions::default()
    };
    let recommendations = engine.get_recommendations(&user_id, options).await?;

    let ranked: Vec<RankedItem> = recommendations
        .iter()
        .map(|rec| RankedItem {
            id: rec.content_id.clone(),
            genres: rec.genres.clone(),
        })
        .collect();

    let report = evaluate_with_catalog(&ranked, &relevant, k, total_items);
    println!("{}", format!("Evaluation @ {k} for {user_id}").bold().blue());
    println!("{}Precision:       {:.3}", "• ".green(), report.precision);
    println!("{}Recall:          {:.3}", "• ".green(), report.recall);
    println!("{}NDCG:            {:.3}", "• ".green(), report.ndcg);
    println!("{}Diversity:       {:.3}", "• ".cyan(), report.diversity);
    println!("{}Genre diversity: {:.3}", "• ".cyan(), report.genre_diversity);
    if let Some(coverage) = report.coverage {
        println!("{}Coverage:        {:.3}", "• ".cyan(), coverage);
    }
    Ok(())
}

/// Drives synthetic users through a two-arm experiment where the treatment
/// has a genuinely higher click-through rate, then prints the readout.
fn handle_experiment(users: usize) -> Result<()> {
    let store = ExperimentStore::new();
    let now = Utc::now();
    store.create_experiment(ExperimentConfig {
        experiment_id: "ranking-v2".to_string(),
        name: "Mood-boosted ranking".to_string(),
        variants: vec![
            Variant::new("control", "Similarity-only ranking"),
            Variant::new("treatment", "Mood-boosted ranking"),
        ],
        traffic_split: vec![
            ("control".to_string(), 0.5),
            ("treatment".to_string(), 0.5),
        ],
        start: now - Duration::hours(1),
        end: now + Duration::hours(24),
    })?;

    let mut rng = rand::thread_rng();
    for index in 0..users {
        let user_id = format!("sim-user-{index}");
        let variant = store.assign_user("ranking-v2", &user_id)?;
        store.record_impression("ranking-v2", &user_id, &variant, 10);

        let click_probability = if variant == "treatment" { 0.12 } else { 0.08 };
        if rng.gen::<f64>() < click_probability {
            store.record_click("ranking-v2", &user_id, &variant, "sim-content");
            store.record_engagement("ranking-v2", &variant, "watch_minutes", rng.gen_range(5.0..90.0));
            if rng.gen::<f64>() < 0.4 {
                store.record_conversion("ranking-v2", &user_id, &variant, "watch_complete");
            }
        }
    }

    let results = store.results("ranking-v2")?;
    println!("{}", format!("Experiment: {}", results.name).bold().blue());
    for variant in &results.variants {
        println!(
            "{}{}: {} impressions, {} users, {} clicks, CTR {:.3}, conv {:.3}",
            "• ".green(),
            variant.variant.bold(),
            variant.impressions,
            variant.unique_users,
            variant.clicks,
            variant.click_through_rate,
            variant.conversion_rate
        );
        for (metric, summary) in &variant.engagement {
            println!("    {metric}: avg {:.1} over {} events", summary.average, summary.count);
        }
    }
    match &results.significance {
        Some(significance) => {
            let verdict = if significance.is_significant {
                "significant".green()
            } else {
                "not significant".yellow()
            };
            println!(
                "Chi-square: {:.2} ({}, p {})",
                significance.chi_square, verdict, significance.p_value
            );
        }
        None => println!("Not enough traffic for a significance test"),
    }
    Ok(())
}

fn print_recommendations(recommendations: &[Recommendation], explain: bool) {
    if recommendations.is_empty() {
        println!("{}", "No recommendations available".yellow());
        return;
    }

    for rec in recommendations {
        let rating = rec
            .rating
            .map(|r| format!("{r:.1}"))
            .unwrap_or_else(|| "-".to_string());
        let platform = rec.platform.as_deref().unwrap_or("-");
        println!(
            "{:>3}. {} [{}] {} on {} (score {:.3})",
            rec.rank,
            rec.title.bold(),
            rec.genres.join(", "),
            rating,
            platform,
            rec.score
        );
        println!("     {}", rec.explanation.italic());
        if explain {
            println!(
                "     similarity {:.3} | mood {:.3} | genre boost {:.3}",
                rec.metadata.similarity, rec.metadata.mood_score, rec.metadata.genre_boost
            );
        }
    }
}
