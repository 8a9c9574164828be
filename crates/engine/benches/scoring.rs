//! Benchmark for the per-candidate scoring pass.

use catalog::{ContentItem, ContextSignal, UserProfile, WatchRecord};
use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use engine::scoring::score_candidates;
use mood::MoodAnalyzer;
use pipeline::FeatureEngineer;

const GENRES: &[&str] = &[
    "Action", "Drama", "Comedy", "Thriller", "Romance", "Horror", "Sci-Fi", "Documentary",
];
const MOODS: &[&str] = &["happy", "excited", "relaxed", "thrilled", "curious"];

fn synthetic_catalog(size: usize) -> Vec<ContentItem> {
    (0..size)
        .map(|index| {
            let mut item = ContentItem::new(format!("c{index}"), format!("Title {index}"));
            item.genres = vec![
                GENRES[index % GENRES.len()].to_string(),
                GENRES[(index * 3 + 1) % GENRES.len()].to_string(),
            ];
            item.mood_tags = vec![MOODS[index % MOODS.len()].to_string()];
            item.rating = Some(4.0 + (index % 60) as f32 / 10.0);
            item.year = Some(2010 + (index % 16) as i32);
            item.duration = Some(80.0 + (index % 70) as f32);
            item.platform = Some(format!("platform-{}", index % 4));
            item
        })
        .collect()
}

fn synthetic_user() -> UserProfile {
    let mut user = UserProfile::new("bench-user");
    user.genre_preferences = vec!["Action".to_string(), "Thriller".to_string()];
    user.platform_preferences = vec!["platform-0".to_string()];
    user.viewing_history = (0..50)
        .map(|index| WatchRecord {
            content_id: format!("c{}", index * 7),
            rating: Some(3.0 + (index % 3) as f32),
            last_watch_position: Some(50.0),
            total_duration: Some(100.0),
            watch_time: 50.0,
            timestamp: Utc::now(),
        })
        .collect();
    user
}

fn bench_scoring(c: &mut Criterion) {
    let engineer = FeatureEngineer::with_current_year(2026);
    let analyzer = MoodAnalyzer::new();
    let analysis = analyzer.analyze("very excited and adventurous", None);

    let user = synthetic_user();
    let user_features = engineer.extract_user_features(&user);
    let context_features = engineer.extract_context_features(&ContextSignal {
        hour: Some(20),
        ..ContextSignal::default()
    });

    let mut group = c.benchmark_group("score_candidates");
    for size in [500, 2_000, 10_000] {
        let items = synthetic_catalog(size);
        group.bench_function(format!("{size}_items"), |b| {
            b.iter(|| {
                let scored = score_candidates(
                    &engineer,
                    &analyzer,
                    &user_features,
                    &context_features,
                    &analysis,
                    &user.viewing_history,
                    black_box(items.clone()),
                );
                black_box(scored)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_scoring);
criterion_main!(benches);
