use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use streamrec::services::explore::{pick_explore, split_counts};
use streamrec::services::preference::{build_preference, rank_eligible, score_catalog};
use streamrec::store::CatalogStore;
use streamrec::*;
use uuid::Uuid;

fn synthetic_catalog(n: usize) -> Vec<ContentItem> {
    let genres = ["action", "drama", "comedy", "romance", "sci-fi", "thriller"];
    (0..n)
        .map(|i| {
            let genre_pair = format!("{}, {}", genres[i % genres.len()], genres[(i + 1) % genres.len()]);
            ContentItem::new(Uuid::new_v4(), "movie", &format!("Item {}", i), &genre_pair)
                .with_rating(5.0 + (i % 5) as f64, 100)
                .with_view_count((i as u64 * 37) % 10_000)
        })
        .collect()
}

fn benchmark_scoring(c: &mut Criterion) {
    let catalog = synthetic_catalog(5_000);
    let by_id: HashMap<Uuid, &ContentItem> = catalog.iter().map(|i| (i.id, i)).collect();
    let positive: Vec<Uuid> = catalog.iter().take(20).map(|i| i.id).collect();
    let clicked: Vec<Uuid> = catalog.iter().skip(20).take(60).map(|i| i.id).collect();
    let config = Config::default().recommendation;

    c.bench_function("build_preference", |b| {
        b.iter(|| {
            black_box(build_preference(&positive, &clicked, &by_id, 2.0));
        });
    });

    let pref = build_preference(&positive, &clicked, &by_id, 2.0);
    let empty = HashSet::new();

    c.bench_function("score_catalog_5k", |b| {
        b.iter(|| {
            black_box(score_catalog(
                &catalog, &pref, &empty, &empty, &empty, &config,
            ));
        });
    });

    let scores = score_catalog(&catalog, &pref, &empty, &empty, &empty, &config);

    c.bench_function("rank_eligible_5k", |b| {
        b.iter(|| {
            black_box(rank_eligible(&catalog, &scores));
        });
    });
}

fn benchmark_explore(c: &mut Criterion) {
    let catalog = synthetic_catalog(5_000);
    let by_id: HashMap<Uuid, &ContentItem> = catalog.iter().map(|i| (i.id, i)).collect();
    let positive: Vec<Uuid> = catalog.iter().take(20).map(|i| i.id).collect();
    let config = Config::default().recommendation;

    let pref = build_preference(&positive, &[], &by_id, 2.0);
    let empty = HashSet::new();
    let scores = score_catalog(&catalog, &pref, &empty, &empty, &empty, &config);
    let ranked = rank_eligible(&catalog, &scores);

    let (exploit_count, explore_count) = split_counts(16, config.explore_ratio);
    let exploit: Vec<Uuid> = ranked.iter().take(exploit_count).copied().collect();
    let user = Uuid::new_v4();

    c.bench_function("pick_explore", |b| {
        b.iter(|| {
            black_box(pick_explore(
                user,
                &ranked,
                &scores,
                &pref,
                &empty,
                &exploit,
                explore_count,
                &by_id,
                config.explore_pool_mult,
                config.seed_window_hours,
                1_700_000_000,
            ));
        });
    });
}

fn benchmark_full_pipeline(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    let state = rt.block_on(async {
        let state = AppState::with_memory_stores(Config::default());
        for item in synthetic_catalog(2_000) {
            state.catalog.upsert(item).await.unwrap();
        }
        state
    });
    let state = Arc::new(state);

    let warm_user = Uuid::new_v4();
    rt.block_on(async {
        let all = state.catalog.list_all().await.unwrap();
        for item in all.iter().take(10) {
            state
                .interaction_service
                .like(warm_user, item.id)
                .await
                .unwrap();
        }
    });

    c.bench_function("recommend_cold_2k_catalog", |b| {
        let state = state.clone();
        b.to_async(&rt).iter(|| {
            let state = state.clone();
            async move {
                black_box(
                    state
                        .recommendation_service
                        .recommend(Uuid::new_v4(), 20)
                        .await
                        .unwrap(),
                );
            }
        });
    });

    c.bench_function("recommend_warm_2k_catalog", |b| {
        let state = state.clone();
        b.to_async(&rt).iter(|| {
            let state = state.clone();
            async move {
                black_box(
                    state
                        .recommendation_service
                        .recommend(warm_user, 20)
                        .await
                        .unwrap(),
                );
            }
        });
    });
}

criterion_group!(
    benches,
    benchmark_scoring,
    benchmark_explore,
    benchmark_full_pipeline
);
criterion_main!(benches);
