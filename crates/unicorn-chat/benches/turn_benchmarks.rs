//! Benchmarks for a full conversational turn.
//!
//! Builds a synthetic catalog of a few thousand companies and measures
//! `ChatEngine::handle_turn` for each retrieval tier, plus the clarification
//! path, so regressions in classification or filtering show up per tier.

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use unicorn_chat::{Catalog, ChatEngine, ConversationState, SectorMap};
use unicorn_core::config::ChatConfig;
use unicorn_core::{CompanyRecord, Dataset, NoopSink, RowKey};

const SECTORS: &[&str] = &[
    "Payments",
    "Alternative Lending",
    "Logistics Tech",
    "Online Grocery",
    "K-12 EdTech",
    "Healthcare IT",
    "Mobility",
];

const LOCATIONS: &[&str] = &[
    "Bengaluru, Karnataka",
    "Mumbai, Maharashtra",
    "Gurugram, Haryana",
    "Pune, Maharashtra",
    "Chennai, Tamil Nadu",
];

/// Deterministic synthetic catalog of `n` companies.
fn synthetic_catalog(n: usize) -> Catalog {
    let records = (0..n)
        .map(|i| {
            CompanyRecord::new(RowKey(i), format!("Startup{:05}", i))
                .with_sector(SECTORS[i % SECTORS.len()])
                .with_location(LOCATIONS[(i / 3) % LOCATIONS.len()])
                .with_valuation(1.0 + (i % 97) as f64 / 10.0)
                .with_description("Synthetic company used for benchmarking")
        })
        .collect();
    Catalog::new(Dataset::from_records(records), SectorMap::builtin())
}

fn engine(size: usize) -> ChatEngine {
    // A high threshold keeps large sector queries on the answer path.
    let config = ChatConfig {
        clarification_threshold: usize::MAX,
        ..ChatConfig::default()
    };
    ChatEngine::new(Arc::new(synthetic_catalog(size)), &config)
}

/// One turn per tier on a fresh or primed session.
fn bench_turn_by_tier(c: &mut Criterion) {
    let mut group = c.benchmark_group("turn_by_tier");
    group.sample_size(100);
    group.measurement_time(Duration::from_secs(5));

    for size in [1_000usize, 5_000] {
        let engine = engine(size);

        group.bench_with_input(BenchmarkId::new("entity", size), &size, |b, _| {
            b.iter(|| {
                let mut state = ConversationState::new();
                engine
                    .handle_turn(black_box("tell me about Startup00042"), &mut state, &NoopSink)
                    .map(|o| o.is_clarification())
            });
        });

        group.bench_with_input(BenchmarkId::new("sector", size), &size, |b, _| {
            b.iter(|| {
                let mut state = ConversationState::new();
                engine
                    .handle_turn(black_box("show me fintech unicorns"), &mut state, &NoopSink)
                    .map(|o| o.is_clarification())
            });
        });

        // Prime a context once, then clone it per iteration.
        let mut primed = ConversationState::new();
        let _ = engine.handle_turn("fintech", &mut primed, &NoopSink);

        group.bench_with_input(BenchmarkId::new("contextual", size), &size, |b, _| {
            b.iter(|| {
                let mut state = primed.clone();
                engine
                    .handle_turn(
                        black_box("which of these are in bangalore with high valuation"),
                        &mut state,
                        &NoopSink,
                    )
                    .map(|o| o.is_clarification())
            });
        });
    }

    group.finish();
}

/// Clarification path: filters with no context.
fn bench_clarification(c: &mut Criterion) {
    let engine = engine(5_000);

    let mut group = c.benchmark_group("clarification");
    group.sample_size(100);

    group.bench_function("empty_context", |b| {
        b.iter(|| {
            let mut state = ConversationState::new();
            engine
                .handle_turn(black_box("High Valuation"), &mut state, &NoopSink)
                .map(|o| o.is_clarification())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_turn_by_tier, bench_clarification);
criterion_main!(benches);
