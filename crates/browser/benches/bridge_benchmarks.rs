//! Bridge benchmarks.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use browser::{resolve_startup_url, InstanceState, SimulatedRuntime, ACTIVE_URL_KEY};
use common::ProcessRole;
use ui::{FixedPreferences, HandleLedger, TabDelegate, TabModel};

/// Benchmark the bind/unbind cycle of tabs through the simulated bridge.
fn bench_tab_binding(c: &mut Criterion) {
    let mut group = c.benchmark_group("tab_binding");

    for count in [1usize, 16, 128].iter() {
        group.bench_with_input(BenchmarkId::new("tabs", count), count, |b, &count| {
            let runtime = SimulatedRuntime::new();
            let ledger = Arc::new(HandleLedger::new());
            b.iter(|| {
                let model = TabModel::new(ledger.clone());
                for _ in 0..count {
                    let tab = model.create_tab(TabDelegate::none());
                    black_box(tab.initialize_native(&runtime).ok());
                    black_box(tab.destroy_native(&runtime).ok());
                    model.remove(tab.id());
                }
            });
        });
    }

    group.finish();
}

/// Benchmark render preference queries.
fn bench_delegate(c: &mut Criterion) {
    let mut group = c.benchmark_group("delegate");

    let with_provider = TabDelegate::new(Arc::new(FixedPreferences::new(true, false)));
    let without_provider = TabDelegate::none();

    group.bench_function("with_provider", |b| {
        b.iter(|| black_box(with_provider.resolve(black_box(ui::RenderQuery::NightMode))))
    });

    group.bench_function("without_provider", |b| {
        b.iter(|| black_box(without_provider.resolve(black_box(ui::RenderQuery::ForceDark))))
    });

    group.finish();
}

/// Benchmark startup address selection and process classification.
fn bench_startup_inputs(c: &mut Criterion) {
    let mut group = c.benchmark_group("startup_inputs");

    let mut saved = InstanceState::new();
    saved.put_string(ACTIVE_URL_KEY, "https://example.com/saved");

    group.bench_function("resolve_url", |b| {
        b.iter(|| {
            black_box(resolve_startup_url(
                black_box(Some("")),
                Some(&saved),
                "https://www.google.com",
            ))
        })
    });

    group.bench_function("classify_process", |b| {
        b.iter(|| {
            black_box(ProcessRole::classify(black_box(
                "org.oxide.shell:sandboxed_process12",
            )))
        })
    });

    group.finish();
}

criterion_group!(benches, bench_tab_binding, bench_delegate, bench_startup_inputs);
criterion_main!(benches);
