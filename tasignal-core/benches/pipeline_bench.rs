//! Criterion benchmarks for the scoring hot paths.
//!
//! Benchmarks:
//! 1. Individual recurrences (Wilder smoothing, ADX, Parabolic SAR)
//! 2. Full indicator frame construction
//! 3. Frame construction plus scoring
//! 4. Polars export of a built frame

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tasignal_core::config::IndicatorParams;
use tasignal_core::domain::{Bar, Instrument};
use tasignal_core::indicators::smoothing::{wilder_mean, wilder_sum};
use tasignal_core::indicators::{Dmi, Indicator, ParabolicSar};
use tasignal_core::pipeline::build_frame;
use tasignal_core::SignalEngine;

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2015, 1, 2).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0 + i as f64 * 0.02;
            let open = close - 0.3;
            let high = close + 1.5;
            let low = close - 1.5;
            let volume = 1_000_000.0 + (i % 500) as f64 * 1_000.0;
            Bar::new(base_date + chrono::Duration::days(i as i64), open, high, low, close, volume)
        })
        .collect()
}

// ── 1. Recurrences ───────────────────────────────────────────────────

fn bench_recurrences(c: &mut Criterion) {
    let mut group = c.benchmark_group("recurrences");

    for &bar_count in &[252, 1260, 5040] {
        let bars = make_bars(bar_count);
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

        group.bench_with_input(BenchmarkId::new("wilder_sum_14", bar_count), &closes, |b, v| {
            b.iter(|| wilder_sum(black_box(v), 14));
        });
        group.bench_with_input(BenchmarkId::new("wilder_mean_14", bar_count), &closes, |b, v| {
            b.iter(|| wilder_mean(black_box(v), 14));
        });
        group.bench_with_input(BenchmarkId::new("adx_14", bar_count), &bars, |b, bars| {
            b.iter(|| Dmi::default().compute(black_box(bars)));
        });
        group.bench_with_input(BenchmarkId::new("psar", bar_count), &bars, |b, bars| {
            b.iter(|| ParabolicSar::default().compute(black_box(bars)));
        });
    }

    group.finish();
}

// ── 2. Frame ─────────────────────────────────────────────────────────

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");
    let params = IndicatorParams::default();

    for &bar_count in &[252, 1260, 5040] {
        let bars = make_bars(bar_count);
        group.bench_with_input(BenchmarkId::new("build", bar_count), &bars, |b, bars| {
            b.iter(|| build_frame(black_box(bars.clone()), &params));
        });
    }

    group.finish();
}

// ── 3. Scoring ───────────────────────────────────────────────────────

fn bench_score(c: &mut Criterion) {
    let engine = SignalEngine::default();
    let bars = make_bars(1260);

    c.bench_function("score_1260_bars", |b| {
        b.iter(|| engine.score(Instrument::from_symbol("BENCH"), black_box(bars.clone())));
    });
}

// ── 4. Export ────────────────────────────────────────────────────────

fn bench_export(c: &mut Criterion) {
    let frame = build_frame(make_bars(1260), &IndicatorParams::default()).unwrap();

    c.bench_function("to_dataframe_1260_bars", |b| {
        b.iter(|| black_box(&frame).to_dataframe());
    });
}

criterion_group!(benches, bench_recurrences, bench_frame, bench_score, bench_export);
criterion_main!(benches);
