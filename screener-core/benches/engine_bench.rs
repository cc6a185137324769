//! Criterion benchmarks for screener hot paths.
//!
//! Benchmarks:
//! 1. Kernel throughput (SMA, EMA, RSI, ATR, BBANDS)
//! 2. Single-criterion evaluation through the registry
//! 3. Batch evaluation fan-out (criteria per subject)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

use screener_core::criteria::{make_criterion, make_spec, ComparisonOperator, Criteria, Kwargs};
use screener_core::domain::{column, Bar, PriceField, StockSubject};
use screener_core::indicators::{self, MaType};
use screener_core::EvaluationEngine;

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize, seed: u64) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let base_date = chrono::NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    let mut close = 100.0;
    (0..n)
        .map(|i| {
            close *= 1.0 + rng.gen_range(-0.02..0.02);
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open: close * 0.998,
                high: close * 1.01,
                low: close * 0.99,
                close,
                volume: rng.gen_range(50_000.0..500_000.0),
            }
        })
        .collect()
}

fn make_subject(n: usize) -> StockSubject {
    StockSubject::new("BENCH", make_bars(n, 7)).with_index(Arc::new(make_bars(n, 11)))
}

fn make_criteria(count: usize) -> Criteria {
    let pairs = [
        ("RSI", "CCI"),
        ("SMA", "EMA"),
        ("MACD", "MACD_SIGNAL"),
        ("ADX", "ATR"),
        ("CLOSE", "BBANDS"),
        ("WILLR", "MFI"),
        ("BETA", "CORREL"),
        ("KAMA", "TEMA"),
    ];
    (0..count)
        .map(|i| {
            let (a, b) = pairs[i % pairs.len()];
            make_criterion(
                screener_core::criteria::function_registry(),
                make_spec(a, Kwargs::new()).unwrap(),
                make_spec(b, Kwargs::new()).unwrap(),
                ComparisonOperator::GreaterThan,
                None,
                false,
            )
            .unwrap()
        })
        .collect()
}

// ── 1. Kernels ───────────────────────────────────────────────────────

fn bench_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("kernels");

    for &bar_count in &[252, 1260, 2520] {
        let bars = make_bars(bar_count, 3);
        let close = column(&bars, PriceField::Close);
        let high = column(&bars, PriceField::High);
        let low = column(&bars, PriceField::Low);

        group.bench_with_input(BenchmarkId::new("sma_20", bar_count), &bar_count, |b, _| {
            b.iter(|| indicators::sma(black_box(&close), 20));
        });
        group.bench_with_input(BenchmarkId::new("ema_20", bar_count), &bar_count, |b, _| {
            b.iter(|| indicators::ema(black_box(&close), 20));
        });
        group.bench_with_input(BenchmarkId::new("rsi_14", bar_count), &bar_count, |b, _| {
            b.iter(|| indicators::rsi(black_box(&close), 14));
        });
        group.bench_with_input(BenchmarkId::new("atr_14", bar_count), &bar_count, |b, _| {
            b.iter(|| indicators::atr(black_box(&high), black_box(&low), black_box(&close), 14));
        });
        group.bench_with_input(BenchmarkId::new("bbands_20", bar_count), &bar_count, |b, _| {
            b.iter(|| indicators::bbands(black_box(&close), 20, 2.0, 2.0, MaType::Sma));
        });
    }

    group.finish();
}

// ── 2. Single criterion ──────────────────────────────────────────────

fn bench_criterion(c: &mut Criterion) {
    let mut group = c.benchmark_group("criterion");
    let engine = EvaluationEngine::global();
    let subject = make_subject(1260);
    let criteria = make_criteria(8);

    for rule in &criteria {
        group.bench_function(rule.to_string(), |b| {
            b.iter(|| engine.evaluate_criterion(black_box(&subject), black_box(rule), false));
        });
    }

    group.finish();
}

// ── 3. Batch fan-out ─────────────────────────────────────────────────

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate_criteria");
    let subject = make_subject(1260);

    for &count in &[10, 50] {
        let criteria = make_criteria(count);
        for &threads in &[1, 4] {
            let engine = EvaluationEngine::global()
                .with_worker_threads(threads)
                .unwrap();
            group.bench_with_input(
                BenchmarkId::new(format!("{count}_criteria"), threads),
                &threads,
                |b, _| {
                    b.iter(|| engine.evaluate_criteria(black_box(&subject), &criteria, false));
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_kernels, bench_criterion, bench_batch);
criterion_main!(benches);
