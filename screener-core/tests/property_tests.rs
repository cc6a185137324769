//! Property tests for rule-model and kernel invariants.
//!
//! Uses proptest to verify:
//! 1. Criteria merge is commutative and idempotent on the id set
//! 2. Subtraction removes exactly the ids of the right-hand side
//! 3. Kwargs normalization is idempotent
//! 4. Kernels preserve input length
//! 5. Evaluation is deterministic

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use proptest::prelude::*;
use screener_core::criteria::{
    make_spec, ComparisonOperator, Criteria, Criterion, FunctionSpec, Kwargs,
};
use screener_core::domain::{Bar, CriterionId, StockSubject};
use screener_core::indicators;
use screener_core::EvaluationEngine;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_op() -> impl Strategy<Value = ComparisonOperator> {
    prop::sample::select(ComparisonOperator::ALL.to_vec())
}

fn arb_criterion() -> impl Strategy<Value = Criterion> {
    (2..40i64, 2..40i64, arb_op()).prop_map(|(p1, p2, op)| {
        Criterion::from_parts(
            CriterionId::new(),
            FunctionSpec::unchecked("SMA", Kwargs::new().with("timeperiod", p1)),
            FunctionSpec::unchecked("EMA", Kwargs::new().with("timeperiod", p2)),
            op,
        )
    })
}

/// A pool of criteria plus two overlapping selections from it.
fn arb_overlapping() -> impl Strategy<Value = (Criteria, Criteria)> {
    prop::collection::vec(arb_criterion(), 1..20).prop_flat_map(|pool| {
        let n = pool.len();
        (
            Just(pool),
            prop::collection::vec(any::<bool>(), n),
            prop::collection::vec(any::<bool>(), n),
        )
            .prop_map(|(pool, pick_a, pick_b)| {
                let a = pool
                    .iter()
                    .zip(&pick_a)
                    .filter(|(_, keep)| **keep)
                    .map(|(c, _)| c.clone())
                    .collect();
                let b = pool
                    .iter()
                    .zip(&pick_b)
                    .filter(|(_, keep)| **keep)
                    .map(|(c, _)| c.clone())
                    .collect();
                (a, b)
            })
    })
}

fn arb_closes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(10.0..500.0_f64, 0..120)
}

fn subject_from(closes: &[f64]) -> StockSubject {
    let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
    let bars: Vec<Bar> = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar {
            date: start + chrono::Duration::days(i as i64),
            open: c * 0.99,
            high: c * 1.02,
            low: c * 0.97,
            close: c,
            volume: 10_000.0,
        })
        .collect();
    StockSubject::new("PROP", bars.clone()).with_index(Arc::new(bars))
}

// ── 1-2. Criteria set algebra ────────────────────────────────────────

proptest! {
    #[test]
    fn merge_is_commutative_on_ids((a, b) in arb_overlapping()) {
        prop_assert_eq!(a.merge(&b).ids(), b.merge(&a).ids());
    }

    #[test]
    fn merge_is_idempotent((a, b) in arb_overlapping()) {
        let once = a.merge(&b);
        let twice = once.merge(&b);
        prop_assert_eq!(once.ids(), twice.ids());
        prop_assert_eq!(a.merge(&a).len(), a.len());
    }

    #[test]
    fn merge_never_duplicates((a, b) in arb_overlapping()) {
        let merged = &a + &b;
        let unique: HashSet<_> = merged.iter().map(Criterion::id).collect();
        prop_assert_eq!(unique.len(), merged.len());
    }

    #[test]
    fn subtract_removes_rhs_ids((a, b) in arb_overlapping()) {
        let diff = &a - &b;
        let expected: HashSet<_> = a.ids().difference(&b.ids()).copied().collect();
        prop_assert_eq!(diff.ids(), expected);
    }
}

// ── 3. Kwargs normalization ──────────────────────────────────────────

proptest! {
    #[test]
    fn normalization_is_idempotent(period in 2..200i64, as_float in any::<bool>()) {
        let raw = if as_float {
            Kwargs::new().with("timeperiod", period as f64)
        } else {
            Kwargs::new().with("timeperiod", period)
        };
        let once = make_spec("RSI", raw).unwrap();
        let twice = make_spec("RSI", once.kwargs().clone()).unwrap();
        prop_assert_eq!(once, twice);
    }
}

// ── 4. Kernel lengths ────────────────────────────────────────────────

proptest! {
    #[test]
    fn kernels_preserve_length(values in arb_closes(), period in 1..30usize) {
        prop_assert_eq!(indicators::sma(&values, period).len(), values.len());
        prop_assert_eq!(indicators::ema(&values, period).len(), values.len());
        prop_assert_eq!(indicators::rsi(&values, period).len(), values.len());
        prop_assert_eq!(indicators::roc(&values, period).len(), values.len());
        prop_assert_eq!(indicators::stddev(&values, period, 1.0).len(), values.len());
    }
}

// ── 5. Determinism ───────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn evaluation_is_deterministic(
        closes in prop::collection::vec(10.0..500.0_f64, 40..80),
        criterion in arb_criterion(),
    ) {
        let engine = EvaluationEngine::global();
        let subject = subject_from(&closes);
        let first = engine.evaluate_criterion(&subject, &criterion, false);
        let second = engine.evaluate_criterion(&subject, &criterion, false);
        prop_assert_eq!(first, second);
    }
}
