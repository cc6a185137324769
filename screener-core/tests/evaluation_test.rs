//! End-to-end criteria evaluation against synthetic subjects.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use screener_core::criteria::{
    bootstrap, from_records, function_registry, make_criterion, make_spec, parse_raw_criteria,
    to_records, ComparisonOperator, Criteria, CriteriaError, Criterion, CriterionRecord,
    CriterionStatus, FunctionSpec, Kwargs, SchemaListing,
};
use screener_core::domain::{Bar, CriterionId, StockSubject, Subject};
use screener_core::EvaluationEngine;

// ── Helpers ──────────────────────────────────────────────────────────

fn bar(date: NaiveDate, open: f64, close: f64) -> Bar {
    Bar {
        date,
        open,
        high: open.max(close) + 0.5,
        low: open.min(close) - 0.5,
        close,
        volume: 25_000.0,
    }
}

fn single_bar(open: f64, close: f64) -> StockSubject {
    let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
    StockSubject::new("OGDC", vec![bar(date, open, close)])
}

fn trending(symbol: &str, n: usize, slope: f64) -> StockSubject {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let bars: Vec<Bar> = (0..n)
        .map(|i| {
            let close = 100.0 + slope * i as f64 + (i as f64 * 0.7).sin();
            bar(start + chrono::Duration::days(i as i64), close - slope, close)
        })
        .collect();
    let index: Vec<Bar> = (0..n)
        .map(|i| {
            let close = 40_000.0 + 20.0 * i as f64;
            bar(start + chrono::Duration::days(i as i64), close - 5.0, close)
        })
        .collect();
    StockSubject::new(symbol, bars).with_index(Arc::new(index))
}

fn criterion(f1: &str, kw1: Kwargs, op: ComparisonOperator, f2: &str, kw2: Kwargs) -> Criterion {
    make_criterion(
        function_registry(),
        make_spec(f1, kw1).unwrap(),
        make_spec(f2, kw2).unwrap(),
        op,
        None,
        false,
    )
    .unwrap()
}

// ── Registry properties ──────────────────────────────────────────────

#[test]
fn every_registered_name_accepts_empty_kwargs() {
    bootstrap();
    for name in function_registry().names() {
        assert!(
            make_spec(name, Kwargs::new()).is_ok(),
            "{name} rejected empty kwargs"
        );
    }
}

#[test]
fn unregistered_names_are_unsupported() {
    for name in ["FOO", "rsi", "SMA ", "MAMA", ""] {
        assert_eq!(
            make_spec(name, Kwargs::new()).unwrap_err(),
            CriteriaError::UnsupportedFunction(name.to_string())
        );
    }
}

#[test]
fn rsi_spec_normalization() {
    let spec = make_spec("RSI", Kwargs::new().with("timeperiod", 14)).unwrap();
    assert_eq!(
        serde_json::to_value(spec.kwargs()).unwrap(),
        serde_json::json!({"timeperiod": 14})
    );

    let err = make_spec("RSI", Kwargs::new().with("timeperiod", 14).with("foo", 1)).unwrap_err();
    match err {
        CriteriaError::FunctionValidation { function, issues } => {
            assert_eq!(function, "RSI");
            assert_eq!(issues.len(), 1);
            assert_eq!(issues[0].key, "foo");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn schemas_cover_every_function() {
    let registry = function_registry();
    let flat = registry.generate_all_schemas(false);
    assert_eq!(flat.len(), registry.len());

    match registry.generate_all_schemas(true) {
        SchemaListing::Grouped(groups) => {
            assert!(groups.contains_key("Momentum Indicators"));
            assert!(groups.contains_key("Pattern Recognition"));
            assert!(groups["Price"].iter().any(|s| s.name == "CLOSE"));
        }
        other => panic!("expected grouped listing, got {other:?}"),
    }
}

// ── Criterion identity ───────────────────────────────────────────────

#[test]
fn same_content_different_ids_are_distinct() {
    let a = criterion(
        "CLOSE",
        Kwargs::new(),
        ComparisonOperator::GreaterThan,
        "OPEN",
        Kwargs::new(),
    );
    let b = Criterion::from_parts(CriterionId::new(), a.func1().clone(), a.func2().clone(), a.op());
    let set: HashSet<Criterion> = [a.clone(), b.clone()].into_iter().collect();
    assert_eq!(set.len(), 2);

    let criteria: Criteria = [a.clone(), b, a].into_iter().collect();
    assert_eq!(criteria.len(), 2);
}

// ── Evaluation ───────────────────────────────────────────────────────

#[test]
fn close_greater_than_open() {
    let engine = EvaluationEngine::global();
    let c = criterion(
        "CLOSE",
        Kwargs::new(),
        ComparisonOperator::GreaterThan,
        "OPEN",
        Kwargs::new(),
    );
    assert_eq!(
        engine.evaluate_criterion(&single_bar(100.0, 105.0), &c, false),
        Ok(CriterionStatus::Passed)
    );
    assert_eq!(
        engine.evaluate_criterion(&single_bar(100.0, 95.0), &c, false),
        Ok(CriterionStatus::Failed)
    );
}

#[test]
fn uptrend_short_average_above_long() {
    let engine = EvaluationEngine::global();
    let subject = trending("LUCK", 120, 0.8);
    let c = criterion(
        "SMA",
        Kwargs::new().with("timeperiod", 10),
        ComparisonOperator::GreaterThan,
        "SMA",
        Kwargs::new().with("timeperiod", 50),
    );
    assert_eq!(
        engine.evaluate_criterion(&subject, &c, false),
        Ok(CriterionStatus::Passed)
    );

    let down = trending("LUCK", 120, -0.5);
    assert_eq!(
        engine.evaluate_criterion(&down, &c, false),
        Ok(CriterionStatus::Failed)
    );
}

#[test]
fn evaluation_is_repeatable() {
    let engine = EvaluationEngine::global();
    let subject = trending("HBL", 90, 0.3);
    let c = criterion(
        "RSI",
        Kwargs::new(),
        ComparisonOperator::GreaterThanOrEqual,
        "CCI",
        Kwargs::new(),
    );
    let first = engine.evaluate_criterion(&subject, &c, false).unwrap();
    for _ in 0..10 {
        assert_eq!(engine.evaluate_criterion(&subject, &c, false).unwrap(), first);
    }
}

#[test]
fn beta_against_market_index() {
    let engine = EvaluationEngine::global();
    let subject = trending("ENGRO", 80, 0.4);
    let c = criterion(
        "BETA",
        Kwargs::new().with("timeperiod", 20),
        ComparisonOperator::LessThan,
        "CORREL",
        Kwargs::new().with("timeperiod", 20),
    );
    // Both read the index series; the outcome itself is data dependent
    assert!(engine.evaluate_criterion(&subject, &c, false).is_ok());

    let no_index = StockSubject::new("ENGRO", subject.bars().to_vec());
    assert!(matches!(
        engine.evaluate_criterion(&no_index, &c, false),
        Err(CriteriaError::EmptySeries { .. })
    ));
}

#[test]
fn batch_over_parsed_records() {
    let raw = serde_json::json!([
        {"func1": {"name": "CLOSE"}, "func2": {"name": "SMA", "options": {"timeperiod": 20}}, "op": ">"},
        {"func1": {"name": "RSI", "options": {"timeperiod": 14}}, "func2": {"name": "MOM"}, "op": ">="},
        {"func1": {"name": "EMA", "options": {"timeperiod": "12"}}, "func2": {"name": "EMA", "options": {"timeperiod": 26.0}}, "op": ">"},
        {"func1": {"name": "VOLUME"}, "func2": {"name": "SMA", "options": {"timeperiod": 5}}, "op": "<"}
    ]);
    let records = parse_raw_criteria(&raw).unwrap();
    let criteria = from_records(function_registry(), records, false).unwrap();
    assert_eq!(criteria.len(), 4);

    let engine = EvaluationEngine::global().with_worker_threads(2).unwrap();
    let outcomes = engine
        .evaluate_criteria(&trending("MEBL", 100, 0.6), &criteria, false)
        .unwrap();
    assert_eq!(outcomes.len(), 4);
    for c in &criteria {
        assert!(outcomes.contains_key(c));
    }

    // Persisted form round-trips and keeps ids
    let stored = serde_json::to_string(&to_records(&criteria)).unwrap();
    let reloaded: Vec<CriterionRecord> = serde_json::from_str(&stored).unwrap();
    let again = from_records(function_registry(), reloaded, false).unwrap();
    assert_eq!(again.ids(), criteria.ids());
}

#[test]
fn unsupported_function_deferred_to_evaluation() {
    let c = make_criterion(
        function_registry(),
        FunctionSpec::unchecked("MAVP", Kwargs::new()),
        make_spec("CLOSE", Kwargs::new()).unwrap(),
        ComparisonOperator::GreaterThan,
        None,
        true,
    )
    .unwrap();
    let engine = EvaluationEngine::global();
    let subject = single_bar(1.0, 2.0);
    assert_eq!(
        engine.evaluate_criterion(&subject, &c, true),
        Ok(CriterionStatus::Failed)
    );
    assert!(engine
        .evaluate_criterion(&subject, &c, false)
        .unwrap_err()
        .is_unsupported_function());
}
