//! Evaluation engine: criterion + subject → pass/fail.
//!
//! Batches fan out over a rayon pool and join before returning. The batch
//! policy is abort-all: the first error fails the whole call, except for
//! unsupported functions suppressed into FAILED by the caller's flag.

use std::collections::HashMap;
use std::time::Instant;

use rayon::prelude::*;

use crate::criteria::{
    comparison_registry, function_registry, ComparisonRegistry, Criteria, CriteriaError,
    Criterion, CriterionStatus, FunctionRegistry,
};
use crate::domain::Subject;

// ─── Error type ──────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Failed to build evaluation pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("Evaluating {criterion} on {symbol} failed: {source}")]
    Criterion {
        criterion: String,
        symbol: String,
        #[source]
        source: CriteriaError,
    },
}

impl EngineError {
    /// The underlying criteria error, if any.
    pub fn criteria_error(&self) -> Option<&CriteriaError> {
        match self {
            Self::Criterion { source, .. } => Some(source),
            Self::ThreadPool(_) => None,
        }
    }
}

/// Outcome of every criterion in a batch, keyed by criterion.
pub type Outcomes = HashMap<Criterion, CriterionStatus>;

// ─── Engine ──────────────────────────────────────────────────────────

/// Evaluates criteria against subjects using a pair of registries.
pub struct EvaluationEngine<'r> {
    functions: &'r FunctionRegistry,
    comparisons: &'r ComparisonRegistry,
    pool: Option<rayon::ThreadPool>,
    parallel_arguments: bool,
}

impl EvaluationEngine<'static> {
    /// Engine over the process-wide registries, bootstrapping them if needed.
    pub fn global() -> Self {
        Self::new(function_registry(), comparison_registry())
    }
}

impl<'r> EvaluationEngine<'r> {
    pub fn new(functions: &'r FunctionRegistry, comparisons: &'r ComparisonRegistry) -> Self {
        Self {
            functions,
            comparisons,
            pool: None,
            parallel_arguments: true,
        }
    }

    /// Bound fan-out to a private pool of `threads` workers.
    ///
    /// Zero keeps rayon's global pool.
    pub fn with_worker_threads(mut self, threads: usize) -> Result<Self, EngineError> {
        self.pool = if threads > 0 {
            Some(rayon::ThreadPoolBuilder::new().num_threads(threads).build()?)
        } else {
            None
        };
        Ok(self)
    }

    /// Allow or forbid concurrent argument-source resolution.
    pub fn parallel_arguments(mut self, enabled: bool) -> Self {
        self.parallel_arguments = enabled;
        self
    }

    pub fn functions(&self) -> &'r FunctionRegistry {
        self.functions
    }

    pub fn comparisons(&self) -> &'r ComparisonRegistry {
        self.comparisons
    }

    /// Worker count used for fan-out.
    pub fn worker_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// Run `op` inside the engine's pool (or rayon's global pool).
    pub fn install<R, F>(&self, op: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    /// Evaluate one criterion.
    ///
    /// With `ignore_unsupported`, a function missing from the registry
    /// yields FAILED instead of an error.
    pub fn evaluate_criterion(
        &self,
        subject: &dyn Subject,
        criterion: &Criterion,
        ignore_unsupported: bool,
    ) -> Result<CriterionStatus, CriteriaError> {
        let values = self
            .functions
            .evaluate_with(subject, criterion.func1(), self.parallel_arguments)
            .and_then(|v1| {
                self.functions
                    .evaluate_with(subject, criterion.func2(), self.parallel_arguments)
                    .map(|v2| (v1, v2))
            });

        let (v1, v2) = match values {
            Ok(pair) => pair,
            Err(err) if ignore_unsupported && err.is_unsupported_function() => {
                tracing::warn!(
                    symbol = subject.symbol(),
                    criterion = %criterion,
                    error = %err,
                    "unsupported function, marking criterion FAILED"
                );
                return Ok(CriterionStatus::Failed);
            }
            Err(err) => return Err(err),
        };

        let comparator = self.comparisons.resolve(criterion.op())?;
        let status = CriterionStatus::from(comparator(v1, v2));
        tracing::debug!(
            symbol = subject.symbol(),
            criterion = %criterion,
            lhs = v1,
            rhs = v2,
            status = %status,
            "criterion evaluated"
        );
        Ok(status)
    }

    /// Evaluate every criterion concurrently and join the outcomes.
    ///
    /// Every input criterion appears exactly once in the result; key order
    /// is unspecified.
    pub fn evaluate_criteria(
        &self,
        subject: &dyn Subject,
        criteria: &Criteria,
        ignore_unsupported: bool,
    ) -> Result<Outcomes, EngineError> {
        let started = Instant::now();
        let run = || {
            criteria
                .as_slice()
                .par_iter()
                .map(|criterion| {
                    self.evaluate_criterion(subject, criterion, ignore_unsupported)
                        .map(|status| (criterion.clone(), status))
                        .map_err(|source| EngineError::Criterion {
                            criterion: criterion.to_string(),
                            symbol: subject.symbol().to_string(),
                            source,
                        })
                })
                .collect::<Result<Outcomes, EngineError>>()
        };
        let outcomes = self.install(run)?;

        tracing::info!(
            symbol = subject.symbol(),
            criteria = outcomes.len(),
            passed = outcomes.values().filter(|s| s.is_passed()).count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "criteria evaluated"
        );
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::*;
    use crate::criteria::{make_spec, ComparisonOperator, FunctionSpec, Kwargs};
    use crate::domain::{Bar, CriterionId, StockSubject};

    fn one_bar(open: f64, close: f64) -> StockSubject {
        let bar = Bar {
            date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            open,
            high: open.max(close) + 1.0,
            low: open.min(close) - 1.0,
            close,
            volume: 10_000.0,
        };
        StockSubject::new("PSO", vec![bar]).with_index(Arc::new(Vec::new()))
    }

    fn close_vs_open(op: ComparisonOperator) -> Criterion {
        Criterion::from_parts(
            CriterionId::new(),
            make_spec("CLOSE", Kwargs::new()).unwrap(),
            make_spec("OPEN", Kwargs::new()).unwrap(),
            op,
        )
    }

    #[test]
    fn close_above_open() {
        let engine = EvaluationEngine::global();
        let c = close_vs_open(ComparisonOperator::GreaterThan);
        assert_eq!(
            engine.evaluate_criterion(&one_bar(100.0, 105.0), &c, false).unwrap(),
            CriterionStatus::Passed
        );
        assert_eq!(
            engine.evaluate_criterion(&one_bar(100.0, 95.0), &c, false).unwrap(),
            CriterionStatus::Failed
        );
    }

    #[test]
    fn unsupported_function_suppressed_or_propagated() {
        let engine = EvaluationEngine::global();
        let c = Criterion::from_parts(
            CriterionId::new(),
            FunctionSpec::unchecked("NOPE", Kwargs::new()),
            make_spec("OPEN", Kwargs::new()).unwrap(),
            ComparisonOperator::GreaterThan,
        );
        let s = one_bar(1.0, 2.0);
        assert_eq!(
            engine.evaluate_criterion(&s, &c, true).unwrap(),
            CriterionStatus::Failed
        );
        assert!(engine
            .evaluate_criterion(&s, &c, false)
            .unwrap_err()
            .is_unsupported_function());
    }

    #[test]
    fn other_errors_propagate_even_when_ignoring() {
        let engine = EvaluationEngine::global();
        // No index history: INDEX_CLOSE has nothing to read
        let c = Criterion::from_parts(
            CriterionId::new(),
            make_spec("INDEX_CLOSE", Kwargs::new()).unwrap(),
            make_spec("CLOSE", Kwargs::new()).unwrap(),
            ComparisonOperator::LessThan,
        );
        let err = engine
            .evaluate_criterion(&one_bar(1.0, 2.0), &c, true)
            .unwrap_err();
        assert!(matches!(err, CriteriaError::EmptySeries { .. }));
    }

    #[test]
    fn missing_comparator() {
        let functions = function_registry();
        let comparisons = ComparisonRegistry::new();
        let engine = EvaluationEngine::new(functions, &comparisons);
        let err = engine
            .evaluate_criterion(
                &one_bar(1.0, 2.0),
                &close_vs_open(ComparisonOperator::Equal),
                false,
            )
            .unwrap_err();
        assert!(matches!(err, CriteriaError::ComparisonNotFound(_)));
    }

    #[test]
    fn batch_returns_every_criterion() {
        let engine = EvaluationEngine::global().with_worker_threads(2).unwrap();
        let criteria: Criteria = ComparisonOperator::ALL
            .into_iter()
            .map(close_vs_open)
            .collect();
        let outcomes = engine
            .evaluate_criteria(&one_bar(100.0, 105.0), &criteria, false)
            .unwrap();

        assert_eq!(outcomes.len(), 5);
        for criterion in &criteria {
            let expected = matches!(
                criterion.op(),
                ComparisonOperator::GreaterThan | ComparisonOperator::GreaterThanOrEqual
            );
            assert_eq!(outcomes[criterion].is_passed(), expected, "{criterion}");
        }
    }

    #[test]
    fn batch_aborts_on_first_error() {
        let engine = EvaluationEngine::global();
        let mut criteria: Criteria =
            std::iter::once(close_vs_open(ComparisonOperator::Equal)).collect();
        criteria.insert(Criterion::from_parts(
            CriterionId::new(),
            FunctionSpec::unchecked("NOPE", Kwargs::new()),
            make_spec("OPEN", Kwargs::new()).unwrap(),
            ComparisonOperator::GreaterThan,
        ));
        let err = engine
            .evaluate_criteria(&one_bar(1.0, 2.0), &criteria, false)
            .unwrap_err();
        assert!(err.criteria_error().is_some_and(CriteriaError::is_unsupported_function));
    }

    #[test]
    fn worker_threads_respected() {
        let engine = EvaluationEngine::global().with_worker_threads(3).unwrap();
        assert_eq!(engine.worker_threads(), 3);
    }
}
