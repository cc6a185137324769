//! Criteria subsystem: comparisons, function registry, rule data model.
//!
//! Process-wide registries are built once by [`bootstrap`] (or lazily on
//! first use) and are read-only afterwards.

pub mod catalog;
pub mod comparison;
pub mod criterion;
pub mod error;
pub mod function;
pub mod kwargs;
pub mod record;
pub mod registry;
pub mod sources;

use std::sync::OnceLock;

pub use comparison::{Comparator, ComparisonOperator, ComparisonRegistry};
pub use criterion::{
    make_criterion, update_criterion, Criteria, Criterion, CriterionStatus, CriterionUpdate,
};
pub use error::{ComputeError, CriteriaError, KwargIssue};
pub use function::FunctionSpec;
pub use kwargs::{KwargField, KwargKind, KwargValue, Kwargs, KwargsSchema};
pub use record::{
    from_records, parse_raw_criteria, parse_raw_criterion, to_records, CriterionRecord,
    FunctionRecord,
};
pub use registry::{
    Evaluator, FunctionEntry, FunctionRegistry, FunctionSchema, Registration, SchemaListing,
    SeriesEvaluator,
};
pub use sources::ArgumentSource;

static COMPARISONS: OnceLock<ComparisonRegistry> = OnceLock::new();

/// Process-wide comparator table holding the built-in operators.
pub fn comparison_registry() -> &'static ComparisonRegistry {
    COMPARISONS.get_or_init(ComparisonRegistry::with_builtins)
}

/// Process-wide function registry holding the built-in catalog.
pub fn function_registry() -> &'static FunctionRegistry {
    registry::global()
}

/// Build both process-wide registries. Idempotent.
pub fn bootstrap() {
    let functions = function_registry();
    let comparisons = comparison_registry();
    tracing::info!(
        functions = functions.len(),
        operators = comparisons.operators().len(),
        "registries ready"
    );
}

/// `make_spec` against the process-wide registry.
pub fn make_spec(name: &str, kwargs: Kwargs) -> Result<FunctionSpec, CriteriaError> {
    function_registry().make_spec(name, kwargs)
}
