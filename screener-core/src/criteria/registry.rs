//! Function registry: name → evaluator, argument sources, kwargs schema.
//!
//! Entries are registered once at bootstrap and only read afterwards. The
//! process-wide instance lives behind [`global`]; tests and embedders can
//! build private registries with [`FunctionRegistry::new`].

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, OnceLock};

use rayon::prelude::*;
use serde::Serialize;

use crate::domain::Subject;

use super::error::{ComputeError, CriteriaError, KwargIssue};
use super::function::FunctionSpec;
use super::kwargs::{Kwargs, KwargsSchema};
use super::sources::ArgumentSource;

// ─── Evaluator ───────────────────────────────────────────────────────

/// Produces the value of a function for one subject.
///
/// Evaluators must be stateless: the engine calls them from many worker
/// threads at once.
pub trait Evaluator: Send + Sync {
    /// Evaluate `function` on `subject` with already-normalized `kwargs`.
    ///
    /// `allow_parallel` is the caller's permission to resolve argument
    /// sources concurrently.
    fn evaluate(
        &self,
        function: &str,
        subject: &dyn Subject,
        kwargs: &Kwargs,
        allow_parallel: bool,
    ) -> Result<f64, CriteriaError>;

    fn argument_sources(&self) -> &[ArgumentSource];
}

type Routine =
    Box<dyn Fn(&[Vec<f64>], &Kwargs) -> Result<Vec<f64>, ComputeError> + Send + Sync>;

/// Evaluator built from a numeric routine and its ordered argument sources.
///
/// The routine receives one series per source and returns an output series;
/// the function's value is the last element of that series.
pub struct SeriesEvaluator {
    routine: Routine,
    sources: Vec<ArgumentSource>,
    parallel_args: bool,
}

impl SeriesEvaluator {
    pub fn new<F>(routine: F, sources: &[ArgumentSource]) -> Self
    where
        F: Fn(&[Vec<f64>], &Kwargs) -> Result<Vec<f64>, ComputeError> + Send + Sync + 'static,
    {
        Self {
            routine: Box::new(routine),
            sources: sources.to_vec(),
            parallel_args: true,
        }
    }

    /// Enable or disable concurrent source resolution for this entry.
    pub fn parallel_args(mut self, enabled: bool) -> Self {
        self.parallel_args = enabled;
        self
    }

    fn resolve_inputs(
        &self,
        function: &str,
        subject: &dyn Subject,
        allow_parallel: bool,
    ) -> Result<Vec<Vec<f64>>, CriteriaError> {
        if allow_parallel && self.parallel_args && self.sources.len() > 1 {
            self.sources
                .par_iter()
                .map(|source| source.resolve(function, subject))
                .collect()
        } else {
            self.sources
                .iter()
                .map(|source| source.resolve(function, subject))
                .collect()
        }
    }
}

impl Evaluator for SeriesEvaluator {
    fn evaluate(
        &self,
        function: &str,
        subject: &dyn Subject,
        kwargs: &Kwargs,
        allow_parallel: bool,
    ) -> Result<f64, CriteriaError> {
        let inputs = self.resolve_inputs(function, subject, allow_parallel)?;
        let output = (self.routine)(&inputs, kwargs)
            .map_err(|source| CriteriaError::computation(function, source))?;

        let value = output.last().copied().unwrap_or(f64::NAN);
        if !value.is_finite() {
            return Err(CriteriaError::DegenerateResult {
                function: function.to_string(),
                value,
            });
        }
        Ok(value)
    }

    fn argument_sources(&self) -> &[ArgumentSource] {
        &self.sources
    }
}

// ─── Registration ────────────────────────────────────────────────────

/// A registered function.
#[derive(Clone)]
pub struct FunctionEntry {
    /// Name of the underlying routine. The registry key may be an alias.
    pub name: String,
    pub evaluator: Arc<dyn Evaluator>,
    /// `None` means the function accepts no keyword arguments.
    pub kwargs_schema: Option<KwargsSchema>,
    pub description: Option<String>,
    pub group: Option<String>,
}

impl std::fmt::Debug for FunctionEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionEntry")
            .field("name", &self.name)
            .field("sources", &self.evaluator.argument_sources())
            .field("kwargs_schema", &self.kwargs_schema)
            .field("group", &self.group)
            .finish()
    }
}

/// Builder for one [`FunctionRegistry::register`] call.
pub struct Registration {
    name: String,
    alias: Option<String>,
    entry: FunctionEntry,
}

impl Registration {
    pub fn new(name: impl Into<String>, evaluator: impl Evaluator + 'static) -> Self {
        let name = name.into();
        Self {
            entry: FunctionEntry {
                name: name.clone(),
                evaluator: Arc::new(evaluator),
                kwargs_schema: None,
                description: None,
                group: None,
            },
            name,
            alias: None,
        }
    }

    pub fn schema(mut self, schema: KwargsSchema) -> Self {
        self.entry.kwargs_schema = Some(schema);
        self
    }

    /// Store the entry under `alias` instead of the function name.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.entry.description = Some(description.into());
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.entry.group = Some(group.into());
        self
    }
}

// ─── Schemas ─────────────────────────────────────────────────────────

/// Serializable description of one registered function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionSchema {
    pub name: String,
    pub function: String,
    pub description: Option<String>,
    pub group: Option<String>,
    pub sources: Vec<&'static str>,
    pub kwargs: Option<serde_json::Value>,
}

/// Output of [`FunctionRegistry::generate_all_schemas`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SchemaListing {
    Flat(Vec<FunctionSchema>),
    Grouped(BTreeMap<String, Vec<FunctionSchema>>),
}

impl SchemaListing {
    pub fn len(&self) -> usize {
        match self {
            Self::Flat(v) => v.len(),
            Self::Grouped(g) => g.values().map(Vec::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

const UNGROUPED: &str = "Ungrouped";

// ─── Registry ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    entries: HashMap<String, FunctionEntry>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an entry under its alias (or name). The last registration wins.
    pub fn register(&mut self, registration: Registration) {
        let key = registration.alias.unwrap_or(registration.name);
        if self.entries.contains_key(&key) {
            tracing::debug!(function = %key, "overwriting registered function");
        } else {
            tracing::debug!(function = %key, "registered function");
        }
        self.entries.insert(key, registration.entry);
    }

    pub fn get(&self, name: &str) -> Option<&FunctionEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered keys, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn entry(&self, name: &str) -> Result<&FunctionEntry, CriteriaError> {
        self.get(name)
            .ok_or_else(|| CriteriaError::UnsupportedFunction(name.to_string()))
    }

    fn normalize(&self, name: &str, entry: &FunctionEntry, kwargs: &Kwargs) -> Result<Kwargs, CriteriaError> {
        match &entry.kwargs_schema {
            Some(schema) => schema.validate(name, kwargs),
            None if kwargs.is_empty() => Ok(Kwargs::new()),
            None => Err(CriteriaError::FunctionValidation {
                function: name.to_string(),
                issues: kwargs
                    .iter()
                    .map(|(k, _)| KwargIssue::new(k.as_str(), "function accepts no arguments"))
                    .collect(),
            }),
        }
    }

    /// Build a spec for `name`, validating and normalizing `kwargs`.
    pub fn make_spec(&self, name: &str, kwargs: Kwargs) -> Result<FunctionSpec, CriteriaError> {
        let entry = self.entry(name)?;
        let normalized = self.normalize(name, entry, &kwargs)?;
        Ok(FunctionSpec::unchecked(name, normalized))
    }

    /// Value of `spec` on `subject`, resolving multi-source inputs in parallel.
    pub fn evaluate(&self, subject: &dyn Subject, spec: &FunctionSpec) -> Result<f64, CriteriaError> {
        self.evaluate_with(subject, spec, true)
    }

    /// Like [`evaluate`](Self::evaluate), with explicit control over
    /// concurrent argument resolution.
    pub fn evaluate_with(
        &self,
        subject: &dyn Subject,
        spec: &FunctionSpec,
        allow_parallel: bool,
    ) -> Result<f64, CriteriaError> {
        let entry = self.entry(spec.name())?;
        // Specs carried past construction unchecked still get validated here.
        let kwargs = self.normalize(spec.name(), entry, spec.kwargs())?;
        entry
            .evaluator
            .evaluate(spec.name(), subject, &kwargs, allow_parallel)
    }

    pub fn generate_schema(&self, name: &str) -> Result<FunctionSchema, CriteriaError> {
        let entry = self.entry(name)?;
        Ok(FunctionSchema {
            name: name.to_string(),
            function: entry.name.clone(),
            description: entry.description.clone(),
            group: entry.group.clone(),
            sources: entry
                .evaluator
                .argument_sources()
                .iter()
                .map(ArgumentSource::name)
                .collect(),
            kwargs: entry.kwargs_schema.as_ref().map(KwargsSchema::to_json_schema),
        })
    }

    /// Schemas of every entry sorted by name, optionally bucketed by group.
    pub fn generate_all_schemas(&self, grouped: bool) -> SchemaListing {
        let schemas: Vec<FunctionSchema> = self
            .names()
            .into_iter()
            .filter_map(|name| self.generate_schema(name).ok())
            .collect();

        if !grouped {
            return SchemaListing::Flat(schemas);
        }

        let mut groups: BTreeMap<String, Vec<FunctionSchema>> = BTreeMap::new();
        for schema in schemas {
            let group = schema.group.clone().unwrap_or_else(|| UNGROUPED.to_string());
            groups.entry(group).or_default().push(schema);
        }
        SchemaListing::Grouped(groups)
    }
}

// ─── Global instance ─────────────────────────────────────────────────

static FUNCTIONS: OnceLock<FunctionRegistry> = OnceLock::new();

/// Process-wide registry holding the built-in catalog.
///
/// The first call builds it; later calls return the same instance.
pub fn global() -> &'static FunctionRegistry {
    FUNCTIONS.get_or_init(super::catalog::builtin_registry)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::NaiveDate;

    use super::*;
    use crate::criteria::kwargs::KwargField;
    use crate::domain::{Bar, StockSubject};

    fn subject(closes: &[f64]) -> StockSubject {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                date: start + chrono::Duration::days(i as i64),
                open: c - 1.0,
                high: c + 1.0,
                low: c - 2.0,
                close: c,
                volume: 100.0,
            })
            .collect();
        StockSubject::new("TEST", bars)
    }

    fn last_close() -> SeriesEvaluator {
        SeriesEvaluator::new(|inputs, _| Ok(inputs[0].clone()), &[ArgumentSource::CLOSE])
    }

    fn registry() -> FunctionRegistry {
        let mut reg = FunctionRegistry::new();
        reg.register(Registration::new("LAST", last_close()).group("Price"));
        reg.register(
            Registration::new(
                "SCALED",
                SeriesEvaluator::new(
                    |inputs, kwargs| {
                        let factor = kwargs
                            .get("factor")
                            .and_then(|v| v.as_f64())
                            .ok_or_else(|| ComputeError::MissingArgument("factor".into()))?;
                        Ok(inputs[0].iter().map(|v| v * factor).collect())
                    },
                    &[ArgumentSource::CLOSE],
                ),
            )
            .schema(KwargsSchema::new(vec![KwargField::float("factor", 2.0)])),
        );
        reg
    }

    #[test]
    fn make_spec_unknown_name() {
        let err = registry().make_spec("NOPE", Kwargs::new()).unwrap_err();
        assert_eq!(err, CriteriaError::UnsupportedFunction("NOPE".into()));
    }

    #[test]
    fn kwargs_rejected_without_schema() {
        let err = registry()
            .make_spec("LAST", Kwargs::new().with("timeperiod", 3))
            .unwrap_err();
        assert!(matches!(err, CriteriaError::FunctionValidation { .. }));
    }

    #[test]
    fn make_spec_fills_defaults() {
        let spec = registry().make_spec("SCALED", Kwargs::new()).unwrap();
        assert_eq!(spec.kwargs(), &Kwargs::new().with("factor", 2.0));
    }

    #[test]
    fn evaluate_takes_last_value() {
        let reg = registry();
        let s = subject(&[1.0, 2.0, 3.0]);
        let last = reg.make_spec("LAST", Kwargs::new()).unwrap();
        let scaled = reg
            .make_spec("SCALED", Kwargs::new().with("factor", 10))
            .unwrap();
        assert_eq!(reg.evaluate(&s, &last).unwrap(), 3.0);
        assert_eq!(reg.evaluate(&s, &scaled).unwrap(), 30.0);
    }

    #[test]
    fn evaluate_unknown_spec() {
        let reg = registry();
        let spec = FunctionSpec::unchecked("GONE", Kwargs::new());
        let err = reg.evaluate(&subject(&[1.0]), &spec).unwrap_err();
        assert!(err.is_unsupported_function());
    }

    #[test]
    fn nan_result_is_degenerate() {
        let reg = registry();
        let s = subject(&[1.0, f64::NAN]);
        let spec = reg.make_spec("LAST", Kwargs::new()).unwrap();
        assert!(matches!(
            reg.evaluate(&s, &spec),
            Err(CriteriaError::DegenerateResult { .. })
        ));
    }

    #[test]
    fn empty_history_is_reported() {
        let reg = registry();
        let spec = reg.make_spec("LAST", Kwargs::new()).unwrap();
        assert!(matches!(
            reg.evaluate(&subject(&[]), &spec),
            Err(CriteriaError::EmptySeries { .. })
        ));
    }

    #[test]
    fn last_registration_wins() {
        let mut reg = registry();
        reg.register(
            Registration::new(
                "LAST",
                SeriesEvaluator::new(|_, _| Ok(vec![-1.0]), &[ArgumentSource::CLOSE]),
            ),
        );
        let spec = reg.make_spec("LAST", Kwargs::new()).unwrap();
        assert_eq!(reg.evaluate(&subject(&[5.0]), &spec).unwrap(), -1.0);
    }

    #[test]
    fn alias_is_the_key() {
        let mut reg = FunctionRegistry::new();
        reg.register(Registration::new("CLOSE", last_close()).alias("PRICE"));
        assert!(reg.contains("PRICE"));
        assert!(!reg.contains("CLOSE"));
        assert_eq!(reg.generate_schema("PRICE").unwrap().function, "CLOSE");
    }

    #[test]
    fn sources_resolved_in_order_with_and_without_parallelism() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        let eval = SeriesEvaluator::new(
            |inputs, _| {
                CALLS.fetch_add(1, Ordering::SeqCst);
                Ok(vec![inputs[0][0] * 1000.0 + inputs[1][0]])
            },
            &[ArgumentSource::HIGH, ArgumentSource::LOW],
        );
        let s = subject(&[10.0]);
        let parallel = eval.evaluate("HL", &s, &Kwargs::new(), true).unwrap();
        let serial = eval
            .parallel_args(false)
            .evaluate("HL", &s, &Kwargs::new(), true)
            .unwrap();
        assert_eq!(parallel, 11_008.0);
        assert_eq!(parallel, serial);
        assert_eq!(CALLS.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn schemas_grouped_and_flat() {
        let reg = registry();
        match reg.generate_all_schemas(false) {
            SchemaListing::Flat(list) => {
                let names: Vec<_> = list.iter().map(|s| s.name.as_str()).collect();
                assert_eq!(names, vec!["LAST", "SCALED"]);
            }
            other => panic!("expected flat listing, got {other:?}"),
        }
        match reg.generate_all_schemas(true) {
            SchemaListing::Grouped(groups) => {
                assert_eq!(groups["Price"].len(), 1);
                assert_eq!(groups[UNGROUPED][0].name, "SCALED");
            }
            other => panic!("expected grouped listing, got {other:?}"),
        }
    }

    #[test]
    fn schema_exposes_kwargs() {
        let schema = registry().generate_schema("SCALED").unwrap();
        let kwargs = schema.kwargs.unwrap();
        assert_eq!(kwargs["arguments"]["factor"]["default"], 2.0);
        assert_eq!(schema.sources, vec!["close"]);
        assert!(registry().generate_schema("LAST").unwrap().kwargs.is_none());
    }
}
