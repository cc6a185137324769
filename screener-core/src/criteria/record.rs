//! Persisted form of criteria and parsing of raw authoring input.
//!
//! Records are plain serde structs: `{id, func1: {name, kwargs}, func2, op}`.
//! Converting criteria to records and back is lossless.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::CriterionId;

use super::comparison::ComparisonOperator;
use super::criterion::{make_criterion, Criteria, Criterion};
use super::error::CriteriaError;
use super::function::FunctionSpec;
use super::kwargs::Kwargs;
use super::registry::FunctionRegistry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub name: String,
    #[serde(default, alias = "options")]
    pub kwargs: Kwargs,
}

impl From<&FunctionSpec> for FunctionRecord {
    fn from(spec: &FunctionSpec) -> Self {
        Self {
            name: spec.name().to_string(),
            kwargs: spec.kwargs().clone(),
        }
    }
}

impl FunctionRecord {
    fn into_spec(self) -> FunctionSpec {
        FunctionSpec::unchecked(self.name, self.kwargs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CriterionId>,
    pub func1: FunctionRecord,
    pub func2: FunctionRecord,
    pub op: ComparisonOperator,
}

impl From<&Criterion> for CriterionRecord {
    fn from(criterion: &Criterion) -> Self {
        Self {
            id: Some(criterion.id()),
            func1: criterion.func1().into(),
            func2: criterion.func2().into(),
            op: criterion.op(),
        }
    }
}

impl CriterionRecord {
    /// Validate against `registry`. A record without an id gets a fresh one.
    pub fn into_criterion(
        self,
        registry: &FunctionRegistry,
        ignore_unsupported: bool,
    ) -> Result<Criterion, CriteriaError> {
        make_criterion(
            registry,
            self.func1.into_spec(),
            self.func2.into_spec(),
            self.op,
            self.id,
            ignore_unsupported,
        )
    }
}

pub fn to_records(criteria: &Criteria) -> Vec<CriterionRecord> {
    criteria.iter().map(CriterionRecord::from).collect()
}

/// Rebuild criteria from records, stopping at the first invalid one.
pub fn from_records<I>(
    registry: &FunctionRegistry,
    records: I,
    ignore_unsupported: bool,
) -> Result<Criteria, CriteriaError>
where
    I: IntoIterator<Item = CriterionRecord>,
{
    records
        .into_iter()
        .map(|record| record.into_criterion(registry, ignore_unsupported))
        .collect()
}

// ─── Raw input ───────────────────────────────────────────────────────

fn malformed(msg: impl Into<String>) -> CriteriaError {
    CriteriaError::MalformedCriterion(msg.into())
}

fn parse_function(raw: &Value, field: &str) -> Result<FunctionRecord, CriteriaError> {
    let obj = match raw.get(field) {
        None | Some(Value::Null) => return Err(malformed(format!("missing {field}"))),
        Some(Value::Object(obj)) => obj,
        Some(_) => return Err(malformed(format!("{field} must be an object"))),
    };
    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(format!("{field}.name must be a string")))?;

    let kwargs = match obj.get("kwargs").or_else(|| obj.get("options")) {
        None | Some(Value::Null) => Kwargs::new(),
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|e| malformed(format!("{field} options: {e}")))?,
    };

    Ok(FunctionRecord {
        name: name.trim().to_string(),
        kwargs,
    })
}

/// Parse one raw authoring record `{func1: {name, options}, func2, op, id?}`.
pub fn parse_raw_criterion(raw: &Value) -> Result<CriterionRecord, CriteriaError> {
    if !raw.is_object() {
        return Err(malformed("criterion must be an object"));
    }
    let func1 = parse_function(raw, "func1")?;
    let func2 = parse_function(raw, "func2")?;
    let op = match raw.get("op") {
        None | Some(Value::Null) => return Err(malformed("missing op")),
        Some(Value::String(s)) => s.parse::<ComparisonOperator>()?,
        Some(other) => return Err(CriteriaError::UnknownOperator(other.to_string())),
    };
    let id = match raw.get("id") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(
            s.parse::<CriterionId>()
                .map_err(|e| malformed(format!("invalid id {s:?}: {e}")))?,
        ),
        Some(other) => return Err(malformed(format!("invalid id {other}"))),
    };
    Ok(CriterionRecord {
        id,
        func1,
        func2,
        op,
    })
}

/// Parse a JSON array of raw records, or a single record.
pub fn parse_raw_criteria(raw: &Value) -> Result<Vec<CriterionRecord>, CriteriaError> {
    match raw {
        Value::Array(items) => items.iter().map(parse_raw_criterion).collect(),
        other => Ok(vec![parse_raw_criterion(other)?]),
    }
}
