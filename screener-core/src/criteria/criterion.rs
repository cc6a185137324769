//! Criterion and Criteria: the rule data model.
//!
//! A criterion compares two function values with an operator. Identity is
//! the id alone, so two criteria with the same content but different ids are
//! distinct members of a [`Criteria`] collection.

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::domain::CriterionId;

use super::comparison::ComparisonOperator;
use super::error::CriteriaError;
use super::function::FunctionSpec;
use super::registry::FunctionRegistry;

// ─── Criterion ───────────────────────────────────────────────────────

/// `func1 op func2`, identified by a UUID assigned at creation.
#[derive(Debug, Clone)]
pub struct Criterion {
    id: CriterionId,
    func1: FunctionSpec,
    func2: FunctionSpec,
    op: ComparisonOperator,
}

impl Criterion {
    /// Assemble a criterion without consulting a registry.
    ///
    /// Prefer [`make_criterion`], which validates both functions.
    pub fn from_parts(
        id: CriterionId,
        func1: FunctionSpec,
        func2: FunctionSpec,
        op: ComparisonOperator,
    ) -> Self {
        Self {
            id,
            func1,
            func2,
            op,
        }
    }

    pub fn id(&self) -> CriterionId {
        self.id
    }

    pub fn func1(&self) -> &FunctionSpec {
        &self.func1
    }

    pub fn func2(&self) -> &FunctionSpec {
        &self.func2
    }

    pub fn op(&self) -> ComparisonOperator {
        self.op
    }
}

impl PartialEq for Criterion {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Criterion {}

impl Hash for Criterion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.func1, self.op, self.func2)
    }
}

/// Re-check a spec against the registry, or carry it forward when the
/// function is unknown and the caller asked to defer that failure.
fn revalidate(
    registry: &FunctionRegistry,
    spec: FunctionSpec,
    ignore_unsupported: bool,
) -> Result<FunctionSpec, CriteriaError> {
    if registry.contains(spec.name()) {
        return registry.make_spec(spec.name(), spec.kwargs().clone());
    }
    if ignore_unsupported {
        tracing::debug!(function = spec.name(), "keeping unsupported function spec");
        Ok(spec)
    } else {
        Err(CriteriaError::UnsupportedFunction(spec.name().to_string()))
    }
}

/// Build a criterion, validating both functions against `registry`.
///
/// A fresh id is generated unless `id` is given. With `ignore_unsupported`,
/// unknown function names are kept as-is and fail at evaluation instead.
pub fn make_criterion(
    registry: &FunctionRegistry,
    func1: FunctionSpec,
    func2: FunctionSpec,
    op: ComparisonOperator,
    id: Option<CriterionId>,
    ignore_unsupported: bool,
) -> Result<Criterion, CriteriaError> {
    let func1 = revalidate(registry, func1, ignore_unsupported)?;
    let func2 = revalidate(registry, func2, ignore_unsupported)?;
    Ok(Criterion::from_parts(
        id.unwrap_or_default(),
        func1,
        func2,
        op,
    ))
}

/// Field overrides for [`update_criterion`].
#[derive(Debug, Clone)]
pub struct CriterionUpdate {
    pub func1: Option<FunctionSpec>,
    pub func2: Option<FunctionSpec>,
    pub op: Option<ComparisonOperator>,
    /// Id of the new criterion; a fresh one is generated when `None`.
    pub id: Option<CriterionId>,
    pub ignore_unsupported: bool,
}

impl Default for CriterionUpdate {
    fn default() -> Self {
        Self {
            func1: None,
            func2: None,
            op: None,
            id: None,
            ignore_unsupported: true,
        }
    }
}

/// New criterion with `update` merged over `criterion`'s fields.
pub fn update_criterion(
    registry: &FunctionRegistry,
    criterion: &Criterion,
    update: CriterionUpdate,
) -> Result<Criterion, CriteriaError> {
    make_criterion(
        registry,
        update.func1.unwrap_or_else(|| criterion.func1.clone()),
        update.func2.unwrap_or_else(|| criterion.func2.clone()),
        update.op.unwrap_or(criterion.op),
        update.id,
        update.ignore_unsupported,
    )
}

// ─── Status ──────────────────────────────────────────────────────────

/// Outcome of evaluating one criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CriterionStatus {
    Passed,
    Failed,
}

impl CriterionStatus {
    /// 1 for passed, 0 for failed; summed to score a subject.
    pub fn ordinal(&self) -> u32 {
        match self {
            Self::Passed => 1,
            Self::Failed => 0,
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

impl From<bool> for CriterionStatus {
    fn from(passed: bool) -> Self {
        if passed {
            Self::Passed
        } else {
            Self::Failed
        }
    }
}

impl fmt::Display for CriterionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => f.write_str("PASSED"),
            Self::Failed => f.write_str("FAILED"),
        }
    }
}

// ─── Criteria ────────────────────────────────────────────────────────

/// Ordered collection of criteria, unique by id.
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    items: Vec<Criterion>,
    ids: HashSet<CriterionId>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Criterion> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Criterion] {
        &self.items
    }

    pub fn contains(&self, id: CriterionId) -> bool {
        self.ids.contains(&id)
    }

    pub fn get(&self, id: CriterionId) -> Option<&Criterion> {
        if !self.contains(id) {
            return None;
        }
        self.items.iter().find(|c| c.id == id)
    }

    pub fn ids(&self) -> HashSet<CriterionId> {
        self.ids.clone()
    }

    /// Append `criterion` unless one with the same id is present.
    pub fn insert(&mut self, criterion: Criterion) -> bool {
        if !self.ids.insert(criterion.id) {
            return false;
        }
        self.items.push(criterion);
        true
    }

    pub fn remove(&mut self, id: CriterionId) -> Option<Criterion> {
        if !self.ids.remove(&id) {
            return None;
        }
        let pos = self.items.iter().position(|c| c.id == id)?;
        Some(self.items.remove(pos))
    }

    /// Union: `self` followed by the members of `other` not already present.
    pub fn merge(&self, other: &Criteria) -> Criteria {
        let mut merged = self.clone();
        merged.extend(other.iter().cloned());
        merged
    }

    /// `self` without any member whose id appears in `other`.
    pub fn subtract(&self, other: &Criteria) -> Criteria {
        self.iter()
            .filter(|c| !other.contains(c.id))
            .cloned()
            .collect()
    }
}

impl Extend<Criterion> for Criteria {
    fn extend<I: IntoIterator<Item = Criterion>>(&mut self, iter: I) {
        for criterion in iter {
            self.insert(criterion);
        }
    }
}

impl FromIterator<Criterion> for Criteria {
    fn from_iter<I: IntoIterator<Item = Criterion>>(iter: I) -> Self {
        let mut criteria = Criteria::new();
        criteria.extend(iter);
        criteria
    }
}

impl IntoIterator for Criteria {
    type Item = Criterion;
    type IntoIter = std::vec::IntoIter<Criterion>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Criteria {
    type Item = &'a Criterion;
    type IntoIter = std::slice::Iter<'a, Criterion>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl Add for &Criteria {
    type Output = Criteria;

    fn add(self, rhs: &Criteria) -> Criteria {
        self.merge(rhs)
    }
}

impl Add for Criteria {
    type Output = Criteria;

    fn add(mut self, rhs: Criteria) -> Criteria {
        self.extend(rhs);
        self
    }
}

impl Sub for &Criteria {
    type Output = Criteria;

    fn sub(self, rhs: &Criteria) -> Criteria {
        self.subtract(rhs)
    }
}

impl Sub for Criteria {
    type Output = Criteria;

    fn sub(self, rhs: Criteria) -> Criteria {
        self.subtract(&rhs)
    }
}
