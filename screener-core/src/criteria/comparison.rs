//! Comparison operators and the comparator registry.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::CriteriaError;

/// Binary relation applied to the two function values of a criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComparisonOperator {
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
    #[serde(rename = "<=")]
    LessThanOrEqual,
}

impl ComparisonOperator {
    pub const ALL: [ComparisonOperator; 5] = [
        Self::GreaterThan,
        Self::LessThan,
        Self::Equal,
        Self::GreaterThanOrEqual,
        Self::LessThanOrEqual,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::GreaterThan => ">",
            Self::LessThan => "<",
            Self::Equal => "=",
            Self::GreaterThanOrEqual => ">=",
            Self::LessThanOrEqual => "<=",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for ComparisonOperator {
    type Err = CriteriaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|op| op.symbol() == trimmed)
            .ok_or_else(|| CriteriaError::UnknownOperator(s.to_string()))
    }
}

/// Pure comparator over two function values.
pub type Comparator = fn(f64, f64) -> bool;

fn greater_than(a: f64, b: f64) -> bool {
    a > b
}

fn less_than(a: f64, b: f64) -> bool {
    a < b
}

fn equal(a: f64, b: f64) -> bool {
    a == b
}

fn greater_than_or_equal(a: f64, b: f64) -> bool {
    a >= b
}

fn less_than_or_equal(a: f64, b: f64) -> bool {
    a <= b
}

/// Operator → comparator table.
///
/// Populated once at bootstrap; afterwards it is only read, so a shared
/// reference can be handed to any number of worker threads.
#[derive(Debug, Clone, Default)]
pub struct ComparisonRegistry {
    comparators: HashMap<ComparisonOperator, Comparator>,
}

impl ComparisonRegistry {
    /// Empty registry. Most callers want [`ComparisonRegistry::with_builtins`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the five built-in operators.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(ComparisonOperator::GreaterThan, greater_than);
        registry.register(ComparisonOperator::LessThan, less_than);
        registry.register(ComparisonOperator::Equal, equal);
        registry.register(ComparisonOperator::GreaterThanOrEqual, greater_than_or_equal);
        registry.register(ComparisonOperator::LessThanOrEqual, less_than_or_equal);
        registry
    }

    /// Associate `op` with `comparator`, replacing any previous one.
    pub fn register(&mut self, op: ComparisonOperator, comparator: Comparator) {
        tracing::debug!(operator = %op, "registered comparator");
        self.comparators.insert(op, comparator);
    }

    /// Comparator for `op`, failing with `ComparisonNotFound` if absent.
    pub fn resolve(&self, op: ComparisonOperator) -> Result<Comparator, CriteriaError> {
        self.try_resolve(op)
            .ok_or_else(|| CriteriaError::ComparisonNotFound(op.symbol().to_string()))
    }

    /// Comparator for `op`, or `None` when nothing is registered.
    pub fn try_resolve(&self, op: ComparisonOperator) -> Option<Comparator> {
        self.comparators.get(&op).copied()
    }

    /// Registered operators in canonical order.
    pub fn operators(&self) -> Vec<ComparisonOperator> {
        let mut ops: Vec<_> = self.comparators.keys().copied().collect();
        ops.sort();
        ops
    }
}
