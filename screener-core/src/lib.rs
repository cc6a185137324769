//! Screener Core: domain types, indicator kernels, criteria, evaluation.
//!
//! - Domain types (bars, subjects, criterion ids)
//! - Slice-based technical-analysis kernels
//! - Function and comparison registries with data-driven kwargs schemas
//! - Criterion / Criteria rule model and its persisted record form
//! - Evaluation engine with bounded fan-out

pub mod criteria;
pub mod domain;
pub mod engine;
pub mod indicators;

pub use criteria::{bootstrap, Criteria, CriteriaError, Criterion, CriterionStatus};
pub use engine::{EngineError, EvaluationEngine, Outcomes};
