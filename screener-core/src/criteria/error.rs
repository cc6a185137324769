//! Error types for the criteria subsystem.

use std::fmt;

/// One rejected keyword argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KwargIssue {
    pub key: String,
    pub reason: String,
}

impl KwargIssue {
    pub fn new(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for KwargIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.reason)
    }
}

fn join_issues(issues: &[KwargIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors raised while building or evaluating criteria.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CriteriaError {
    #[error("Unsupported function: {0}")]
    UnsupportedFunction(String),
    #[error("Invalid arguments for {function}: {}", join_issues(.issues))]
    FunctionValidation {
        function: String,
        issues: Vec<KwargIssue>,
    },
    #[error("No comparator registered for operator {0}")]
    ComparisonNotFound(String),
    #[error("Unknown comparison operator: {0}")]
    UnknownOperator(String),
    #[error("Malformed criterion: {0}")]
    MalformedCriterion(String),
    #[error("Empty {source_name} series for {function}")]
    EmptySeries {
        function: String,
        source_name: String,
    },
    #[error("{function} produced a non-finite result ({value})")]
    DegenerateResult { function: String, value: f64 },
    #[error("Computation of {function} failed: {source}")]
    Computation {
        function: String,
        #[source]
        source: ComputeError,
    },
}

impl CriteriaError {
    /// Shorthand for a validation error with a single issue.
    pub fn validation(
        function: impl Into<String>,
        key: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::FunctionValidation {
            function: function.into(),
            issues: vec![KwargIssue::new(key, reason)],
        }
    }

    /// Wrap a routine failure. Argument-level failures become validation errors.
    pub fn computation(function: impl Into<String>, source: ComputeError) -> Self {
        let function = function.into();
        match source {
            ComputeError::UnknownMaType { key, code } => Self::validation(
                function,
                key,
                format!("unsupported moving average type {code}"),
            ),
            source => Self::Computation { function, source },
        }
    }

    pub fn is_unsupported_function(&self) -> bool {
        matches!(self, Self::UnsupportedFunction(_))
    }
}

/// Errors a numeric routine reports about its (already validated) inputs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComputeError {
    #[error("{name} must be at least {min}, got {value}")]
    OutOfRange { name: String, min: i64, value: i64 },
    #[error("Missing argument {0}")]
    MissingArgument(String),
    #[error("Unsupported moving average type for {key}: {code}")]
    UnknownMaType { key: String, code: i64 },
    #[error("Expected {expected} input series, got {actual}")]
    Arity { expected: usize, actual: usize },
}
