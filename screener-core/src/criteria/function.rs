//! `FunctionSpec`: a function name plus its normalized keyword arguments.

use std::fmt;

use super::kwargs::Kwargs;

/// Reference to a registered function with validated kwargs.
///
/// Specs are immutable; equality and hashing cover both name and kwargs.
/// Build them through [`FunctionRegistry::make_spec`](super::FunctionRegistry::make_spec)
/// so the kwargs are validated against the function's schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionSpec {
    name: String,
    kwargs: Kwargs,
}

impl FunctionSpec {
    /// Spec taken at face value, without consulting any registry.
    ///
    /// Used when an unsupported function is carried forward so that the
    /// failure surfaces at evaluation instead of construction.
    pub fn unchecked(name: impl Into<String>, kwargs: Kwargs) -> Self {
        Self {
            name: name.into(),
            kwargs,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kwargs(&self) -> &Kwargs {
        &self.kwargs
    }
}

/// Renders as `RSI(timeperiod=14)`.
impl fmt::Display for FunctionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.kwargs)
    }
}
