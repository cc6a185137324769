//! Keyword arguments and the data-driven schemas that validate them.
//!
//! A schema is an ordered list of fields `{name, kind, default, required}`.
//! [`KwargsSchema::validate`] interprets it generically: unknown keys and
//! missing required keys are rejected, values are coerced to the declared
//! kind and defaults fill the gaps.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::error::{CriteriaError, KwargIssue};

// ─── Values ──────────────────────────────────────────────────────────

/// A single keyword argument value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KwargValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl KwargValue {
    pub fn kind(&self) -> KwargKind {
        match self {
            Self::Bool(_) => KwargKind::Bool,
            Self::Int(_) => KwargKind::Int,
            Self::Float(_) => KwargKind::Float,
            Self::Str(_) => KwargKind::Str,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Floats and ints both read as `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Convert to `kind`, or `None` when no coercion rule applies.
    pub fn coerce(&self, kind: KwargKind) -> Option<KwargValue> {
        match (kind, self) {
            (KwargKind::Int, Self::Int(v)) => Some(Self::Int(*v)),
            (KwargKind::Int, Self::Float(v)) => integral(*v).map(Self::Int),
            (KwargKind::Int, Self::Str(s)) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(integral))
                    .map(Self::Int)
            }
            (KwargKind::Float, Self::Float(v)) => Some(Self::Float(*v)),
            (KwargKind::Float, Self::Int(v)) => Some(Self::Float(*v as f64)),
            (KwargKind::Float, Self::Str(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Self::Float),
            (KwargKind::Bool, Self::Bool(v)) => Some(Self::Bool(*v)),
            (KwargKind::Str, Self::Str(s)) => Some(Self::Str(s.clone())),
            _ => None,
        }
    }
}

fn integral(v: f64) -> Option<i64> {
    if v.is_finite() && v.fract() == 0.0 && v.abs() <= i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

// Floats compare by bit pattern so that specs can be used as hash keys.
impl PartialEq for KwargValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Str(a), Self::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for KwargValue {}

impl Hash for KwargValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Bool(v) => v.hash(state),
            Self::Int(v) => v.hash(state),
            Self::Float(v) => v.to_bits().hash(state),
            Self::Str(v) => v.hash(state),
        }
    }
}

impl fmt::Display for KwargValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Str(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<i64> for KwargValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for KwargValue {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<f64> for KwargValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for KwargValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for KwargValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for KwargValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

// ─── Kwargs ──────────────────────────────────────────────────────────

/// Keyword arguments keyed by name, iterated in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kwargs(BTreeMap<String, KwargValue>);

impl Kwargs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<KwargValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<KwargValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&KwargValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &KwargValue)> {
        self.0.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Kwargs
where
    K: Into<String>,
    V: Into<KwargValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Renders as `timeperiod=14, nbdev=2.0`.
impl fmt::Display for Kwargs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k}={v}")?;
        }
        Ok(())
    }
}

// ─── Schema ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KwargKind {
    Int,
    Float,
    Bool,
    Str,
}

impl KwargKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Str => "str",
        }
    }
}

/// One declared keyword argument.
#[derive(Debug, Clone, PartialEq)]
pub struct KwargField {
    pub name: String,
    pub kind: KwargKind,
    pub default: Option<KwargValue>,
    pub required: bool,
    pub description: Option<String>,
}

impl KwargField {
    pub fn int(name: impl Into<String>, default: i64) -> Self {
        Self::optional(name, KwargKind::Int, KwargValue::Int(default))
    }

    pub fn float(name: impl Into<String>, default: f64) -> Self {
        Self::optional(name, KwargKind::Float, KwargValue::Float(default))
    }

    pub fn bool(name: impl Into<String>, default: bool) -> Self {
        Self::optional(name, KwargKind::Bool, KwargValue::Bool(default))
    }

    pub fn optional(name: impl Into<String>, kind: KwargKind, default: KwargValue) -> Self {
        Self {
            name: name.into(),
            kind,
            default: Some(default),
            required: false,
            description: None,
        }
    }

    /// A field the caller must always supply.
    pub fn required(name: impl Into<String>, kind: KwargKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
            required: true,
            description: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Ordered field list interpreted by [`KwargsSchema::validate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KwargsSchema {
    fields: Vec<KwargField>,
}

impl KwargsSchema {
    pub fn new(fields: Vec<KwargField>) -> Self {
        let mut schema = Self::default();
        for field in fields {
            schema.upsert(field);
        }
        schema
    }

    pub fn fields(&self) -> &[KwargField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&KwargField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Combine with `other`; a field of `other` replaces one of the same name.
    pub fn merge(&self, other: &KwargsSchema) -> KwargsSchema {
        let mut merged = self.clone();
        for field in &other.fields {
            merged.upsert(field.clone());
        }
        merged
    }

    /// Fold several schemas left to right.
    pub fn merge_all<'a>(schemas: impl IntoIterator<Item = &'a KwargsSchema>) -> KwargsSchema {
        schemas
            .into_iter()
            .fold(KwargsSchema::default(), |acc, s| acc.merge(s))
    }

    fn upsert(&mut self, field: KwargField) {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    /// Validate `kwargs` for `function` and return the normalized copy.
    ///
    /// Every problem is reported at once: unknown keys and failed coercions
    /// in key order, then missing required fields in declaration order.
    pub fn validate(&self, function: &str, kwargs: &Kwargs) -> Result<Kwargs, CriteriaError> {
        let mut issues = Vec::new();
        let mut normalized = Kwargs::new();

        for (key, value) in kwargs.iter() {
            match self.field(key) {
                None => issues.push(KwargIssue::new(key.as_str(), "unknown argument")),
                Some(field) => match value.coerce(field.kind) {
                    Some(v) => normalized.insert(key.as_str(), v),
                    None => issues.push(KwargIssue::new(
                        key.as_str(),
                        format!("expected {}, got {}", field.kind.as_str(), value),
                    )),
                },
            }
        }

        for field in &self.fields {
            if kwargs.contains_key(&field.name) {
                continue;
            }
            match (&field.default, field.required) {
                (_, true) => {
                    issues.push(KwargIssue::new(field.name.as_str(), "missing required argument"))
                }
                (Some(default), false) => normalized.insert(field.name.as_str(), default.clone()),
                (None, false) => {}
            }
        }

        if issues.is_empty() {
            Ok(normalized)
        } else {
            Err(CriteriaError::FunctionValidation {
                function: function.to_string(),
                issues,
            })
        }
    }

    /// Serializable description consumed by rule-authoring front-ends.
    pub fn to_json_schema(&self) -> Value {
        let mut arguments = Map::new();
        let mut required = Vec::new();
        for field in &self.fields {
            let default = field
                .default
                .as_ref()
                .and_then(|d| serde_json::to_value(d).ok())
                .unwrap_or(Value::Null);
            arguments.insert(
                field.name.clone(),
                json!({
                    "type": field.kind.as_str(),
                    "default": default,
                    "required": field.required,
                    "description": field.description,
                }),
            );
            if field.required {
                required.push(Value::String(field.name.clone()));
            }
        }
        json!({
            "type": "function_kwargs",
            "arguments": arguments,
            "required_arguments": required,
        })
    }
}
