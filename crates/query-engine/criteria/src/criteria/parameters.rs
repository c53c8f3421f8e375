//! Request parameters as they arrive, before any filtering takes place.

use std::fmt;

use indexmap::IndexMap;
use serde::Deserialize;

use super::error::InvalidParameters;

/// A single operand value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

/// The textual form of a scalar, as used for pattern matching.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(n) => write!(f, "{n}"),
            Scalar::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(value.into())
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

/// A raw parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Scalar(Scalar),
    /// An ordered sequence of scalars, possibly empty.
    Sequence(Vec<Scalar>),
    Null,
    /// Anything that cannot be used as a predicate operand, kept as it was received.
    Opaque(serde_json::Value),
}

impl ParameterValue {
    pub fn scalar(value: impl Into<Scalar>) -> Self {
        ParameterValue::Scalar(value.into())
    }

    pub fn sequence<T: Into<Scalar>>(values: impl IntoIterator<Item = T>) -> Self {
        ParameterValue::Sequence(values.into_iter().map(Into::into).collect())
    }

    /// The operands carried by this value: a scalar becomes a one-element list.
    pub fn scalars(&self) -> Vec<Scalar> {
        match self {
            ParameterValue::Scalar(scalar) => vec![scalar.clone()],
            ParameterValue::Sequence(scalars) => scalars.clone(),
            ParameterValue::Null | ParameterValue::Opaque(_) => vec![],
        }
    }
}

impl From<Scalar> for ParameterValue {
    fn from(value: Scalar) -> Self {
        ParameterValue::Scalar(value)
    }
}

impl From<Vec<Scalar>> for ParameterValue {
    fn from(value: Vec<Scalar>) -> Self {
        ParameterValue::Sequence(value)
    }
}

/// Convert a decoded JSON value. Arrays must hold only scalars to form a sequence;
/// any other array is opaque as a whole.
impl From<serde_json::Value> for ParameterValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ParameterValue::Null,
            serde_json::Value::Array(items) => {
                match items.iter().map(json_scalar).collect::<Option<Vec<_>>>() {
                    Some(scalars) => ParameterValue::Sequence(scalars),
                    None => ParameterValue::Opaque(serde_json::Value::Array(items)),
                }
            }
            other => match json_scalar(&other) {
                Some(scalar) => ParameterValue::Scalar(scalar),
                None => ParameterValue::Opaque(other),
            },
        }
    }
}

fn json_scalar(value: &serde_json::Value) -> Option<Scalar> {
    match value {
        serde_json::Value::Bool(b) => Some(Scalar::Bool(*b)),
        serde_json::Value::Number(num) => num
            .as_i64()
            .map(Scalar::Int)
            .or_else(|| num.as_f64().map(Scalar::Float)),
        serde_json::Value::String(s) => Some(Scalar::String(s.clone())),
        serde_json::Value::Null | serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            None
        }
    }
}

/// Field name to raw value, in the order the parameters were supplied.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "IndexMap<String, serde_json::Value>")]
pub struct ParameterBag(IndexMap<String, ParameterValue>);

impl ParameterBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter, replacing any previous value while keeping its position.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<ParameterValue>) {
        self.0.insert(field.into(), value.into());
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&ParameterValue> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.0.iter().map(|(field, value)| (field.as_str(), value))
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<ParameterValue>> FromIterator<(K, V)> for ParameterBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        ParameterBag(
            iter.into_iter()
                .map(|(field, value)| (field.into(), value.into()))
                .collect(),
        )
    }
}

impl From<IndexMap<String, serde_json::Value>> for ParameterBag {
    fn from(map: IndexMap<String, serde_json::Value>) -> Self {
        map.into_iter().collect()
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for ParameterBag {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        map.into_iter().collect()
    }
}

impl TryFrom<serde_json::Value> for ParameterBag {
    type Error = InvalidParameters;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Object(map) => Ok(map.into()),
            other => Err(InvalidParameters::NotAnObject(json_kind(&other))),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
