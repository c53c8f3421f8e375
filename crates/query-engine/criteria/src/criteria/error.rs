//! Errors and warnings raised while declaring or applying criteria.

use std::fmt;

use thiserror::Error;

use super::parameters::Scalar;

/// A criteria definition that cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("unrecognized operator '{operator}' for field '{field}', expected one of: {expected}")]
    UnrecognizedOperator {
        field: String,
        operator: String,
        expected: String,
    },
    #[error("field '{0}' is declared more than once")]
    DuplicateField(String),
    #[error("field names must not be empty")]
    EmptyFieldName,
    #[error("field '{field}' only has a custom rule, but no rule named '{rule}' is registered")]
    MissingCustomRule { field: String, rule: String },
}

/// Parameters that cannot be turned into a bag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidParameters {
    #[error("parameters must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// A value that did not have the shape its operator expects, and was coerced.
#[derive(Debug, Clone, PartialEq)]
pub enum CoercionWarning {
    /// A pattern field received a sequence; only its first element was used.
    SequenceForPattern { field: String, used: Scalar },
}

impl fmt::Display for CoercionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoercionWarning::SequenceForPattern { field, used } => write!(
                f,
                "field '{field}' expects a single value but received a list, using its first element '{used}'"
            ),
        }
    }
}
