//! Compile request parameters into predicates on a query, according to a
//! declaration of which fields may be filtered and how.

pub mod engine;
pub mod error;
pub mod parameters;
pub mod predicate;
pub mod rules;
pub mod sanitize;
pub mod select;
pub mod spec;
pub mod target;

pub use engine::{AppliedCriteria, Criteria, CriteriaDefinition, CriteriaDefinitionBuilder, Resolution};
pub use error::{CoercionWarning, ConfigurationError, InvalidParameters};
pub use parameters::{ParameterBag, ParameterValue, Scalar};
pub use sanitize::{FilteredParameterBag, Sanitizer};
pub use spec::{CriteriaSpec, CriteriaSpecBuilder, Operator};
pub use target::{ComparisonOperator, QualifiedField, QueryBuilder, QueryTarget};
