//! Generic predicates for declared fields without a custom rule.

use super::error::CoercionWarning;
use super::parameters::{ParameterValue, Scalar};
use super::spec::Operator;
use super::target::{ComparisonOperator, QueryBuilder, QueryTarget};

/// Apply the generic rule of `operator` to `field`.
///
/// Returns a warning when the value had to be coerced to fit the operator.
pub fn apply_generic<B: QueryBuilder>(
    operator: Operator,
    field: &str,
    value: &ParameterValue,
    target: &mut QueryTarget<'_, B>,
) -> Result<Option<CoercionWarning>, B::Error> {
    match operator {
        Operator::ExactOrIn => {
            let values = value.scalars();
            if values.is_empty() {
                return Ok(None);
            }
            target.where_in(field, values)?;
            Ok(None)
        }
        Operator::Like => {
            let (operand, warning) = match value {
                ParameterValue::Scalar(scalar) => (scalar, None),
                ParameterValue::Sequence(values) => match values.first() {
                    Some(first) => (
                        first,
                        Some(CoercionWarning::SequenceForPattern {
                            field: field.to_string(),
                            used: first.clone(),
                        }),
                    ),
                    None => return Ok(None),
                },
                ParameterValue::Null | ParameterValue::Opaque(_) => return Ok(None),
            };
            if let Some(warning) = &warning {
                tracing::warn!(%warning, "coerced pattern operand");
            }
            target.where_(
                field,
                ComparisonOperator::CaseInsensitiveLike,
                Scalar::String(contains_pattern(&operand.to_string())),
            )?;
            Ok(warning)
        }
        // only reachable through a custom rule
        Operator::CustomOnly => Ok(None),
    }
}

/// A pattern matching any text that contains `value` literally.
pub fn contains_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
