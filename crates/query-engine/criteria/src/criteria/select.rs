//! Apply criteria to a SQL `SELECT`.

use query_engine_sql::sql;
use thiserror::Error;

use super::parameters::Scalar;
use super::target::{ComparisonOperator, QualifiedField, QueryBuilder};

/// A `SELECT` that predicates cannot be added to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("the query has no FROM clause to qualify fields against")]
    MissingFrom,
}

/// Predicates are AND-ed into the WHERE clause and refer to columns of the
/// FROM clause's alias.
impl QueryBuilder for sql::ast::Select {
    type Error = TargetError;

    fn table_name(&self) -> Result<String, Self::Error> {
        self.from
            .as_ref()
            .map(|from| from.alias().name.clone())
            .ok_or(TargetError::MissingFrom)
    }

    /// An empty list matches no rows.
    fn where_in(&mut self, field: QualifiedField, values: Vec<Scalar>) -> Result<(), Self::Error> {
        if values.is_empty() {
            and_where(self, sql::helpers::false_expr());
            return Ok(());
        }
        let predicate = sql::ast::Expression::BinaryArrayOperation {
            left: Box::new(translate_field(field)),
            operator: sql::ast::BinaryArrayOperator::In,
            right: values
                .into_iter()
                .map(|value| sql::ast::Expression::Value(translate_scalar(value)))
                .collect(),
        };
        and_where(self, predicate);
        Ok(())
    }

    fn where_(
        &mut self,
        field: QualifiedField,
        operator: ComparisonOperator,
        value: Scalar,
    ) -> Result<(), Self::Error> {
        let predicate = sql::ast::Expression::BinaryOperation {
            left: Box::new(translate_field(field)),
            operator: translate_operator(operator),
            right: Box::new(sql::ast::Expression::Value(translate_scalar(value))),
        };
        and_where(self, predicate);
        Ok(())
    }
}

/// Add a predicate to the WHERE clause of a `SELECT`.
fn and_where(select: &mut sql::ast::Select, predicate: sql::ast::Expression) {
    let sql::ast::Where(current) = std::mem::replace(
        &mut select.where_,
        sql::ast::Where(sql::helpers::empty_where()),
    );
    select.where_ = sql::ast::Where(sql::helpers::and_expr(current, predicate));
}

/// Reference a qualified field as a column of an aliased table.
pub fn translate_field(field: QualifiedField) -> sql::ast::Expression {
    sql::helpers::make_column(&sql::helpers::make_table_alias(field.table), field.field)
}

pub fn translate_scalar(value: Scalar) -> sql::ast::Value {
    match value {
        Scalar::Bool(b) => sql::ast::Value::Bool(b),
        Scalar::Int(i) => sql::ast::Value::Int8(i),
        Scalar::Float(n) => sql::ast::Value::Float8(n),
        Scalar::String(s) => sql::ast::Value::String(s),
    }
}

fn translate_operator(operator: ComparisonOperator) -> sql::ast::BinaryOperator {
    match operator {
        ComparisonOperator::Equals => sql::ast::BinaryOperator::Equals,
        ComparisonOperator::NotEquals => sql::ast::BinaryOperator::NotEquals,
        ComparisonOperator::LessThan => sql::ast::BinaryOperator::LessThan,
        ComparisonOperator::LessThanOrEqualTo => sql::ast::BinaryOperator::LessThanOrEqualTo,
        ComparisonOperator::GreaterThan => sql::ast::BinaryOperator::GreaterThan,
        ComparisonOperator::GreaterThanOrEqualTo => {
            sql::ast::BinaryOperator::GreaterThanOrEqualTo
        }
        ComparisonOperator::Like => sql::ast::BinaryOperator::Like,
        ComparisonOperator::CaseInsensitiveLike => sql::ast::BinaryOperator::CaseInsensitiveLike,
    }
}
