//! The query builder abstraction predicates are applied to.

use std::fmt;

use super::parameters::Scalar;

/// A field reference prefixed with its owning table or alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedField {
    pub table: String,
    pub field: String,
}

impl fmt::Display for QualifiedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.field)
    }
}

/// Comparisons a query builder must support for a single operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqualTo,
    GreaterThan,
    GreaterThanOrEqualTo,
    Like,
    CaseInsensitiveLike,
}

/// An externally supplied relational query builder.
///
/// The compiler only adds predicates; it never executes the query.
pub trait QueryBuilder {
    type Error;

    /// The table or alias that field references are qualified against.
    fn table_name(&self) -> Result<String, Self::Error>;

    /// Restrict to rows whose field is one of `values`.
    fn where_in(&mut self, field: QualifiedField, values: Vec<Scalar>) -> Result<(), Self::Error>;

    /// Restrict to rows whose field compares to `value`.
    fn where_(
        &mut self,
        field: QualifiedField,
        operator: ComparisonOperator,
        value: Scalar,
    ) -> Result<(), Self::Error>;
}

/// A query builder together with its table name, resolved once per application.
pub struct QueryTarget<'a, B: QueryBuilder> {
    builder: &'a mut B,
    table: String,
}

impl<'a, B: QueryBuilder> QueryTarget<'a, B> {
    /// Resolve the builder's table name and hold on to it.
    pub fn resolve(builder: &'a mut B) -> Result<Self, B::Error> {
        let table = builder.table_name()?;
        Ok(QueryTarget { builder, table })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn qualify(&self, field: &str) -> QualifiedField {
        QualifiedField {
            table: self.table.clone(),
            field: field.to_string(),
        }
    }

    pub fn where_in(&mut self, field: &str, values: Vec<Scalar>) -> Result<(), B::Error> {
        let field = self.qualify(field);
        self.builder.where_in(field, values)
    }

    pub fn where_(
        &mut self,
        field: &str,
        operator: ComparisonOperator,
        value: Scalar,
    ) -> Result<(), B::Error> {
        let field = self.qualify(field);
        self.builder.where_(field, operator, value)
    }

    /// Direct access for custom rules that need more than the generic predicates.
    pub fn builder(&mut self) -> &mut B {
        self.builder
    }
}

#[cfg(test)]
pub(crate) mod recording {
    //! A query builder that records the calls made to it.

    use std::cell::Cell;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        WhereIn(String, Vec<Scalar>),
        Where(String, ComparisonOperator, Scalar),
    }

    #[derive(Debug, Default)]
    pub struct RecordingBuilder {
        pub calls: Vec<Call>,
        pub table_lookups: Cell<usize>,
    }

    impl QueryBuilder for RecordingBuilder {
        type Error = std::convert::Infallible;

        fn table_name(&self) -> Result<String, Self::Error> {
            self.table_lookups.set(self.table_lookups.get() + 1);
            Ok("users".to_string())
        }

        fn where_in(
            &mut self,
            field: QualifiedField,
            values: Vec<Scalar>,
        ) -> Result<(), Self::Error> {
            self.calls.push(Call::WhereIn(field.to_string(), values));
            Ok(())
        }

        fn where_(
            &mut self,
            field: QualifiedField,
            operator: ComparisonOperator,
            value: Scalar,
        ) -> Result<(), Self::Error> {
            self.calls.push(Call::Where(field.to_string(), operator, value));
            Ok(())
        }
    }
}
