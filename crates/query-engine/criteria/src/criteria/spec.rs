//! Declarations of which fields are filterable, and how.

use std::fmt;
use std::str::FromStr;

use enum_iterator::Sequence;
use indexmap::IndexMap;

use super::error::ConfigurationError;

/// How a declared field turns its value into a predicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Sequence)]
pub enum Operator {
    /// Membership in the given value(s).
    #[default]
    ExactOrIn,
    /// Case-insensitive substring match.
    Like,
    /// Handled by a custom rule only.
    CustomOnly,
}

impl Operator {
    /// The canonical name used in configuration.
    pub fn name(self) -> &'static str {
        match self {
            Operator::ExactOrIn => "exact_or_in",
            Operator::Like => "like",
            Operator::CustomOnly => "custom",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Operator::ExactOrIn => &["exact", "in", "="],
            Operator::Like | Operator::CustomOnly => &[],
        }
    }

    /// Resolve an operator by its name or one of its aliases, ignoring case.
    pub fn parse(field: &str, name: &str) -> Result<Operator, ConfigurationError> {
        let wanted = name.trim();
        enum_iterator::all::<Operator>()
            .find(|operator| {
                operator.name().eq_ignore_ascii_case(wanted)
                    || operator
                        .aliases()
                        .iter()
                        .any(|alias| alias.eq_ignore_ascii_case(wanted))
            })
            .ok_or_else(|| ConfigurationError::UnrecognizedOperator {
                field: field.to_string(),
                operator: name.to_string(),
                expected: enum_iterator::all::<Operator>()
                    .map(Operator::name)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operator {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::parse("", s)
    }
}

/// An ordered, immutable list of filterable fields and their operators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CriteriaSpec {
    fields: IndexMap<String, Operator>,
}

impl CriteriaSpec {
    pub fn builder() -> CriteriaSpecBuilder {
        CriteriaSpecBuilder::default()
    }

    pub fn operator(&self, field: &str) -> Option<Operator> {
        self.fields.get(field).copied()
    }

    pub fn is_declared(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Declared fields, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, Operator)> {
        self.fields
            .iter()
            .map(|(field, operator)| (field.as_str(), *operator))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Debug, Clone)]
enum Declared {
    Operator(Operator),
    Named(String),
}

/// Collects declarations; every check happens in [`CriteriaSpecBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct CriteriaSpecBuilder {
    declarations: Vec<(String, Declared)>,
}

impl CriteriaSpecBuilder {
    /// Declare a field with the default operator.
    #[must_use]
    pub fn field(self, field: impl Into<String>) -> Self {
        self.operator(field, Operator::default())
    }

    #[must_use]
    pub fn exact_or_in(self, field: impl Into<String>) -> Self {
        self.operator(field, Operator::ExactOrIn)
    }

    #[must_use]
    pub fn like(self, field: impl Into<String>) -> Self {
        self.operator(field, Operator::Like)
    }

    #[must_use]
    pub fn custom(self, field: impl Into<String>) -> Self {
        self.operator(field, Operator::CustomOnly)
    }

    #[must_use]
    pub fn operator(mut self, field: impl Into<String>, operator: Operator) -> Self {
        self.declarations
            .push((field.into(), Declared::Operator(operator)));
        self
    }

    /// Declare a field by operator name; `None` means the default operator.
    #[must_use]
    pub fn named(mut self, field: impl Into<String>, operator: Option<&str>) -> Self {
        let declared = match operator {
            Some(name) => Declared::Named(name.to_string()),
            None => Declared::Operator(Operator::default()),
        };
        self.declarations.push((field.into(), declared));
        self
    }

    pub fn build(self) -> Result<CriteriaSpec, ConfigurationError> {
        let mut fields = IndexMap::with_capacity(self.declarations.len());
        for (field, declared) in self.declarations {
            if field.trim().is_empty() {
                return Err(ConfigurationError::EmptyFieldName);
            }
            let operator = match declared {
                Declared::Operator(operator) => operator,
                Declared::Named(name) => Operator::parse(&field, &name)?,
            };
            if fields.contains_key(&field) {
                return Err(ConfigurationError::DuplicateField(field));
            }
            fields.insert(field, operator);
        }
        Ok(CriteriaSpec { fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declarations_keep_their_order() {
        let spec = CriteriaSpec::builder()
            .exact_or_in("status")
            .like("name")
            .field("age")
            .build()
            .unwrap();
        assert_eq!(
            spec.fields().collect::<Vec<_>>(),
            vec![
                ("status", Operator::ExactOrIn),
                ("name", Operator::Like),
                ("age", Operator::ExactOrIn)
            ]
        );
        assert!(spec.is_declared("name"));
        assert!(!spec.is_declared("extra"));
    }

    #[test]
    fn operators_parse_by_name_and_alias() {
        assert_eq!(Operator::parse("f", "exact_or_in"), Ok(Operator::ExactOrIn));
        assert_eq!(Operator::parse("f", "IN"), Ok(Operator::ExactOrIn));
        assert_eq!(Operator::parse("f", "="), Ok(Operator::ExactOrIn));
        assert_eq!(Operator::parse("f", " Like "), Ok(Operator::Like));
        assert_eq!("custom".parse::<Operator>(), Ok(Operator::CustomOnly));
    }

    #[test]
    fn unrecognized_operator_fails_at_build() {
        let err = CriteriaSpec::builder()
            .field("status")
            .named("name", Some("between"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnrecognizedOperator {
                field: "name".to_string(),
                operator: "between".to_string(),
                expected: "exact_or_in, like, custom".to_string(),
            }
        );
        assert_eq!(
            err.to_string(),
            "unrecognized operator 'between' for field 'name', expected one of: exact_or_in, like, custom"
        );
    }

    #[test]
    fn missing_operator_name_defaults_to_exact_or_in() {
        let spec = CriteriaSpec::builder().named("age", None).build().unwrap();
        assert_eq!(spec.operator("age"), Some(Operator::ExactOrIn));
    }

    #[test]
    fn duplicate_and_empty_fields_are_rejected() {
        assert_eq!(
            CriteriaSpec::builder().field("a").like("a").build(),
            Err(ConfigurationError::DuplicateField("a".to_string()))
        );
        assert_eq!(
            CriteriaSpec::builder().field(" ").build(),
            Err(ConfigurationError::EmptyFieldName)
        );
    }
}
