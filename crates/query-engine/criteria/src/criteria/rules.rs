//! Per-field custom rules, looked up by a name derived from the field.
//!
//! A rule's name is the configured prefix followed by the studly-cased field
//! name, so with the default prefix both `created_at` and `createdAt` resolve
//! to `criteriaCreatedAt`. Rules are registered explicitly; the name is only
//! used as the lookup key.
//!
//! Fields that only differ in case or separators share a rule: a bag holding
//! both `min_age` and `minAge` runs `criteriaMinAge` once for each of them.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use convert_case::{Case, Casing};

use super::parameters::ParameterValue;
use super::target::{QueryBuilder, QueryTarget};

pub const DEFAULT_RULE_PREFIX: &str = "criteria";

/// A custom rule: fully responsible for the predicates of its field.
pub type RuleHandler<B> = dyn Fn(&mut QueryTarget<'_, B>, &ParameterValue) -> Result<(), <B as QueryBuilder>::Error>
    + Send
    + Sync;

/// The rule name a field is dispatched to.
pub fn rule_name(prefix: &str, field: &str) -> String {
    format!("{prefix}{}", field.to_case(Case::Pascal))
}

/// Rule name to handler. Not modified once a criteria definition is built.
pub struct CustomRules<B: QueryBuilder> {
    prefix: String,
    handlers: HashMap<String, Arc<RuleHandler<B>>>,
}

impl<B: QueryBuilder> CustomRules<B> {
    pub fn new(prefix: impl Into<String>) -> Self {
        CustomRules {
            prefix: prefix.into(),
            handlers: HashMap::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Register a handler under an explicit rule name, replacing any previous one.
    pub fn insert(&mut self, name: impl Into<String>, handler: Arc<RuleHandler<B>>) {
        self.handlers.insert(name.into(), handler);
    }

    /// Register a handler for the rule name derived from `field`.
    pub fn insert_for_field(&mut self, field: &str, handler: Arc<RuleHandler<B>>) {
        let name = rule_name(&self.prefix, field);
        self.insert(name, handler);
    }

    /// The name of the rule registered for `field`, if there is one.
    pub fn rule_for(&self, field: &str) -> Option<String> {
        let name = rule_name(&self.prefix, field);
        self.handlers.contains_key(&name).then_some(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run the rule registered for `field`, if any.
    ///
    /// Returns `false` without touching the target when no rule matches.
    pub fn try_dispatch(
        &self,
        field: &str,
        value: &ParameterValue,
        target: &mut QueryTarget<'_, B>,
    ) -> Result<bool, B::Error> {
        match self.handlers.get(&rule_name(&self.prefix, field)) {
            Some(handler) => {
                handler(target, value)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl<B: QueryBuilder> Clone for CustomRules<B> {
    fn clone(&self) -> Self {
        CustomRules {
            prefix: self.prefix.clone(),
            handlers: self.handlers.clone(),
        }
    }
}

impl<B: QueryBuilder> fmt::Debug for CustomRules<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("CustomRules")
            .field("prefix", &self.prefix)
            .field("rules", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::parameters::Scalar;
    use crate::criteria::target::recording::{Call, RecordingBuilder};
    use crate::criteria::target::ComparisonOperator;

    fn at_least(
        target: &mut QueryTarget<'_, RecordingBuilder>,
        value: &ParameterValue,
    ) -> Result<(), std::convert::Infallible> {
        for scalar in value.scalars() {
            target.where_("age", ComparisonOperator::GreaterThanOrEqualTo, scalar)?;
        }
        Ok(())
    }

    #[test]
    fn rule_names_are_studly_cased() {
        assert_eq!(rule_name("criteria", "status"), "criteriaStatus");
        assert_eq!(rule_name("criteria", "created_at"), "criteriaCreatedAt");
        assert_eq!(rule_name("criteria", "createdAt"), "criteriaCreatedAt");
        assert_eq!(rule_name("filter", "min-age"), "filterMinAge");
    }

    #[test]
    fn dispatches_to_the_registered_rule() {
        let mut rules = CustomRules::new(DEFAULT_RULE_PREFIX);
        rules.insert_for_field("min_age", Arc::new(at_least));
        assert_eq!(rules.rule_for("min_age").as_deref(), Some("criteriaMinAge"));
        assert_eq!(rules.rule_for("minAge").as_deref(), Some("criteriaMinAge"));

        let mut builder = RecordingBuilder::default();
        let mut target = QueryTarget::resolve(&mut builder).unwrap();
        let handled = rules
            .try_dispatch("min_age", &ParameterValue::scalar(18), &mut target)
            .unwrap();
        assert!(handled);
        assert_eq!(
            builder.calls,
            vec![Call::Where(
                "users.age".to_string(),
                ComparisonOperator::GreaterThanOrEqualTo,
                Scalar::Int(18)
            )]
        );
    }

    #[test]
    fn fields_differing_in_case_share_a_rule() {
        let mut rules = CustomRules::new(DEFAULT_RULE_PREFIX);
        assert!(rules.is_empty());
        rules.insert_for_field("min_age", Arc::new(at_least));
        assert_eq!(rules.len(), 1);

        let mut builder = RecordingBuilder::default();
        let mut target = QueryTarget::resolve(&mut builder).unwrap();
        for (field, value) in [("min_age", 18), ("minAge", 99)] {
            assert!(rules
                .try_dispatch(field, &ParameterValue::scalar(value), &mut target)
                .unwrap());
        }
        assert_eq!(
            builder.calls,
            vec![
                Call::Where(
                    "users.age".to_string(),
                    ComparisonOperator::GreaterThanOrEqualTo,
                    Scalar::Int(18)
                ),
                Call::Where(
                    "users.age".to_string(),
                    ComparisonOperator::GreaterThanOrEqualTo,
                    Scalar::Int(99)
                ),
            ]
        );
    }

    #[test]
    fn unknown_fields_are_not_handled_and_leave_the_target_alone() {
        let mut rules = CustomRules::new(DEFAULT_RULE_PREFIX);
        rules.insert("criteriaMinAge", Arc::new(at_least));

        let mut builder = RecordingBuilder::default();
        let mut target = QueryTarget::resolve(&mut builder).unwrap();
        let handled = rules
            .try_dispatch("status", &ParameterValue::scalar(1), &mut target)
            .unwrap();
        assert!(!handled);
        assert!(builder.calls.is_empty());
    }
}
