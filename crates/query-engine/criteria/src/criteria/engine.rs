//! Apply declared criteria to a query builder.
//!
//! For every sanitized parameter, in the order the parameters were supplied:
//! a custom rule wins if one is registered for the field, otherwise a declared
//! field gets its generic predicate, otherwise the parameter is ignored.

use std::sync::Arc;

use super::error::{CoercionWarning, ConfigurationError};
use super::parameters::{ParameterBag, ParameterValue};
use super::predicate;
use super::rules::{self, CustomRules, RuleHandler, DEFAULT_RULE_PREFIX};
use super::sanitize::{FilteredParameterBag, Sanitizer};
use super::spec::{CriteriaSpec, Operator};
use super::target::{QueryBuilder, QueryTarget};

/// How a single parameter was turned into predicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Handled by the named custom rule.
    Custom(String),
    /// Handled by the generic rule of a declared field.
    Generic(Operator),
    /// Neither declared nor covered by a custom rule.
    Ignored,
}

/// What applying criteria did, per sanitized parameter, in application order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppliedCriteria {
    pub fields: Vec<(String, Resolution)>,
    pub warnings: Vec<CoercionWarning>,
}

impl AppliedCriteria {
    pub fn resolution(&self, field: &str) -> Option<&Resolution> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, resolution)| resolution)
    }
}

/// Everything that describes one kind of criteria: declared fields, custom
/// rules and the sanitization policy.
///
/// Immutable once built and safe to share between threads.
pub struct CriteriaDefinition<B: QueryBuilder> {
    spec: CriteriaSpec,
    rules: CustomRules<B>,
    sanitizer: Sanitizer,
}

impl<B: QueryBuilder> CriteriaDefinition<B> {
    pub fn builder(spec: CriteriaSpec) -> CriteriaDefinitionBuilder<B> {
        CriteriaDefinitionBuilder {
            spec,
            prefix: DEFAULT_RULE_PREFIX.to_string(),
            field_rules: Vec::new(),
            named_rules: Vec::new(),
            sanitizer: Sanitizer::default(),
        }
    }

    pub fn spec(&self) -> &CriteriaSpec {
        &self.spec
    }

    pub fn rules(&self) -> &CustomRules<B> {
        &self.rules
    }

    pub fn sanitize(&self, parameters: &ParameterBag) -> FilteredParameterBag {
        self.sanitizer.sanitize(parameters)
    }

    /// Apply `parameters` to `builder`.
    ///
    /// The builder's table name is resolved once. Errors from the builder or
    /// from a custom rule stop the application and are returned as they are.
    pub fn apply(
        &self,
        parameters: &ParameterBag,
        builder: &mut B,
    ) -> Result<AppliedCriteria, B::Error> {
        let filtered = self.sanitize(parameters);
        let mut target = QueryTarget::resolve(builder)?;

        let span = tracing::debug_span!("apply_criteria", table = %target.table());
        let _enter = span.enter();

        let mut applied = AppliedCriteria::default();
        for (field, value) in filtered.iter() {
            let resolution = self.apply_field(field, value, &mut target, &mut applied)?;
            tracing::debug!(field, ?resolution, "resolved parameter");
            applied.fields.push((field.to_string(), resolution));
        }
        Ok(applied)
    }

    fn apply_field(
        &self,
        field: &str,
        value: &ParameterValue,
        target: &mut QueryTarget<'_, B>,
        applied: &mut AppliedCriteria,
    ) -> Result<Resolution, B::Error> {
        if self.rules.try_dispatch(field, value, target)? {
            return Ok(Resolution::Custom(rules::rule_name(
                self.rules.prefix(),
                field,
            )));
        }
        match self.spec.operator(field) {
            Some(operator) => {
                if let Some(warning) = predicate::apply_generic(operator, field, value, target)? {
                    applied.warnings.push(warning);
                }
                Ok(Resolution::Generic(operator))
            }
            None => Ok(Resolution::Ignored),
        }
    }
}

impl<B: QueryBuilder> Clone for CriteriaDefinition<B> {
    fn clone(&self) -> Self {
        CriteriaDefinition {
            spec: self.spec.clone(),
            rules: self.rules.clone(),
            sanitizer: self.sanitizer.clone(),
        }
    }
}

impl<B: QueryBuilder> std::fmt::Debug for CriteriaDefinition<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CriteriaDefinition")
            .field("spec", &self.spec)
            .field("rules", &self.rules)
            .field("sanitizer", &self.sanitizer)
            .finish()
    }
}

/// Collects custom rules and options for a [`CriteriaDefinition`].
pub struct CriteriaDefinitionBuilder<B: QueryBuilder> {
    spec: CriteriaSpec,
    prefix: String,
    field_rules: Vec<(String, Arc<RuleHandler<B>>)>,
    named_rules: Vec<(String, Arc<RuleHandler<B>>)>,
    sanitizer: Sanitizer,
}

impl<B: QueryBuilder> CriteriaDefinitionBuilder<B> {
    /// The prefix rule names are derived with. Defaults to `criteria`.
    #[must_use]
    pub fn rule_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Register a custom rule for `field`.
    #[must_use]
    pub fn rule<F>(mut self, field: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut QueryTarget<'_, B>, &ParameterValue) -> Result<(), B::Error>
            + Send
            + Sync
            + 'static,
    {
        self.field_rules.push((field.into(), Arc::new(handler)));
        self
    }

    /// Register a custom rule under its full name, e.g. `criteriaMinAge`.
    #[must_use]
    pub fn named_rule<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut QueryTarget<'_, B>, &ParameterValue) -> Result<(), B::Error>
            + Send
            + Sync
            + 'static,
    {
        self.named_rules.push((name.into(), Arc::new(handler)));
        self
    }

    /// Replace the sanitization predicate.
    #[must_use]
    pub fn sanitizer(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    /// Fails when a field declared as custom-only has no rule.
    pub fn build(self) -> Result<CriteriaDefinition<B>, ConfigurationError> {
        let mut rules = CustomRules::new(self.prefix);
        for (name, handler) in self.named_rules {
            rules.insert(name, handler);
        }
        for (field, handler) in self.field_rules {
            rules.insert_for_field(&field, handler);
        }

        for (field, operator) in self.spec.fields() {
            if operator == Operator::CustomOnly && rules.rule_for(field).is_none() {
                return Err(ConfigurationError::MissingCustomRule {
                    field: field.to_string(),
                    rule: rules::rule_name(rules.prefix(), field),
                });
            }
        }

        Ok(CriteriaDefinition {
            spec: self.spec,
            rules,
            sanitizer: self.sanitizer,
        })
    }
}

/// One request's criteria: a definition and the parameters it was given.
#[derive(Debug)]
pub struct Criteria<B: QueryBuilder> {
    definition: Arc<CriteriaDefinition<B>>,
    parameters: ParameterBag,
}

impl<B: QueryBuilder> Criteria<B> {
    pub fn new(definition: Arc<CriteriaDefinition<B>>, parameters: ParameterBag) -> Self {
        Criteria {
            definition,
            parameters,
        }
    }

    /// The parameters exactly as they were supplied.
    pub fn original(&self) -> &ParameterBag {
        &self.parameters
    }

    pub fn filtered(&self) -> FilteredParameterBag {
        self.definition.sanitize(&self.parameters)
    }

    pub fn apply(&self, builder: &mut B) -> Result<AppliedCriteria, B::Error> {
        self.definition.apply(&self.parameters, builder)
    }
}
