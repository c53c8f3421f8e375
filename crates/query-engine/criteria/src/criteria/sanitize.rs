//! Drop parameter values that cannot produce a predicate.

use std::fmt;
use std::sync::Arc;

use super::parameters::{ParameterBag, ParameterValue};

/// Decides whether a usable `(field, value)` entry is kept.
pub type KeepPredicate = dyn Fn(&str, &ParameterValue) -> bool + Send + Sync;

/// A parameter bag without null, opaque or empty-sequence values.
///
/// Only obtainable through sanitization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredParameterBag(ParameterBag);

impl FilteredParameterBag {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.0.iter()
    }

    pub fn get(&self, field: &str) -> Option<&ParameterValue> {
        self.0.get(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bag(&self) -> &ParameterBag {
        &self.0
    }

    pub fn into_bag(self) -> ParameterBag {
        self.0
    }
}

/// Whether a value can be used as a predicate operand at all.
///
/// Falsy scalars (`0`, `false`, `""`) are usable.
pub fn is_usable(value: &ParameterValue) -> bool {
    match value {
        ParameterValue::Scalar(_) => true,
        ParameterValue::Sequence(values) => !values.is_empty(),
        ParameterValue::Null | ParameterValue::Opaque(_) => false,
    }
}

/// Sanitize with the default policy.
pub fn sanitize(bag: &ParameterBag) -> FilteredParameterBag {
    Sanitizer::default().sanitize(bag)
}

/// The sanitization step, with an optional caller-supplied predicate.
///
/// A custom predicate only sees usable values: nulls, opaque values and empty
/// sequences are dropped regardless.
#[derive(Clone, Default)]
pub struct Sanitizer {
    keep: Option<Arc<KeepPredicate>>,
}

impl Sanitizer {
    pub fn new(keep: impl Fn(&str, &ParameterValue) -> bool + Send + Sync + 'static) -> Self {
        Sanitizer {
            keep: Some(Arc::new(keep)),
        }
    }

    pub fn keeps(&self, field: &str, value: &ParameterValue) -> bool {
        is_usable(value) && self.keep.as_ref().map_or(true, |keep| keep(field, value))
    }

    /// Produce a new bag holding only the kept entries, in their original order.
    /// The input is left untouched.
    pub fn sanitize(&self, bag: &ParameterBag) -> FilteredParameterBag {
        FilteredParameterBag(
            bag.iter()
                .filter(|(field, value)| self.keeps(field, value))
                .map(|(field, value)| (field, value.clone()))
                .collect(),
        )
    }
}

impl fmt::Debug for Sanitizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sanitizer")
            .field("custom", &self.keep.is_some())
            .finish()
    }
}
