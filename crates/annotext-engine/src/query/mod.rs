//! Filtering annotations into collections and restructuring them in bulk.

pub mod collection;
pub mod mapping;

pub use collection::Collection;
pub use mapping::{MapResult, Mapping, Rename};

use crate::annotation::Annotation;
use crate::value::{Attributes, Value, matches_partial};

/// Predicate for [`Document::select`](crate::Document::select).
///
/// A query with neither a type nor attributes matches every annotation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub kind: Option<String>,
    /// Partial structure: every key path here must exist on the candidate
    /// with an equal value. Keys the query does not mention are ignored.
    pub attributes: Option<Attributes>,
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn of_type(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            attributes: None,
        }
    }

    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes
            .get_or_insert_with(Attributes::new)
            .insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    pub fn matches(&self, annotation: &Annotation) -> bool {
        if let Some(kind) = &self.kind
            && *kind != annotation.kind
        {
            return false;
        }
        match (&self.attributes, &annotation.attributes) {
            (None, _) => true,
            (Some(pattern), Some(actual)) => matches_partial(pattern, actual),
            (Some(pattern), None) => pattern.is_empty(),
        }
    }
}
