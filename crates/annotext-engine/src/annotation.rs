use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{DocumentError, Result};
use crate::value::{Attributes, Value, deep_merge};

/// Stand-in character for an embedded non-text node (image, embed).
/// It occupies exactly one offset of content.
pub const OBJECT_REPLACEMENT: char = '\u{FFFC}';

/// Stable identity of an annotation, independent of its field values.
///
/// Identities are minted by the [`Document`](crate::Document) and never
/// reused; replacing an annotation retires the old identity.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct AnnotationId(pub u128);

impl AnnotationId {
    pub(crate) fn generate() -> Self {
        AnnotationId(uuid::Uuid::new_v4().as_u128())
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// An annotation without identity, as emitted by parsers and returned from
/// `map` callbacks. This is the construction and export contract.
///
/// Deserializing this directly reports missing fields as serde errors; go
/// through [`Document::from_json`](crate::Document::from_json) to get them
/// as [`DocumentError::MalformedAnnotation`](crate::DocumentError).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationData {
    #[serde(rename = "type")]
    pub kind: String,
    pub start: usize,
    pub end: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
}

impl AnnotationData {
    pub fn new(kind: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            kind: kind.into(),
            start,
            end,
            attributes: None,
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes
            .get_or_insert_with(Attributes::new)
            .insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    /// Checks shape only; bounds against content are checked by the document.
    pub(crate) fn validate_shape(&self) -> Result<()> {
        if self.kind.is_empty() {
            return Err(DocumentError::malformed("annotation type must not be empty"));
        }
        if self.start > self.end {
            return Err(DocumentError::malformed(format!(
                "start {} is after end {} for '{}'",
                self.start, self.end, self.kind
            )));
        }
        Ok(())
    }
}

/// An annotation held by a document: a typed half-open range `[start, end)`
/// with optional nested attributes and a persistent identity.
///
/// `start == end` is a point annotation marking a position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    #[serde(skip)]
    id: AnnotationId,
    #[serde(rename = "type")]
    pub kind: String,
    pub start: usize,
    pub end: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
}

impl Annotation {
    pub(crate) fn from_data(data: AnnotationData) -> Self {
        Self {
            id: AnnotationId::generate(),
            kind: data.kind,
            start: data.start,
            end: data.end,
            attributes: data.attributes,
        }
    }

    pub fn id(&self) -> AnnotationId {
        self.id
    }

    /// Overwrites every field value, keeping the identity.
    pub(crate) fn overwrite(&mut self, data: AnnotationData) {
        self.kind = data.kind;
        self.start = data.start;
        self.end = data.end;
        self.attributes = data.attributes;
    }

    pub fn is_point(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.is_point()
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }

    /// Looks up an attribute by dot-delimited path relative to `attributes`,
    /// e.g. `"link.href"`.
    pub fn attribute(&self, path: &str) -> Option<&Value> {
        let segments: Vec<&str> = path.split('.').collect();
        crate::value::get_path(self.attributes.as_ref()?, &segments)
    }

    /// Identity-free copy of the field values.
    pub fn to_data(&self) -> AnnotationData {
        AnnotationData::from(self)
    }
}

impl From<&Annotation> for AnnotationData {
    fn from(annotation: &Annotation) -> Self {
        Self {
            kind: annotation.kind.clone(),
            start: annotation.start,
            end: annotation.end,
            attributes: annotation.attributes.clone(),
        }
    }
}

/// Field overwrites applied by [`Collection::set`](crate::Collection::set).
///
/// Top-level fields present in the patch replace the annotation's; the
/// patch's attributes are deep-merged into the existing ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationPatch {
    pub kind: Option<String>,
    pub start: Option<usize>,
    pub end: Option<usize>,
    pub attributes: Option<Attributes>,
}

impl AnnotationPatch {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    #[must_use]
    pub fn range(mut self, start: usize, end: usize) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
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

    /// Produces the patched field values without touching `annotation`.
    pub(crate) fn apply_to(&self, annotation: &Annotation) -> AnnotationData {
        let mut data = annotation.to_data();
        if let Some(kind) = &self.kind {
            data.kind = kind.clone();
        }
        if let Some(start) = self.start {
            data.start = start;
        }
        if let Some(end) = self.end {
            data.end = end;
        }
        if let Some(patch) = &self.attributes {
            deep_merge(data.attributes.get_or_insert_with(Attributes::new), patch);
        }
        data
    }
}
