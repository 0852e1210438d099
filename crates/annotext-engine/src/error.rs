use crate::annotation::AnnotationId;

/// Errors raised by document, collection and join operations.
///
/// Text edits never produce an error: out-of-range positions are clamped.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DocumentError {
    #[error("Malformed annotation: {reason}")]
    MalformedAnnotation { reason: String },

    #[error("Annotation not found: {0}")]
    AnnotationNotFound(AnnotationId),

    #[error("Invalid range {start}..{end} for content of length {len}")]
    InvalidRange { start: usize, end: usize, len: usize },

    /// Reported (never returned) when a changeset names an identity that no
    /// view currently holds.
    #[error("Changeset references unknown annotation: {0}")]
    UnresolvedJoinReference(AnnotationId),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Collection must be aliased before it can be joined")]
    UnaliasedCollection,

    #[error("Alias already used in this join: {0}")]
    DuplicateAlias(String),
}

impl DocumentError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        DocumentError::MalformedAnnotation {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DocumentError>;
