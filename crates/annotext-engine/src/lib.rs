//! Text content with positioned, typed annotations over it.
//!
//! A [`Document`] owns the text and an ordered annotation list. Text edits
//! keep every annotation boundary valid; [`Collection`]s select annotations
//! for bulk restructuring; [`Join`]s group annotations across collections
//! and drive per-group transforms that may edit the document.

pub mod annotation;
pub mod editing;
pub mod error;
pub mod join;
pub mod query;
pub mod value;

// Re-export key types for easier usage
pub use annotation::{Annotation, AnnotationData, AnnotationId, AnnotationPatch, OBJECT_REPLACEMENT};
pub use editing::{BoundsPolicy, Cmd, Document, DocumentData, DocumentOptions, Patch};
pub use error::{DocumentError, Result};
pub use join::{Changeset, Join, JoinRecord};
pub use query::{Collection, MapResult, Mapping, Query, Rename};
pub use value::{Attributes, Value};
