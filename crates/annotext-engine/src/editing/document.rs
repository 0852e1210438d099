use serde::{Deserialize, Serialize};
use std::fmt;
use xi_rope::Rope;

use crate::annotation::{Annotation, AnnotationData, AnnotationId};
use crate::editing::remap::{Edit, remap_annotations};
use crate::editing::{BoundsPolicy, Cmd, DocumentOptions, Patch, commands};
use crate::error::{DocumentError, Result};
use crate::query::{Collection, Query};

/// Raw `{content, annotations}` as produced by parsers and consumed by
/// hierarchy builders and renderers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentData {
    pub content: String,
    #[serde(default)]
    pub annotations: Vec<AnnotationData>,
}

impl DocumentData {
    pub fn new(content: impl Into<String>, annotations: Vec<AnnotationData>) -> Self {
        Self {
            content: content.into(),
            annotations,
        }
    }

    /// Parses the JSON construction contract. Input that does not have the
    /// `{content, annotations: [{type, start, end, attributes?}]}` shape,
    /// such as an annotation without `type`, is a `MalformedAnnotation`.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| DocumentError::malformed(e.to_string()))
    }
}

/// Text content plus an ordered list of annotations over it.
///
/// The document is the single source of truth for positions:
///
/// - **Buffer**: content lives in one `xi_rope::Rope`; all public offsets are
///   Unicode scalar offsets and are converted to bytes internally.
/// - **Edits**: `insert_text` / `delete_text` compile to a `Delta`, apply it
///   to the buffer, then remap every annotation boundary before returning, so
///   `0 <= start <= end <= len()` holds after every call.
/// - **Identity**: annotations are addressed by [`AnnotationId`]. Removal and
///   replacement match by identity, never by value.
///
/// ```rust
/// # use annotext_engine::{AnnotationData, Document, DocumentData};
/// let mut doc = Document::new(DocumentData::new(
///     "function () {}",
///     vec![AnnotationData::new("code", 0, 14)],
/// ))
/// .unwrap();
///
/// doc.insert_text(0, "Hello!\n");
/// assert_eq!(doc.annotations()[0].range(), 7..21);
///
/// doc.delete_text(2..4);
/// assert_eq!(doc.annotations()[0].range(), 5..19);
/// ```
#[derive(Clone)]
pub struct Document {
    pub(crate) buffer: Rope,
    /// Length of `buffer` in scalars
    pub(crate) char_len: usize,
    pub(crate) annotations: Vec<Annotation>,
    /// Incremented on every text edit that changes the content
    pub(crate) version: u64,
    pub(crate) options: DocumentOptions,
}

impl Document {
    pub fn new(data: DocumentData) -> Result<Self> {
        Self::with_options(data, DocumentOptions::default())
    }

    pub fn with_options(data: DocumentData, options: DocumentOptions) -> Result<Self> {
        let mut doc = Self {
            char_len: data.content.chars().count(),
            buffer: Rope::from(data.content.as_str()),
            annotations: Vec::new(),
            version: 0,
            options,
        };
        doc.add_annotations(data.annotations)?;
        Ok(doc)
    }

    /// Builds a document from JSON; see [`DocumentData::from_json`].
    pub fn from_json(json: &str) -> Result<Self> {
        Self::new(DocumentData::from_json(json)?)
    }

    /// A document without annotations.
    pub fn from_text(content: &str) -> Self {
        Self {
            buffer: Rope::from(content),
            char_len: content.chars().count(),
            annotations: Vec::new(),
            version: 0,
            options: DocumentOptions::default(),
        }
    }

    pub fn options(&self) -> &DocumentOptions {
        &self.options
    }

    // ============ Read contract ============

    pub fn content(&self) -> String {
        self.buffer.to_string()
    }

    /// Length of the content in Unicode scalars.
    pub fn len(&self) -> usize {
        self.char_len
    }

    pub fn is_empty(&self) -> bool {
        self.char_len == 0
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn annotation(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id() == id)
    }

    pub fn contains(&self, id: AnnotationId) -> bool {
        self.position(id).is_some()
    }

    /// Text of a scalar range, clamped to the content.
    pub fn slice(&self, range: std::ops::Range<usize>) -> String {
        let end = range.end.min(self.char_len);
        let start = range.start.min(end);
        self.buffer
            .slice_to_cow(self.byte_offset(start)..self.byte_offset(end))
            .into_owned()
    }

    /// Text covered by an annotation.
    pub fn text_of(&self, id: AnnotationId) -> Option<String> {
        self.annotation(id).map(|a| self.slice(a.range()))
    }

    /// Identity-free snapshot of content and annotations, in order.
    pub fn to_data(&self) -> DocumentData {
        DocumentData {
            content: self.content(),
            annotations: self.annotations.iter().map(Annotation::to_data).collect(),
        }
    }

    /// Filters annotations into a [`Collection`].
    pub fn select(&self, query: &Query) -> Collection {
        Collection::from_query(self, query)
    }

    // ============ Annotation lifecycle ============

    /// Appends annotations in order. Nothing is added if any entry is
    /// rejected.
    pub fn add_annotations<I>(&mut self, annotations: I) -> Result<Vec<AnnotationId>>
    where
        I: IntoIterator<Item = AnnotationData>,
    {
        let admitted = annotations
            .into_iter()
            .map(|data| self.admit(data))
            .collect::<Result<Vec<_>>>()?;

        let ids = admitted
            .into_iter()
            .map(|data| {
                let annotation = Annotation::from_data(data);
                let id = annotation.id();
                self.annotations.push(annotation);
                id
            })
            .collect::<Vec<_>>();
        log::debug!("added {} annotation(s)", ids.len());
        Ok(ids)
    }

    pub fn remove_annotation(&mut self, id: AnnotationId) -> Result<Annotation> {
        let index = self
            .position(id)
            .ok_or(DocumentError::AnnotationNotFound(id))?;
        log::debug!("removing annotation {id}");
        Ok(self.annotations.remove(index))
    }

    /// Swaps `old` for a new annotation in the same slot and returns the new
    /// identity. `old`'s identity is retired.
    pub fn replace_annotation(
        &mut self,
        old: AnnotationId,
        new: AnnotationData,
    ) -> Result<AnnotationId> {
        let index = self
            .position(old)
            .ok_or(DocumentError::AnnotationNotFound(old))?;
        let annotation = Annotation::from_data(self.admit(new)?);
        let id = annotation.id();
        self.annotations[index] = annotation;
        log::debug!("replaced annotation {old} with {id}");
        Ok(id)
    }

    // ============ Text edits ============

    /// Inserts `text` at scalar offset `at` (clamped to the end). Every
    /// boundary at or after `at` moves past the inserted text.
    pub fn insert_text(&mut self, at: usize, text: &str) -> Patch {
        self.apply(Cmd::InsertText {
            at,
            text: text.to_string(),
        })
    }

    /// Deletes the scalar range (clamped to the content). Boundaries inside
    /// the range collapse to its start.
    pub fn delete_text(&mut self, range: std::ops::Range<usize>) -> Patch {
        self.apply(Cmd::DeleteRange { range })
    }

    /// Applies a text command: compile to a delta, apply it to the buffer,
    /// remap annotation boundaries, bump the version.
    pub fn apply(&mut self, cmd: Cmd) -> Patch {
        let Some(edit) = commands::normalize_command(self, &cmd) else {
            return Patch {
                changed: Vec::new(),
                version: self.version,
            };
        };

        let inserted = match &cmd {
            Cmd::InsertText { text, .. } => text.as_str(),
            Cmd::DeleteRange { .. } => "",
        };
        let delta = commands::compile_command(self, edit, inserted);
        self.buffer = delta.apply(&self.buffer);

        let changed = match edit {
            Edit::Insert { at, len } => {
                self.char_len += len;
                at..at + len
            }
            Edit::Delete { start, end } => {
                self.char_len -= end - start;
                start..start
            }
        };
        remap_annotations(&mut self.annotations, edit);
        self.version += 1;
        log::debug!("applied {edit:?} (version {})", self.version);

        Patch {
            changed: vec![changed],
            version: self.version,
        }
    }

    // ============ Internals shared with collections ============

    pub(crate) fn position(&self, id: AnnotationId) -> Option<usize> {
        self.annotations.iter().position(|a| a.id() == id)
    }

    pub(crate) fn annotation_mut(&mut self, id: AnnotationId) -> Option<&mut Annotation> {
        self.annotations.iter_mut().find(|a| a.id() == id)
    }

    /// Replaces the annotation at `index` with `replacements`, in order.
    /// Returns the identities of the inserted annotations.
    pub(crate) fn splice_at(
        &mut self,
        index: usize,
        replacements: Vec<AnnotationData>,
    ) -> Vec<AnnotationId> {
        let inserted: Vec<Annotation> =
            replacements.into_iter().map(Annotation::from_data).collect();
        let ids = inserted.iter().map(Annotation::id).collect();
        self.annotations.splice(index..=index, inserted);
        ids
    }

    /// Validates incoming annotation data against shape and content bounds.
    pub(crate) fn admit(&self, mut data: AnnotationData) -> Result<AnnotationData> {
        data.validate_shape()?;
        if data.end > self.char_len {
            match self.options.bounds {
                BoundsPolicy::Reject => {
                    return Err(DocumentError::InvalidRange {
                        start: data.start,
                        end: data.end,
                        len: self.char_len,
                    });
                }
                BoundsPolicy::Clamp => {
                    log::debug!(
                        "clamping '{}' {}..{} to content length {}",
                        data.kind,
                        data.start,
                        data.end,
                        self.char_len
                    );
                    data.start = data.start.min(self.char_len);
                    data.end = self.char_len;
                }
            }
        }
        Ok(data)
    }

    /// Converts a scalar offset into a byte offset in the buffer.
    pub(crate) fn byte_offset(&self, offset: usize) -> usize {
        if offset >= self.char_len {
            return self.buffer.len();
        }
        let mut remaining = offset;
        let mut bytes = 0;
        for chunk in self.buffer.iter_chunks(0..self.buffer.len()) {
            let chars = chunk.chars().count();
            if remaining < chars {
                return bytes
                    + chunk
                        .char_indices()
                        .nth(remaining)
                        .map_or(chunk.len(), |(index, _)| index);
            }
            remaining -= chars;
            bytes += chunk.len();
        }
        bytes
    }
}

impl TryFrom<DocumentData> for Document {
    type Error = DocumentError;

    fn try_from(data: DocumentData) -> Result<Self> {
        Document::new(data)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("content", &self.buffer.to_string())
            .field("annotations", &self.annotations)
            .field("version", &self.version)
            .finish()
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        // Value comparison: identities and version are not part of equality
        self.to_data() == other.to_data()
    }
}
