use crate::annotation::{Annotation, AnnotationData, AnnotationId, AnnotationPatch};
use crate::editing::Document;
use crate::error::{DocumentError, Result};
use crate::join::{Changeset, Join};
use crate::query::{MapResult, Mapping, Query, Rename};
use crate::value::{remove_path, rename_keys, split_path};

/// An ordered, optionally aliased view over some of a document's
/// annotations.
///
/// A collection holds identities only. Every operation takes the document
/// it was selected from and writes its results back there; identities that
/// have since left the document are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    ids: Vec<AnnotationId>,
    name: Option<String>,
}

impl Collection {
    pub fn new(ids: Vec<AnnotationId>) -> Self {
        Self { ids, name: None }
    }

    pub(crate) fn from_query(doc: &Document, query: &Query) -> Self {
        let ids = doc
            .annotations()
            .iter()
            .filter(|a| query.matches(a))
            .map(Annotation::id)
            .collect();
        Self::new(ids)
    }

    /// Names the collection so it can take part in a join.
    #[must_use]
    pub fn alias(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn ids(&self) -> &[AnnotationId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Current values of the members, in collection order.
    pub fn annotations<'d>(&self, doc: &'d Document) -> Vec<&'d Annotation> {
        self.ids.iter().filter_map(|id| doc.annotation(*id)).collect()
    }

    pub fn to_data(&self, doc: &Document) -> Vec<AnnotationData> {
        self.annotations(doc)
            .into_iter()
            .map(Annotation::to_data)
            .collect()
    }

    // ============ Field edits ============

    /// Overwrites top-level fields present in `patch` and deep-merges its
    /// attributes. Every member is validated before any is written.
    pub fn set(&mut self, doc: &mut Document, patch: &AnnotationPatch) -> Result<&mut Self> {
        self.prune(doc);
        let updates = self
            .annotations(doc)
            .into_iter()
            .map(|a| -> Result<_> { Ok((a.id(), doc.admit(patch.apply_to(a))?)) })
            .collect::<Result<Vec<_>>>()?;

        for (id, data) in updates {
            if let Some(annotation) = doc.annotation_mut(id) {
                annotation.overwrite(data);
            }
        }
        Ok(self)
    }

    /// Deletes the key at a dot path such as `"attributes.type"` from every
    /// member. Absent paths are ignored; `"attributes"` clears all
    /// attributes.
    pub fn unset(&mut self, doc: &mut Document, path: &str) -> Result<&mut Self> {
        let segments = split_path(path)?;
        match segments[0] {
            "type" | "start" | "end" => {
                return Err(DocumentError::InvalidPath(format!(
                    "'{path}' names a required field and cannot be unset"
                )));
            }
            "attributes" => {}
            _ => return Ok(self),
        }

        self.prune(doc);
        for id in &self.ids {
            let Some(annotation) = doc.annotation_mut(*id) else {
                continue;
            };
            if segments.len() == 1 {
                annotation.attributes = None;
            } else if let Some(attributes) = annotation.attributes.as_mut() {
                remove_path(attributes, &segments[1..]);
            }
        }
        Ok(self)
    }

    /// Moves attribute values to new key names, keeping identities.
    pub fn rename(&mut self, doc: &mut Document, rename: &Rename) -> Result<&mut Self> {
        let renames = rename.resolve()?;
        self.prune(doc);
        for id in &self.ids {
            if let Some(attributes) = doc
                .annotation_mut(*id)
                .and_then(|a| a.attributes.as_mut())
            {
                rename_keys(attributes, &renames);
            }
        }
        Ok(self)
    }

    // ============ Replacement ============

    /// Retypes and renames every member, replacing each with a new
    /// annotation in its slot.
    pub fn map(&mut self, doc: &mut Document, mapping: &Mapping) -> Result<&mut Self> {
        let compiled = mapping.compile()?;
        self.replace_each::<_, DocumentError>(doc, |annotation| {
            Ok(vec![compiled.apply(annotation)])
        })?;
        Ok(self)
    }

    /// Replaces every member by whatever `f` returns for it: nothing, one
    /// annotation or several, spliced into the member's slot in order.
    /// `f` supplies every output field; nothing is inherited.
    pub fn map_with<F>(&mut self, doc: &mut Document, mut f: F) -> Result<&mut Self>
    where
        F: FnMut(&Annotation) -> MapResult,
    {
        self.replace_each::<_, DocumentError>(doc, |annotation| Ok(f(annotation).into_vec()))?;
        Ok(self)
    }

    /// Fallible `map_with`. The callback's error is returned unchanged and
    /// leaves the document untouched.
    pub fn try_map_with<F, E>(
        &mut self,
        doc: &mut Document,
        mut f: F,
    ) -> std::result::Result<&mut Self, E>
    where
        F: FnMut(&Annotation) -> std::result::Result<MapResult, E>,
        E: From<DocumentError>,
    {
        self.replace_each(doc, |annotation| f(annotation).map(MapResult::into_vec))?;
        Ok(self)
    }

    /// Computes and validates every replacement batch first, then splices
    /// them in. The collection ends up holding the new identities.
    fn replace_each<F, E>(&mut self, doc: &mut Document, mut f: F) -> std::result::Result<(), E>
    where
        F: FnMut(&Annotation) -> std::result::Result<Vec<AnnotationData>, E>,
        E: From<DocumentError>,
    {
        self.prune(doc);
        let mut batches = Vec::with_capacity(self.ids.len());
        for annotation in self.annotations(doc) {
            let outputs = f(annotation)?
                .into_iter()
                .map(|data| doc.admit(data))
                .collect::<Result<Vec<_>>>()?;
            batches.push((annotation.id(), outputs));
        }

        let mut ids = Vec::new();
        for (id, outputs) in batches {
            if let Some(index) = doc.position(id) {
                ids.extend(doc.splice_at(index, outputs));
            }
        }
        log::debug!("replaced {} annotation(s) with {}", self.ids.len(), ids.len());
        self.ids = ids;
        Ok(())
    }

    /// Deletes every member from the document and empties the collection.
    pub fn remove(&mut self, doc: &mut Document) -> &mut Self {
        for id in self.ids.drain(..) {
            if doc.remove_annotation(id).is_err() {
                log::debug!("annotation {id} already gone from document");
            }
        }
        self
    }

    // ============ Joins ============

    /// Joins `other` onto this collection. This collection drives: the join
    /// holds exactly one record per member, and each record gathers the
    /// members of `other` for which `predicate(primary, candidate)` holds.
    pub fn join<F>(&self, doc: &Document, other: &Collection, predicate: F) -> Result<Join>
    where
        F: Fn(&Annotation, &Annotation) -> bool,
    {
        Join::first(doc, self, other, predicate)
    }

    /// Applies a transform's changeset to this view: updated identities are
    /// swapped in place, removed ones dropped, and anything no longer in
    /// the document pruned.
    pub fn reconcile(&mut self, doc: &Document, changeset: &Changeset) {
        changeset.apply_to_ids(&mut self.ids);
        self.prune(doc);
    }

    fn prune(&mut self, doc: &Document) {
        let before = self.ids.len();
        self.ids.retain(|id| doc.contains(*id));
        if self.ids.len() != before {
            log::debug!(
                "dropped {} stale identities from collection {:?}",
                before - self.ids.len(),
                self.name
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::DocumentData;
    use pretty_assertions::assert_eq;

    fn doc(content: &str, annotations: Vec<AnnotationData>) -> Document {
        Document::new(DocumentData::new(content, annotations)).unwrap()
    }

    #[test]
    fn test_set_validates_before_writing() {
        let mut doc = doc(
            "Hello",
            vec![
                AnnotationData::new("bold", 0, 2),
                AnnotationData::new("bold", 3, 5),
            ],
        );
        let patch = AnnotationPatch::new().range(2, 9);

        let result = doc.select(&Query::of_type("bold")).set(&mut doc, &patch).map(|_| ());

        assert!(matches!(result, Err(DocumentError::InvalidRange { .. })));
        assert_eq!(doc.annotations()[0].range(), 0..2);
    }

    #[test]
    fn test_set_keeps_identity() {
        let mut doc = doc("Hello", vec![AnnotationData::new("strong", 0, 5)]);
        let id = doc.annotations()[0].id();

        doc.select(&Query::of_type("strong"))
            .set(&mut doc, &AnnotationPatch::new().kind("bold"))
            .unwrap();

        assert_eq!(doc.annotations()[0].id(), id);
        assert_eq!(doc.annotations()[0].kind, "bold");
    }

    #[test]
    fn test_unset_required_field_fails() {
        let mut doc = doc("Hello", vec![AnnotationData::new("bold", 0, 5)]);

        let result = doc.select(&Query::all()).unset(&mut doc, "type").map(|_| ());

        assert!(matches!(result, Err(DocumentError::InvalidPath(_))));
    }

    #[test]
    fn test_unset_whole_attributes() {
        let mut doc = doc(
            "Hello",
            vec![AnnotationData::new("a", 0, 5).with_attribute("href", "x")],
        );

        doc.select(&Query::all()).unset(&mut doc, "attributes").unwrap();

        assert_eq!(doc.annotations()[0].attributes, None);
    }

    #[test]
    fn test_unset_unknown_root_is_noop() {
        let mut doc = doc(
            "Hello",
            vec![AnnotationData::new("a", 0, 5).with_attribute("href", "x")],
        );
        let before = doc.to_data();

        doc.select(&Query::all()).unset(&mut doc, "meta.href").unwrap();

        assert_eq!(doc.to_data(), before);
    }

    #[test]
    fn test_map_with_none_removes() {
        let mut doc = doc(
            "Hello",
            vec![
                AnnotationData::new("tmp", 0, 1),
                AnnotationData::new("bold", 0, 5),
            ],
        );

        let mut tmp = doc.select(&Query::of_type("tmp"));
        tmp.map_with(&mut doc, |_| MapResult::none()).unwrap();

        assert!(tmp.is_empty());
        assert_eq!(doc.to_data().annotations, vec![AnnotationData::new("bold", 0, 5)]);
    }

    #[test]
    fn test_try_map_with_propagates_caller_error_untouched() {
        #[derive(Debug, PartialEq)]
        enum CallerError {
            Refused,
            Document(DocumentError),
        }
        impl From<DocumentError> for CallerError {
            fn from(e: DocumentError) -> Self {
                CallerError::Document(e)
            }
        }

        let mut doc = doc(
            "Hello",
            vec![
                AnnotationData::new("a", 0, 1),
                AnnotationData::new("a", 1, 2),
            ],
        );
        let before = doc.to_data();
        let mut seen = 0;

        let result = doc
            .select(&Query::of_type("a"))
            .try_map_with(&mut doc, |a| {
                seen += 1;
                if a.start == 1 {
                    Err(CallerError::Refused)
                } else {
                    Ok(MapResult::One(AnnotationData::new("b", a.start, a.end)))
                }
            })
            .map(|_| ());

        assert_eq!(result, Err(CallerError::Refused));
        assert_eq!(seen, 2);
        assert_eq!(doc.to_data(), before);
    }

    #[test]
    fn test_map_output_past_content_is_rejected() {
        let mut doc = doc("Hello", vec![AnnotationData::new("a", 0, 5)]);

        let result = doc
            .select(&Query::of_type("a"))
            .map_with(&mut doc, |a| MapResult::One(AnnotationData::new("b", a.start, 50)))
            .map(|_| ());

        assert!(matches!(result, Err(DocumentError::InvalidRange { .. })));
    }

    #[test]
    fn test_stale_identities_are_skipped() {
        let mut doc = doc(
            "Hello",
            vec![
                AnnotationData::new("em", 0, 1),
                AnnotationData::new("em", 1, 2),
            ],
        );
        let mut ems = doc.select(&Query::of_type("em"));
        doc.remove_annotation(ems.ids()[0]).unwrap();

        ems.set(&mut doc, &AnnotationPatch::new().kind("italic")).unwrap();

        assert_eq!(ems.len(), 1);
        assert_eq!(doc.annotations()[0].kind, "italic");
    }

    #[test]
    fn test_reconcile_swaps_and_drops() {
        let mut doc = doc(
            "Hello",
            vec![
                AnnotationData::new("a", 0, 1),
                AnnotationData::new("a", 1, 2),
                AnnotationData::new("a", 2, 3),
            ],
        );
        let mut all = doc.select(&Query::of_type("a"));
        let [first, second, third] = [all.ids()[0], all.ids()[1], all.ids()[2]];

        let replacement = doc
            .replace_annotation(first, AnnotationData::new("b", 0, 1))
            .unwrap();
        doc.remove_annotation(second).unwrap();
        let changeset = Changeset::new()
            .with_update(first, replacement)
            .with_removal(second);

        all.reconcile(&doc, &changeset);

        assert_eq!(all.ids(), &[replacement, third]);
    }
}
