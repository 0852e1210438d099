//! Boundary remapping for text edits.
//!
//! Start and end are mapped independently through the same rule. Text
//! inserted where one annotation ends and the next starts is covered by the
//! first and pushes the second along. An annotation covered by a deletion
//! collapses to a point rather than disappearing.

use crate::annotation::Annotation;

/// A normalised edit in scalar offsets of the content before the edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Edit {
    Insert { at: usize, len: usize },
    Delete { start: usize, end: usize },
}

/// Boundaries at or after the insertion point move past the inserted text.
pub(crate) fn map_through_insert(boundary: usize, at: usize, len: usize) -> usize {
    if boundary >= at { boundary + len } else { boundary }
}

/// Boundaries inside the deleted span collapse to its start.
pub(crate) fn map_through_delete(boundary: usize, start: usize, end: usize) -> usize {
    if boundary <= start {
        boundary
    } else if boundary >= end {
        boundary - (end - start)
    } else {
        start
    }
}

pub(crate) fn map_boundary(boundary: usize, edit: Edit) -> usize {
    match edit {
        Edit::Insert { at, len } => map_through_insert(boundary, at, len),
        Edit::Delete { start, end } => map_through_delete(boundary, start, end),
    }
}

/// Maps every annotation's range through `edit`.
pub(crate) fn remap_annotations(annotations: &mut [Annotation], edit: Edit) {
    for annotation in annotations.iter_mut() {
        let start = map_boundary(annotation.start, edit);
        let end = map_boundary(annotation.end, edit);
        if (start, end) != (annotation.start, annotation.end) {
            log::trace!(
                "{} '{}' {}..{} -> {}..{}",
                annotation.id(),
                annotation.kind,
                annotation.start,
                annotation.end,
                start,
                end
            );
        }
        debug_assert!(start <= end, "remap inverted a range");
        annotation.start = start;
        annotation.end = end;
    }
}
