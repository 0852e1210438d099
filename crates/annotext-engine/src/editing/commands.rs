use xi_rope::delta::Builder;
use xi_rope::{Delta, Rope, RopeInfo};

use crate::editing::Document;
use crate::editing::remap::Edit;

/// Text edits, in scalar offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    InsertText { at: usize, text: String },
    DeleteRange { range: std::ops::Range<usize> },
}

/// Clamps the command against the current content. Returns `None` when the
/// command would not change anything.
pub(crate) fn normalize_command(doc: &Document, cmd: &Cmd) -> Option<Edit> {
    let len = doc.len();
    match cmd {
        Cmd::InsertText { at, text } => {
            let inserted = text.chars().count();
            (inserted > 0).then(|| Edit::Insert {
                at: (*at).min(len),
                len: inserted,
            })
        }
        Cmd::DeleteRange { range } => {
            let end = range.end.min(len);
            let start = range.start.min(end);
            (start < end).then_some(Edit::Delete { start, end })
        }
    }
}

/// Compiles a normalised edit into a byte-offset delta over the buffer.
/// `inserted` is the text of an insertion and is ignored for deletions.
pub(crate) fn compile_command(doc: &Document, edit: Edit, inserted: &str) -> Delta<RopeInfo> {
    let mut builder = Builder::new(doc.buffer.len());
    match edit {
        Edit::Insert { at, .. } => {
            let at = doc.byte_offset(at);
            builder.replace(at..at, Rope::from(inserted));
        }
        Edit::Delete { start, end } => {
            builder.delete(doc.byte_offset(start)..doc.byte_offset(end));
        }
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_clamps_insert_position() {
        let doc = Document::from_text("abc");
        let cmd = Cmd::InsertText {
            at: 99,
            text: "de".to_string(),
        };

        assert_eq!(
            normalize_command(&doc, &cmd),
            Some(Edit::Insert { at: 3, len: 2 })
        );
    }

    #[test]
    fn test_normalize_counts_scalars_not_bytes() {
        let doc = Document::from_text("abc");
        let cmd = Cmd::InsertText {
            at: 0,
            text: "🦀é".to_string(),
        };

        assert_eq!(
            normalize_command(&doc, &cmd),
            Some(Edit::Insert { at: 0, len: 2 })
        );
    }

    #[test]
    fn test_normalize_drops_empty_edits() {
        let doc = Document::from_text("abc");

        assert_eq!(
            normalize_command(
                &doc,
                &Cmd::InsertText {
                    at: 1,
                    text: String::new()
                }
            ),
            None
        );
        assert_eq!(
            normalize_command(&doc, &Cmd::DeleteRange { range: 2..2 }),
            None
        );
    }

    #[test]
    fn test_normalize_clamps_reversed_and_overlong_deletes() {
        let doc = Document::from_text("abcdef");

        assert_eq!(
            normalize_command(&doc, &Cmd::DeleteRange { range: 4..99 }),
            Some(Edit::Delete { start: 4, end: 6 })
        );
        #[allow(clippy::reversed_empty_ranges)]
        let reversed = Cmd::DeleteRange { range: 5..2 };
        assert_eq!(normalize_command(&doc, &reversed), None);
    }

    #[test]
    fn test_compiled_delta_uses_byte_offsets() {
        let doc = Document::from_text("é🦀z");
        let cmd = Cmd::DeleteRange { range: 1..2 };
        let edit = normalize_command(&doc, &cmd).unwrap();

        let delta = compile_command(&doc, edit, "");

        assert_eq!(delta.apply(&doc.buffer).to_string(), "éz");
    }
}
