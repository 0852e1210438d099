use annotext_engine::{
    AnnotationData, BoundsPolicy, Cmd, Document, DocumentData, DocumentError, DocumentOptions,
    OBJECT_REPLACEMENT,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn render(doc: &Document) -> String {
    doc.annotations()
        .iter()
        .map(|a| format!("{} {}..{} {:?}", a.kind, a.start, a.end, doc.slice(a.range())))
        .collect::<Vec<_>>()
        .join("\n")
}

fn assert_boundaries(doc: &Document) {
    assert_eq!(doc.len(), doc.content().chars().count());
    for a in doc.annotations() {
        assert!(a.start <= a.end, "{} has start {} > end {}", a.kind, a.start, a.end);
        assert!(a.end <= doc.len(), "{} ends at {} past {}", a.kind, a.end, doc.len());
    }
}

#[test]
fn insert_then_delete_keeps_annotation_over_its_text() {
    let mut doc = Document::new(DocumentData::new(
        "Hello, world",
        vec![
            AnnotationData::new("greeting", 0, 5),
            AnnotationData::new("subject", 7, 12),
            AnnotationData::new("cursor", 12, 12),
        ],
    ))
    .unwrap();

    doc.insert_text(0, "Oh! ");
    doc.delete_text(9..11);

    insta::assert_snapshot!(render(&doc), @r#"
    greeting 4..9 "Hello"
    subject 9..14 "world"
    cursor 14..14 ""
    "#);
}

#[rstest]
#[case::before(0..2, (2, 8))]
#[case::overlapping_start(2..6, (2, 6))]
#[case::inside(5..7, (4, 8))]
#[case::overlapping_end(8..12, (4, 8))]
#[case::covering(2..12, (2, 2))]
#[case::after(11..12, (4, 10))]
fn delete_remaps_boundaries(
    #[case] range: std::ops::Range<usize>,
    #[case] expected: (usize, usize),
) {
    let mut doc = Document::new(DocumentData::new(
        "0123456789ab",
        vec![AnnotationData::new("span", 4, 10)],
    ))
    .unwrap();

    doc.delete_text(range);

    let a = &doc.annotations()[0];
    assert_eq!((a.start, a.end), expected);
}

#[test]
fn offsets_count_scalars_not_bytes() {
    let content = format!("a{OBJECT_REPLACEMENT}é😀b");
    let mut doc = Document::new(DocumentData::new(
        content,
        vec![
            AnnotationData::new("embed", 1, 2),
            AnnotationData::new("emoji", 3, 4),
        ],
    ))
    .unwrap();

    doc.insert_text(3, "→");

    assert_eq!(doc.len(), 6);
    assert_eq!(doc.text_of(doc.annotations()[0].id()).unwrap(), "\u{FFFC}");
    assert_eq!(doc.text_of(doc.annotations()[1].id()).unwrap(), "😀");
}

#[test]
fn edits_bump_version_and_report_changes() {
    let mut doc = Document::from_text("abc");

    let insert = doc.apply(Cmd::InsertText {
        at: 1,
        text: "xy".to_string(),
    });
    let noop = doc.delete_text(2..2);
    let delete = doc.apply(Cmd::DeleteRange { range: 0..2 });

    assert_eq!((insert.version, insert.changed), (1, vec![1..3]));
    assert_eq!((noop.version, noop.changed), (1, vec![]));
    assert_eq!((delete.version, delete.changed), (2, vec![0..0]));
    assert_eq!(doc.content(), "ybc");
}

#[test]
fn bounds_policy_governs_out_of_range_annotations() {
    let data = DocumentData::new("abc", vec![AnnotationData::new("bold", 1, 9)]);

    assert_eq!(
        Document::new(data.clone()).unwrap_err(),
        DocumentError::InvalidRange {
            start: 1,
            end: 9,
            len: 3
        }
    );

    let clamped =
        Document::with_options(data, DocumentOptions::default().with_bounds(BoundsPolicy::Clamp))
            .unwrap();
    assert_eq!(clamped.annotations()[0].range(), 1..3);
}

/// Small xorshift so the edit sequence is reproducible.
struct Sequence(u64);

impl Sequence {
    fn next(&mut self, bound: usize) -> usize {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        (self.0 % (bound as u64 + 1)) as usize
    }
}

#[test]
fn boundaries_stay_valid_across_edit_sequences() {
    let mut doc = Document::new(DocumentData::new(
        "The quick brown fox jumps over the lazy dog",
        vec![
            AnnotationData::new("sentence", 0, 43),
            AnnotationData::new("word", 4, 9),
            AnnotationData::new("word", 16, 19),
            AnnotationData::new("point", 20, 20),
            AnnotationData::new("tail", 40, 43),
        ],
    ))
    .unwrap();
    let mut rng = Sequence(0x9E37_79B9_7F4A_7C15);

    for step in 0..500 {
        let len = doc.len();
        if step % 3 == 0 || len == 0 {
            let at = rng.next(len + 2);
            let text = ["x", "yz", "é😀", ""][rng.next(3)];
            doc.insert_text(at, text);
        } else {
            let start = rng.next(len);
            let end = start + rng.next(len - start);
            doc.delete_text(start..end);
        }
        assert_boundaries(&doc);
    }
}
