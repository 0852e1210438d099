// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use annotext_engine::{AnnotationData, Document, DocumentData};

/// `blocks` code blocks, each wrapped in a matching `pre` and followed by a
/// paragraph with a couple of inline marks.
#[allow(dead_code)]
pub fn generate_code_document(blocks: usize) -> Document {
    let block = "fn example() {\n    println!(\"Hello\");\n}\n";
    let paragraph = "Some paragraph with *emphasis* and a [link].\n\n";
    let stride = block.chars().count() + paragraph.chars().count();

    let mut annotations = Vec::with_capacity(blocks * 5);
    for i in 0..blocks {
        let start = i * stride;
        let end = start + block.chars().count();
        annotations.push(
            AnnotationData::new("code", start, end).with_attribute("language", "rust"),
        );
        annotations.push(AnnotationData::new("pre", start, end));
        annotations.push(AnnotationData::new("paragraph", end, start + stride - 2));
        annotations.push(AnnotationData::new("em", end + 15, end + 25));
        annotations.push(
            AnnotationData::new("link", end + 34, end + 40)
                .with_attribute("href", "https://example.com"),
        );
    }

    let content = format!("{block}{paragraph}").repeat(blocks);
    Document::new(DocumentData::new(content, annotations)).unwrap()
}
