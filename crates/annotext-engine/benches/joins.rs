use annotext_engine::{Annotation, Changeset, Query};
use criterion::{Criterion, criterion_group, criterion_main};
mod common;

fn same_range(l: &Annotation, r: &Annotation) -> bool {
    l.start == r.start && l.end == r.end
}

fn bench_joins(c: &mut Criterion) {
    let mut group = c.benchmark_group("joins");
    group.sample_size(10);

    for blocks in [50, 200] {
        let doc = common::generate_code_document(blocks);
        let code = doc.select(&Query::of_type("code")).alias("code");
        let pre = doc.select(&Query::of_type("pre")).alias("pre");

        group.bench_function(format!("build_{blocks}"), |b| {
            b.iter(|| {
                let join = code.join(&doc, &pre, same_range).unwrap();
                std::hint::black_box(join);
            });
        });

        group.bench_function(format!("transform_{blocks}"), |b| {
            b.iter(|| {
                let mut d = doc.clone();
                let mut join = code.join(&d, &pre, same_range).unwrap();
                let merged = join.transform(&mut d, |d, record| {
                    let mut changeset = Changeset::new();
                    for pre in record.joined("pre") {
                        d.remove_annotation(pre.id()).unwrap();
                        changeset = changeset.with_removal(pre.id());
                    }
                    changeset
                });
                std::hint::black_box(merged);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_joins);
criterion_main!(benches);
