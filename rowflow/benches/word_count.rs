use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use rowflow::*;

fn word_count(c: &mut Criterion) {
    let lines = [
        "the quick brown fox jumps over the lazy dog",
        "pack my box with five dozen liquor jugs",
        "how vexingly quick daft zebras jump",
    ];
    let texts: Vec<Row> = (0..500)
        .map(|i| row! { "text": lines[i % lines.len()] })
        .collect();
    let inputs = Inputs::new().rows("texts", texts);
    let graph = Graph::from_iter("texts")
        .map(FilterPunctuation::new("text"))
        .map(LowerCase::new("text"))
        .map(Split::new("text"))
        .sort(&["text"])
        .reduce(Count::new("count"), &["text"])
        .sort(&["count", "text"]);

    c.bench_function("word_count_500_lines", |b| {
        b.iter(|| black_box(graph.collect(&inputs).unwrap().len()))
    });
}

criterion_group!(benches, word_count);
criterion_main!(benches);
