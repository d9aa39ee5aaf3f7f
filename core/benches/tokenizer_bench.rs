use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gutensearch_core::corpus::Document;
use gutensearch_core::index::build_index;
use gutensearch_core::tokenizer::tokenize;

const PARAGRAPH: &str = "Call me Ishmael. Some years ago, never mind how long precisely, \
having little or no money in my purse, and nothing particular to interest me on shore, \
I thought I would sail about a little and see the watery part of the world. It is a way \
I have of driving off the spleen and regulating the circulation. Whenever I find myself \
growing grim about the mouth; whenever it is a damp, drizzly November in my soul; whenever \
I find myself involuntarily pausing before coffin warehouses, and bringing up the rear of \
every funeral I meet; then, I account it high time to get to sea as soon as I can.";

fn bench_tokenize(c: &mut Criterion) {
    c.bench_function("tokenize_paragraph", |b| {
        b.iter(|| tokenize(black_box(PARAGRAPH)))
    });
}

fn bench_build_index(c: &mut Criterion) {
    let docs: Vec<Document> = (0..100).map(|id| Document::new(id, PARAGRAPH)).collect();
    c.bench_function("build_index_100_docs", |b| {
        b.iter(|| build_index(black_box(docs.clone())))
    });
}

criterion_group!(benches, bench_tokenize, bench_build_index);
criterion_main!(benches);
