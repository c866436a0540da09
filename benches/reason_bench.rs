#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use dedlog::{Atom, Database, Reasoner, Record};

fn atom(predicate: &str, tokens: &[&str]) -> Atom {
    Atom::from_tokens(predicate, tokens)
}

/// Chain `n0 -> n1 -> ... -> n{len}` with transitive closure rules
fn chain(len: usize) -> Database {
    let mut records: Vec<Record> = (0..len)
        .map(|i| {
            Record::Fact(Atom::from_tokens(
                "edge",
                [format!("n{i}"), format!("n{}", i + 1)],
            ))
        })
        .collect();
    records.push(Record::Rule {
        head: atom("path", &["X", "Y"]),
        body: vec![atom("edge", &["X", "Y"])],
    });
    records.push(Record::Rule {
        head: atom("path", &["X", "Z"]),
        body: vec![atom("path", &["X", "Y"]), atom("edge", &["Y", "Z"])],
    });
    Database::from_records(records).unwrap()
}

/// Benchmark for building a database of given facts
fn bench_from_records(c: &mut Criterion) {
    c.bench_function("from_records", |b| {
        b.iter(|| black_box(chain(black_box(500))));
    });
}

/// Benchmark for a single non-recursive rule
fn bench_copy_rule(c: &mut Criterion) {
    c.bench_function("copy_rule", |b| {
        b.iter_batched(
            || {
                let mut records: Vec<Record> = (0..100)
                    .map(|i| Record::Fact(Atom::from_tokens("flies", [format!("bird{i}")])))
                    .collect();
                records.push(Record::Rule {
                    head: atom("bird", &["X"]),
                    body: vec![atom("flies", &["X"])],
                });
                Database::from_records(records).unwrap()
            },
            |mut db| black_box(Reasoner::default().reason(&mut db)),
            BatchSize::SmallInput,
        );
    });
}

/// Benchmark for transitive closure over a chain
fn bench_transitive_closure(c: &mut Criterion) {
    c.bench_function("transitive_closure_chain_20", |b| {
        b.iter_batched(
            || chain(20),
            |mut db| black_box(Reasoner::default().reason(&mut db)),
            BatchSize::SmallInput,
        );
    });
}

/// Benchmark for rerunning on a database that is already closed
fn bench_closed_rerun(c: &mut Criterion) {
    let mut db = chain(20);
    let mut reasoner = Reasoner::default();
    reasoner.reason(&mut db);

    c.bench_function("closed_rerun_chain_20", |b| {
        b.iter(|| black_box(reasoner.reason(&mut db)));
    });
}

criterion_group!(
    benches,
    bench_from_records,
    bench_copy_rule,
    bench_transitive_closure,
    bench_closed_rerun
);
criterion_main!(benches);
