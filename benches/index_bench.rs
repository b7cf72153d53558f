//! Benchmarks for Adindex index construction and queries
//!
//! Run with: cargo bench

use adindex::index::IndexBuilder;
use adindex::query::QueryEngine;
use adindex::store::RecordStore;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::io::Write;
use tempfile::NamedTempFile;

/// Deterministic fixture: `count` records spread over 100 users and 50 ads
fn write_fixture(count: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    let mut state = 0x2545f491u64;

    for _ in 0..count {
        // xorshift keeps the fixture reproducible across runs
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;

        let user_id = (state % 100) as u32;
        let ad_id = ((state >> 8) % 50) as u32;
        let click = ((state >> 16) % 3) as u16;
        let impression = ((state >> 24) % 100) as u32;

        writeln!(
            file,
            "{click}\t{impression}\t9000\t{ad_id}\t12\t2\t1\t77\t88\t99\t100\t{user_id}"
        )
        .unwrap();
    }

    file.flush().unwrap();
    file
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for size in [1_000, 10_000, 100_000] {
        let file = write_fixture(size);
        let store = RecordStore::open(file.path()).unwrap();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("index_{}", size), |b| {
            b.iter(|| IndexBuilder::default().build(black_box(&store)).unwrap())
        });
    }

    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let file = write_fixture(100_000);
    let store = RecordStore::open(file.path()).unwrap();
    let index = IndexBuilder::default().build(&store).unwrap();
    let engine = QueryEngine::new(&store, &index);

    let mut group = c.benchmark_group("query");

    group.bench_function("get", |b| {
        b.iter(|| engine.get(black_box(42), 7, 77, 1, 2).unwrap())
    });

    group.bench_function("clicked", |b| {
        b.iter(|| engine.clicked(black_box(42)).unwrap())
    });

    group.bench_function("impressed", |b| {
        b.iter(|| engine.impressed(black_box(42), black_box(43)).unwrap())
    });

    group.bench_function("profit", |b| {
        b.iter(|| engine.profit(black_box(7), black_box(0.01)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_build, bench_queries);
criterion_main!(benches);
