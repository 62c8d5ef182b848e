//! Performance benchmarks for tracked records.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use record_tracker::{
    BatchConfig, InMemoryStore, RemoteRecord, RequestBuffer, TrackedRecord,
};
use std::sync::Arc;

fn seeded_store(field_count: usize) -> (Arc<InMemoryStore>, record_tracker::RecordId) {
    let store = Arc::new(InMemoryStore::new());
    let mut record = RemoteRecord::new("item");
    for i in 0..field_count {
        record.set(format!("field{}", i), i as i64);
    }
    let id = store.insert(record);
    (store, id)
}

/// Benchmark write + save with varying changeset sizes
fn bench_save_changes(c: &mut Criterion) {
    let mut group = c.benchmark_group("save_changes");

    for changed in [1, 10, 50, 200] {
        group.bench_with_input(BenchmarkId::new("changed_fields", changed), &changed, |b, &n| {
            let (store, id) = seeded_store(200);
            let mut record = TrackedRecord::with_id("item", id).with_store(store.clone());

            b.iter(|| {
                for i in 0..n {
                    record.set(format!("field{}", i), (i * 2) as i64);
                }
                black_box(record.save().unwrap());
            });
        });
    }

    group.finish();
}

/// Benchmark targeted refresh against a record with many pending changes
fn bench_targeted_refresh(c: &mut Criterion) {
    let mut group = c.benchmark_group("targeted_refresh");

    for pending in [10, 100, 500] {
        group.bench_with_input(BenchmarkId::new("pending_changes", pending), &pending, |b, &n| {
            let (store, id) = seeded_store(n);
            let mut record = TrackedRecord::with_id("item", id).with_store(store.clone());
            for i in 0..n {
                record.set(format!("field{}", i), -1i64);
            }

            b.iter(|| {
                black_box(record.refresh(&["field0", "field1"]).unwrap());
            });
        });
    }

    group.finish();
}

/// Benchmark batched creation
fn bench_batch_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_create");

    for count in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("records", count), &count, |b, &n| {
            let store = InMemoryStore::new();
            let config = BatchConfig::default();
            let mut buffer = RequestBuffer::new();

            b.iter(|| {
                for i in 0..n {
                    let mut record = TrackedRecord::new("item");
                    record.set("n", i as i64);
                    buffer.push(record.create_request());
                }
                black_box(buffer.flush(&store, &config, None).unwrap());
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_save_changes,
    bench_targeted_refresh,
    bench_batch_create
);
criterion_main!(benches);
