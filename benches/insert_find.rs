use arena_avl::AvlTree;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::collections::BTreeMap;

const MAX_KEY: u32 = 100_000;

const SAMPLE_KEYS: [u32; 14] = [510, 512, 514, 508, 506, 210, 1000, 0, 2, 1600, 4, 7898, 500, 516];

fn even_keys(max_key: u32) -> Vec<u32> {
    (0..=max_key).step_by(2).collect()
}

fn value_for(key: u32) -> String {
    format!("bruh {key}")
}

fn bench_insert_evens(c: &mut Criterion) {
    let keys = even_keys(MAX_KEY);

    let mut group = c.benchmark_group("insert_evens");

    group.bench_function(BenchmarkId::new("iterative", MAX_KEY), |b| {
        b.iter(|| {
            let mut tree = AvlTree::new();
            for &k in &keys {
                tree.insert(k, value_for(k)).expect("even keys are distinct");
            }
            tree
        });
    });

    group.bench_function(BenchmarkId::new("recursive", MAX_KEY), |b| {
        b.iter(|| {
            let mut tree = AvlTree::new();
            for &k in &keys {
                tree.insert_recursive(k, value_for(k))
                    .expect("even keys are distinct");
            }
            tree
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", MAX_KEY), |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for &k in &keys {
                map.insert(k, value_for(k));
            }
            map
        });
    });

    group.finish();
}

fn bench_find_samples(c: &mut Criterion) {
    let mut tree = AvlTree::new();
    for k in even_keys(MAX_KEY) {
        tree.insert(k, value_for(k)).expect("even keys are distinct");
    }

    let mut group = c.benchmark_group("find_samples");

    group.bench_function(BenchmarkId::new("iterative", MAX_KEY), |b| {
        b.iter(|| {
            let mut found = 0usize;
            for k in &SAMPLE_KEYS {
                if tree.find_key(k).is_some() {
                    found += 1;
                }
            }
            found
        });
    });

    group.bench_function(BenchmarkId::new("recursive", MAX_KEY), |b| {
        b.iter(|| {
            let mut found = 0usize;
            for k in &SAMPLE_KEYS {
                if tree.find_key_recursive(k).is_some() {
                    found += 1;
                }
            }
            found
        });
    });

    group.finish();
}

fn bench_remove_samples(c: &mut Criterion) {
    let keys = even_keys(MAX_KEY);

    let mut group = c.benchmark_group("remove_samples");

    group.bench_function(BenchmarkId::new("AvlTree", MAX_KEY), |b| {
        b.iter_batched(
            || {
                let mut tree = AvlTree::new();
                for &k in &keys {
                    tree.insert(k, value_for(k)).expect("even keys are distinct");
                }
                tree
            },
            |mut tree| {
                for k in &SAMPLE_KEYS {
                    tree.remove(k);
                }
                tree
            },
            criterion::BatchSize::LargeInput,
        );
    });

    group.finish();
}

criterion_group!(insert_benches, bench_insert_evens);

criterion_group!(find_benches, bench_find_samples);

criterion_group!(remove_benches, bench_remove_samples);

criterion_main!(insert_benches, find_benches, remove_benches);
