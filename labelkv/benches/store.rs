//! Store benchmarks: label kinds, pruning removes, walks, and key rejection.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use labelkv::{Config, LabelKv, Node, VisitMeta};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Paths under a handful of shared directories, so most nodes are interior.
fn nested_paths(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| format!("/srv/{}/{}/{}.log", i % 8, (i / 8) % 64, i))
        .collect()
}

/// Keys with nothing in common past the first label.
fn flat_keys(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{:x}", i.wrapping_mul(0x9e37_79b9))).collect()
}

fn filled(keys: &[String]) -> LabelKv<char, usize> {
    let kv = LabelKv::new();
    for (i, key) in keys.iter().enumerate() {
        kv.insert(key.as_str(), i).unwrap();
    }
    kv
}

fn bench_label_kinds(c: &mut Criterion) {
    let mut group = c.benchmark_group("label_kind");

    for size in [1_000, 10_000].iter() {
        let keys = nested_paths(*size);

        group.bench_with_input(BenchmarkId::new("char/insert", size), size, |b, _| {
            b.iter(|| black_box(filled(&keys)));
        });

        group.bench_with_input(BenchmarkId::new("u8/insert", size), size, |b, _| {
            b.iter(|| {
                let kv: LabelKv<u8, usize> = LabelKv::new();
                for (i, key) in keys.iter().enumerate() {
                    kv.insert(key.as_bytes(), i).unwrap();
                }
                black_box(kv)
            });
        });

        let by_char = filled(&keys);
        group.bench_with_input(BenchmarkId::new("char/get", size), size, |b, _| {
            b.iter(|| keys.iter().filter(|k| by_char.contains(k.as_str()).unwrap()).count());
        });
    }

    group.finish();
}

fn bench_pruning_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove");
    let mut rng = StdRng::seed_from_u64(7);

    for (name, mut keys) in [("nested", nested_paths(10_000)), ("flat", flat_keys(10_000))] {
        keys.shuffle(&mut rng);
        group.bench_function(name, |b| {
            b.iter_batched(
                || filled(&keys),
                |kv| {
                    for key in keys.iter() {
                        kv.remove(key.as_str()).unwrap();
                    }
                    debug_assert_eq!(kv.node_count(), 0);
                    kv
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("walk");
    let kv = filled(&nested_paths(10_000));

    group.bench_function("count_valued", |b| {
        b.iter(|| {
            let mut valued = 0usize;
            kv.walk(&mut |node: &Node<char, usize>, _meta: VisitMeta| {
                valued += node.value().is_some() as usize;
                true
            });
            black_box(valued)
        });
    });

    group.bench_function("top_level_only", |b| {
        b.iter(|| {
            let mut seen = 0usize;
            kv.walk(&mut |_node: &Node<char, usize>, meta: VisitMeta| {
                seen += 1;
                meta.depth < 2
            });
            black_box(seen)
        });
    });

    group.bench_function("dump", |b| b.iter(|| black_box(kv.dump().len())));

    group.finish();
}

fn bench_rejection(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_too_long");
    let kv: LabelKv<char, usize> = LabelKv::with_config(Config {
        max_key_len: 64,
        ..Config::default()
    });
    let short = "a".repeat(64);
    let long = "a".repeat(4096);

    group.bench_function("accepted", |b| b.iter(|| kv.insert(short.as_str(), 1).is_ok()));
    group.bench_function("rejected", |b| b.iter(|| kv.insert(long.as_str(), 1).is_err()));

    group.finish();
}

criterion_group!(benches, bench_label_kinds, bench_pruning_remove, bench_walk, bench_rejection);
criterion_main!(benches);
