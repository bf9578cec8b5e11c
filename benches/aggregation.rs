//! Benchmarks for parsing, promotion and collapsing.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use denylist_optimizer::aggregator::compact;
use denylist_optimizer::entry::{parse_entries, DenyEntry};
use denylist_optimizer::optimizer::Optimizer;
use std::hint::black_box;

/// Generate host addresses spread over many /24s, a few of them dense
fn generate_hosts(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let b = (i % 64) as u8;
            let c = ((i / 64) % 256) as u8;
            let d = ((i / 16384) % 254 + 1) as u8;
            format!("100.{}.{}.{}", b, c, d)
        })
        .collect()
}

/// Generate CIDRs of varying sizes
fn generate_cidrs(count: usize) -> Vec<DenyEntry> {
    (0..count)
        .map(|i| {
            let a = (i % 256) as u8;
            let b = ((i / 256) % 256) as u8;
            let prefix = 16 + (i % 17) as u8; // Prefix lengths 16-32
            format!("{}.{}.0.0/{}", a, b, prefix).parse().unwrap()
        })
        .collect()
}

fn bench_optimize(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimize");
    let optimizer = Optimizer::default();

    for size in [100, 1000, 10000, 50000] {
        let raw = generate_hosts(size);
        group.bench_with_input(BenchmarkId::new("hosts", size), &raw, |b, raw| {
            b.iter(|| black_box(optimizer.optimize(raw).unwrap()));
        });
    }

    group.finish();
}

fn bench_compact(c: &mut Criterion) {
    let mut group = c.benchmark_group("compact");

    for size in [100, 1000, 10000, 50000] {
        let cidrs = generate_cidrs(size);
        group.bench_with_input(BenchmarkId::new("mixed_cidrs", size), &cidrs, |b, cidrs| {
            b.iter(|| black_box(compact(cidrs, 8)));
        });
    }

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_entries");

    for size in [1000, 10000] {
        let mut raw = generate_hosts(size);
        raw.extend((0..size / 10).map(|i| format!("10.{}.0.0/16", i % 256)));
        raw.extend((0..size / 100).map(|i| format!("bogus-{}", i)));

        group.bench_with_input(BenchmarkId::new("mixed", raw.len()), &raw, |b, raw| {
            b.iter(|| black_box(parse_entries(raw)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_optimize, bench_compact, bench_parse);
criterion_main!(benches);
