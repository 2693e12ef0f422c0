//! Benchmarks for graph construction and the backward pass.
//!
//! Two shapes are measured: a long chain, where every node has a single
//! consumer, and a wide weighted sum, where many leaves feed one output.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use scalargrad_core::Graph;

fn build_chain(graph: &Graph, length: usize) -> scalargrad_core::NodeId {
    let mut node = graph.leaf(0.5);
    for _ in 0..length {
        let scaled = graph.mul(node, 0.99);
        node = graph.tanh(scaled);
    }
    node
}

fn build_weighted_sum(graph: &Graph, width: usize) -> scalargrad_core::NodeId {
    let mut acc = graph.leaf(0.0);
    for i in 0..width {
        let w = graph.leaf((i as f64).sin());
        let x = graph.leaf((i as f64).cos());
        let term = graph.mul(w, x);
        acc = graph.add(acc, term);
    }
    graph.sigmoid(acc)
}

fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain");

    for &length in &[100, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("forward", length), &length, |b, &length| {
            b.iter(|| {
                let graph = Graph::with_capacity(3 * length + 1);
                black_box(build_chain(&graph, length));
            });
        });

        group.bench_with_input(BenchmarkId::new("backward", length), &length, |b, &length| {
            let graph = Graph::with_capacity(3 * length + 1);
            let output = build_chain(&graph, length);
            b.iter(|| {
                graph.zero_grad_all();
                black_box(graph.backward(output));
            });
        });
    }

    group.finish();
}

fn bench_weighted_sum(c: &mut Criterion) {
    let mut group = c.benchmark_group("weighted_sum");

    for &width in &[100, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("backward", width), &width, |b, &width| {
            let graph = Graph::new();
            let output = build_weighted_sum(&graph, width);
            b.iter(|| {
                graph.zero_grad_all();
                black_box(graph.backward(output));
            });
        });

        group.bench_with_input(BenchmarkId::new("topological_order", width), &width, |b, &width| {
            let graph = Graph::new();
            let output = build_weighted_sum(&graph, width);
            b.iter(|| black_box(graph.topological_order(output)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_chain, bench_weighted_sum);
criterion_main!(benches);
