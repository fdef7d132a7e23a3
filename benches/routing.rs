//! Message routing benchmark suite.
//!
//! Benchmarks the per-frame path of the client:
//! - Sender classification
//! - Full routing of well-formed and malformed frames
//!
//! Run with: cargo bench --bench routing
//! Results saved to: target/criterion/

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use chat_client::MessageRouter;

// ============================================================================
// Benchmark Parameters
// ============================================================================

const DISPLAY_NAME: &str = "Alice";
const MESSAGE_LENGTHS: &[usize] = &[16, 256, 4096];

fn frame(sender: &str, length: usize) -> String {
    serde_json::json!({
        "sender": sender,
        "message": "x".repeat(length),
    })
    .to_string()
}

// ============================================================================
// Benchmark: Classification
// ============================================================================

fn bench_classify(c: &mut Criterion) {
    let router = MessageRouter::new(DISPLAY_NAME);

    let mut group = c.benchmark_group("classify");
    for sender in ["Alice", "Server", "Bob"] {
        group.bench_with_input(BenchmarkId::from_parameter(sender), &sender, |b, sender| {
            b.iter(|| router.classify(black_box(sender)));
        });
    }
    group.finish();
}

// ============================================================================
// Benchmark: Routing
// ============================================================================

fn bench_route(c: &mut Criterion) {
    let router = MessageRouter::new(DISPLAY_NAME);

    let mut group = c.benchmark_group("route");
    for &length in MESSAGE_LENGTHS {
        let well_formed = frame("Bob", length);
        group.throughput(Throughput::Bytes(well_formed.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("well_formed", length),
            &well_formed,
            |b, frame| {
                b.iter(|| router.route(black_box(frame)));
            },
        );

        let malformed = "y".repeat(length);
        group.throughput(Throughput::Bytes(malformed.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("malformed", length),
            &malformed,
            |b, frame| {
                b.iter(|| router.route(black_box(frame)));
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_classify, bench_route);
criterion_main!(benches);
