use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use quill::core::segment::{render_display, segment};

fn make_reply(blocks: usize) -> String {
    let mut reply = String::new();
    for i in 0..blocks {
        reply.push_str("Here is **step** number ");
        reply.push_str(&i.to_string());
        reply.push_str(", with a <tag> to escape.\n```rust\nfn step() -> usize {\n    ");
        reply.push_str(&i.to_string());
        reply.push_str("\n}\n```\n");
    }
    reply
}

/// Streamed replies are re-segmented in full after every delta, so the
/// cost that matters is the sum over all prefixes.
fn bench_growing_buffer(c: &mut Criterion) {
    for &blocks in &[4usize, 32usize] {
        let reply = make_reply(blocks);
        let boundaries: Vec<usize> = reply
            .char_indices()
            .map(|(i, _)| i)
            .step_by(16)
            .chain(std::iter::once(reply.len()))
            .collect();

        let mut group = c.benchmark_group(format!("segment_blocks{blocks}"));
        group.throughput(Throughput::Bytes(reply.len() as u64));

        group.bench_function(BenchmarkId::new("segment_full", blocks), |b| {
            b.iter(|| segment(&reply))
        });
        group.bench_function(BenchmarkId::new("render_prefixes", blocks), |b| {
            b.iter(|| {
                for &end in &boundaries {
                    let _ = render_display(&reply[..end]);
                }
            })
        });
        group.finish();
    }
}

criterion_group!(benches, bench_growing_buffer);
criterion_main!(benches);
