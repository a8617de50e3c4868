//! Benchmarks for the CPU-side coverage decode and transform math.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vellum_core::coverage::{decode_alpha, subpixel_filter};
use vellum_core::transform::{glyph_transform, jittered};
use vellum_core::{Pen, Viewport, JITTER_PATTERN};

fn bench_decode_alpha(c: &mut Criterion) {
    c.bench_function("coverage::decode_alpha", |b| {
        b.iter(|| {
            let mut total = 0.0f32;
            for v in 0..=255u32 {
                total += decode_alpha(black_box(v as f32));
            }
            black_box(total)
        });
    });
}

fn bench_subpixel_filter(c: &mut Criterion) {
    c.bench_function("coverage::subpixel_filter", |b| {
        b.iter(|| {
            black_box(subpixel_filter(
                black_box([1.0, 2.0]),
                black_box([2.0, 1.0, 0.0]),
            ))
        });
    });
}

fn bench_glyph_transform_chain(c: &mut Criterion) {
    let viewport = Viewport {
        pixel_width: 1000.0,
        pixel_height: 440.0,
        window_width: 1000.0,
        window_height: 440.0,
        dpi: 96.0,
        dpi_height: 96.0,
    };
    let pen = Pen::new(120.0, 300.0);

    c.bench_function("transform::six_jittered_samples", |b| {
        b.iter(|| {
            let base = glyph_transform(black_box(&viewport), black_box(&pen), 16.0, -0.2);
            for offset in JITTER_PATTERN {
                black_box(jittered(&base, &viewport, offset));
            }
        });
    });
}

criterion_group!(
    benches,
    bench_decode_alpha,
    bench_subpixel_filter,
    bench_glyph_transform_chain
);
criterion_main!(benches);
