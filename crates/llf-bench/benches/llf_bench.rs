//! Benchmarks for llf-rs operations.
//!
//! Run with: `cargo bench -p llf-bench`

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use llf_bench::synthetic_scene;
use llf_ops::laplacian::to_laplacian;
use llf_ops::resample::downsample;
use llf_ops::{
    CurveParams, GaussianPyramid, Mode, NoProgress, ToneCurve, ToneMapParams, ToneMapper,
    DEFAULT_MIN_SIZE,
};

/// Benchmark pyramid construction and collapse.
fn bench_pyramid(c: &mut Criterion) {
    let mut group = c.benchmark_group("pyramid");

    for size in [256u32, 512, 1024].iter() {
        let src = synthetic_scene(*size, *size).unwrap_or_else(|e| panic!("scene: {e}"));
        group.throughput(Throughput::Elements((*size as u64) * (*size as u64)));

        group.bench_with_input(BenchmarkId::new("downsample", size), &src, |b, s| {
            b.iter(|| downsample(black_box(s)))
        });

        group.bench_with_input(BenchmarkId::new("gaussian_build", size), &src, |b, s| {
            b.iter(|| GaussianPyramid::build(black_box(s.clone()), DEFAULT_MIN_SIZE))
        });

        let gaussian = GaussianPyramid::build(src.clone(), DEFAULT_MIN_SIZE)
            .unwrap_or_else(|e| panic!("pyramid: {e}"));
        group.bench_with_input(BenchmarkId::new("to_laplacian", size), &gaussian, |b, g| {
            b.iter(|| to_laplacian(black_box(g)))
        });

        let laplacian = to_laplacian(&gaussian).unwrap_or_else(|e| panic!("laplacian: {e}"));
        group.bench_with_input(BenchmarkId::new("collapse", size), &laplacian, |b, l| {
            b.iter(|| black_box(l).collapse())
        });
    }

    group.finish();
}

/// Benchmark tone curve synthesis.
fn bench_curve(c: &mut Criterion) {
    let params = CurveParams {
        detail_radius: 20.0,
        noise_reduction: 3.0,
        detail_strength: 60.0,
        edge_strength: -40.0,
    };

    c.bench_function("tone_curve_build_all_references", |b| {
        b.iter(|| {
            (0..=255u8)
                .map(|r| ToneCurve::build(black_box(r), &params))
                .collect::<Vec<_>>()
        })
    });
}

/// Benchmark the full tone map per mode.
fn bench_tonemap(c: &mut Criterion) {
    let mut group = c.benchmark_group("tonemap");
    group.sample_size(10);

    let src = synthetic_scene(256, 256).unwrap_or_else(|e| panic!("scene: {e}"));
    group.throughput(Throughput::Elements(256 * 256));

    for mode in [Mode::Preview, Mode::LowContrast, Mode::NormalContrast] {
        let mapper = ToneMapper::new(ToneMapParams {
            mode,
            detail_strength: 50,
            edge_strength: -30,
            ..ToneMapParams::default()
        })
        .unwrap_or_else(|e| panic!("params: {e}"));

        group.bench_with_input(BenchmarkId::new("run", mode), &src, |b, s| {
            b.iter(|| mapper.run(black_box(s), &NoProgress))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pyramid, bench_curve, bench_tonemap);
criterion_main!(benches);
