//! Criterion benchmarks for hueforge critical paths
//!
//! Benchmarks the core performance-critical operations:
//! - Convert: RGB <-> LAB <-> LCH round trips
//! - Color: literal parsing (hex fast path and CSS functions)
//! - Scale: palette and primitive system generation
//! - Contrast: matrix computation
//! - Resolve: theme resolution over a long reference chain

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hueforge::color::{parse_color, Color};
use hueforge::contrast::generate_contrast_matrix;
use hueforge::convert::{lab_to_rgb, rgb_to_lab, rgb_to_lch, Rgb};
use hueforge::scale::{generate_scale, Step};
use hueforge::system::PrimitiveSystem;
use hueforge::theme::{resolve, ThemeSpec};
use std::collections::BTreeMap;

// =============================================================================
// Test Data Generators
// =============================================================================

/// Base color map with `n` families spread around the hue circle
fn make_base_colors(n: usize) -> BTreeMap<String, String> {
    (0..n)
        .map(|i| {
            let hue = (i * 360 / n.max(1)) as u32;
            (format!("family-{}", i), format!("hsl({}, 70%, 50%)", hue))
        })
        .collect()
}

/// Theme entries forming a reference chain of length `n` rooted at a family ref
fn make_chain(n: usize) -> Vec<(String, String)> {
    let mut entries = vec![("t0".to_string(), "family-0.500".to_string())];
    for i in 1..n {
        entries.push((format!("t{}", i), format!("reference(t{}, alpha: 99%)", i - 1)));
    }
    entries
}

// =============================================================================
// Converter Benchmarks
// =============================================================================

fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");
    let teal = Rgb::new(29, 233, 182);

    group.bench_function("rgb_to_lab", |b| b.iter(|| rgb_to_lab(black_box(teal))));
    group.bench_function("rgb_to_lch", |b| b.iter(|| rgb_to_lch(black_box(teal))));
    group.bench_function("lab_round_trip", |b| {
        b.iter(|| lab_to_rgb(rgb_to_lab(black_box(teal))))
    });

    group.finish();
}

// =============================================================================
// Color Parsing Benchmarks
// =============================================================================

fn bench_color(c: &mut Criterion) {
    let mut group = c.benchmark_group("color_parsing");

    group.bench_function("parse_hex_3", |b| b.iter(|| parse_color(black_box("#F00"))));
    group.bench_function("parse_hex_6", |b| b.iter(|| parse_color(black_box("#1DE9B6"))));
    group.bench_function("parse_rgb", |b| {
        b.iter(|| parse_color(black_box("rgb(29 233 182 / 50%)")))
    });
    group.bench_function("parse_oklch", |b| {
        b.iter(|| parse_color(black_box("oklch(0.7 0.15 180)")))
    });
    group.bench_function("parse_named", |b| b.iter(|| parse_color(black_box("teal"))));

    group.finish();
}

// =============================================================================
// Scale Benchmarks
// =============================================================================

fn bench_scale(c: &mut Criterion) {
    let mut group = c.benchmark_group("scale");

    group.bench_function("generate_scale", |b| {
        b.iter(|| generate_scale(black_box(Color::rgb(29, 233, 182))))
    });

    for families in [1, 8, 32].iter() {
        let colors = make_base_colors(*families);
        group.throughput(Throughput::Elements(*families as u64));
        group.bench_with_input(
            BenchmarkId::new("build_system", families),
            &colors,
            |b, colors| b.iter(|| PrimitiveSystem::build(black_box(colors))),
        );
    }

    group.finish();
}

// =============================================================================
// Contrast Benchmarks
// =============================================================================

fn bench_contrast(c: &mut Criterion) {
    let mut group = c.benchmark_group("contrast");

    for families in [2, 8, 16].iter() {
        let system = PrimitiveSystem::build(&make_base_colors(*families)).unwrap();
        let names: Vec<String> = system.family_names().map(str::to_string).collect();
        let cells = (families * Step::ALL.len()).pow(2);
        group.throughput(Throughput::Elements(cells as u64));
        group.bench_with_input(BenchmarkId::new("full_matrix", families), &names, |b, names| {
            b.iter(|| {
                generate_contrast_matrix(&system, names, names, &Step::ALL, &Step::ALL).unwrap()
            })
        });
    }

    group.finish();
}

// =============================================================================
// Resolver Benchmarks
// =============================================================================

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    let system = PrimitiveSystem::build(&make_base_colors(4)).unwrap();

    for len in [10, 100, 500].iter() {
        let entries = make_chain(*len);
        let spec = ThemeSpec::from_entries(entries.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .unwrap();
        group.throughput(Throughput::Elements(*len as u64));
        group.bench_with_input(BenchmarkId::new("reference_chain", len), &spec, |b, spec| {
            b.iter(|| resolve(black_box(spec), &system).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_convert, bench_color, bench_scale, bench_contrast, bench_resolve);
criterion_main!(benches);
