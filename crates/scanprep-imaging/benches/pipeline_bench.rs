// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the scanprep-imaging pipelines and the segment
// detector on a synthetic page.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, GrayImage, Luma};

use scanprep_core::PipelineConfig;
use scanprep_imaging::ScanPreprocessor;
use scanprep_imaging::scan::hough::detect_segments;
use scanprep_imaging::scan::skew::prepare_edge_map;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// 400x300 light page with a dark frame and a few text-like bars, all
/// slightly tilted by shifting one row every 20 columns.
fn synthetic_page() -> GrayImage {
    let (width, height) = (400u32, 300u32);
    let mut img = GrayImage::from_pixel(width, height, Luma([235u8]));
    let mut ink = |x: u32, y: u32| {
        let y = y + x / 20;
        if x < width && y < height {
            img.put_pixel(x, y, Luma([20u8]));
        }
    };

    for x in 30..370 {
        for t in 0..6 {
            ink(x, 20 + t);
            ink(x, 250 + t);
        }
    }
    for bar in 0..5 {
        for x in 60..320 {
            for t in 0..4 {
                ink(x, 70 + bar * 30 + t);
            }
        }
    }
    img
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Grayscale, blur and one denoise pass: the recognition hot path.
fn bench_preprocess(c: &mut Criterion) {
    let page = DynamicImage::ImageLuma8(synthetic_page());
    let prep = ScanPreprocessor::default();

    c.bench_function("preprocess (400x300)", |b| {
        b.iter(|| black_box(prep.preprocess(black_box(&page))));
    });
}

/// Full deskew and crop, including both Hough passes and the rotation.
fn bench_deskew(c: &mut Criterion) {
    let page = DynamicImage::ImageLuma8(synthetic_page());
    let prep = ScanPreprocessor::default();

    c.bench_function("deskew (400x300)", |b| {
        b.iter(|| black_box(prep.deskew(black_box(&page))));
    });
}

/// Segment detection alone, on a prepared edge map.
fn bench_detect_segments(c: &mut Criterion) {
    let config = PipelineConfig::default();
    let edges = prepare_edge_map(&synthetic_page(), &config).filtered;

    c.bench_function("detect_segments (400x300)", |b| {
        b.iter(|| black_box(detect_segments(black_box(&edges), &config.skew.hough)));
    });
}

criterion_group!(benches, bench_preprocess, bench_deskew, bench_detect_segments);
criterion_main!(benches);
