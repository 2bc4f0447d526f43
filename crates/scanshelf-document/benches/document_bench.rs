// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the scanshelf-document crate: assembling a small
// PDF from synthetic page images and rendering it back through the
// built-in rasterizer.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use image::{DynamicImage, Rgb, RgbImage};

use scanshelf_document::pdf::writer::build_pdf;
use scanshelf_document::{ImageLayerRasterizer, PageCache, PdfPageRenderer};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Write `count` gradient PNGs of `width` x `height` into `dir`.
fn page_images(dir: &std::path::Path, count: usize, width: u32, height: u32) -> Vec<std::path::PathBuf> {
    (0..count)
        .map(|index| {
            let img = RgbImage::from_fn(width, height, |x, y| {
                Rgb([(x % 256) as u8, (y % 256) as u8, (index * 40 % 256) as u8])
            });
            let path = dir.join(format!("page_{index}.png"));
            DynamicImage::ImageRgb8(img).save(&path).expect("write fixture");
            path
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Assemble three 600x800 scans into one PDF.
fn bench_assemble_pdf(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("tempdir");
    let images = page_images(dir.path(), 3, 600, 800);

    c.bench_function("build_pdf (3 pages, 600x800)", |b| {
        b.iter(|| black_box(build_pdf(black_box(&images)).expect("pdf")));
    });
}

/// Render every page of a three-page scan PDF to PNG with the 2048 cap.
fn bench_render_pdf(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("tempdir");
    let images = page_images(dir.path(), 3, 600, 800);
    let pdf = build_pdf(&images).expect("pdf");
    let renderer = PdfPageRenderer::new(PageCache::new(dir.path().join("cache")))
        .with_rasterizer(Arc::new(ImageLayerRasterizer));

    c.bench_function("render_pdf (3 pages)", |b| {
        b.iter(|| black_box(renderer.render_bytes(black_box(&pdf)).expect("render")));
    });
}

criterion_group!(benches, bench_assemble_pdf, bench_render_pdf);
criterion_main!(benches);
