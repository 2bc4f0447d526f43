// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF page renderer: turns each page of a PDF into a PNG in the page cache,
// downscaled so the longer side never exceeds the configured cap.

use std::sync::Arc;

use image::imageops;
use image::{DynamicImage, RgbaImage};
use scanshelf_core::config::DEFAULT_RENDER_MAX_DIMENSION;
use scanshelf_core::error::Result;
use scanshelf_core::{Locator, PageImageSet};
use tracing::{info, instrument, warn};

use super::raster::{
    ImageLayerRasterizer, PageRasterizer, PagedSource, WHITE, ensure_canvas_fits,
};
use crate::cache::PageCache;
use crate::image::RasterImage;

const CACHE_PREFIX: &str = "pdf_page";

/// Uniform downscale factor so that `max(width, height) <= cap`.
///
/// Pages already within the cap are left at `1.0`.
pub fn downscale_factor(width: u32, height: u32, cap: u32) -> f64 {
    let longest = width.max(height);
    if longest > cap {
        cap as f64 / longest as f64
    } else {
        1.0
    }
}

/// Apply `scale` to both sides, rounding to the nearest pixel.
pub fn scaled_size(width: u32, height: u32, scale: f64) -> (u32, u32) {
    let w = (width as f64 * scale).round().max(1.0) as u32;
    let h = (height as f64 * scale).round().max(1.0) as u32;
    (w, h)
}

/// Pick the rasterizer for this build: PDFium when compiled in and loadable,
/// otherwise the built-in image-layer backend.
pub fn default_rasterizer() -> Arc<dyn PageRasterizer> {
    #[cfg(feature = "pdfium")]
    {
        if super::pdfium::PdfiumRasterizer::is_available() {
            return Arc::new(super::pdfium::PdfiumRasterizer);
        }
        warn!("PDFium library not found, falling back to built-in rasterizer");
    }
    Arc::new(ImageLayerRasterizer)
}

/// Renders PDF pages into the page cache.
#[derive(Clone)]
pub struct PdfPageRenderer {
    rasterizer: Arc<dyn PageRasterizer>,
    cache: PageCache,
    max_dimension: u32,
}

impl std::fmt::Debug for PdfPageRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfPageRenderer")
            .field("rasterizer", &self.rasterizer.name())
            .field("cache", &self.cache)
            .field("max_dimension", &self.max_dimension)
            .finish()
    }
}

impl PdfPageRenderer {
    /// Renderer using the default rasterizer and the default cap.
    pub fn new(cache: PageCache) -> Self {
        Self {
            rasterizer: default_rasterizer(),
            cache,
            max_dimension: DEFAULT_RENDER_MAX_DIMENSION,
        }
    }

    /// Use `rasterizer` instead of the default backend.
    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn PageRasterizer>) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    /// Cap the longer page side at `max_dimension` pixels (at least 1).
    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension.max(1);
        self
    }

    /// Current longest-side cap in pixels.
    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }

    /// Render every page of the PDF at `locator`.
    ///
    /// A source that cannot be read or opened yields an empty set; a page
    /// that fails is recorded in [`PageImageSet::skipped`] and the rest
    /// continue.
    #[instrument(skip(self), fields(locator = %locator))]
    pub fn render(&self, locator: &Locator) -> PageImageSet {
        let data = match std::fs::read(locator.as_path()) {
            Ok(data) => data,
            Err(err) => {
                warn!(error = %err, "Cannot read PDF");
                return PageImageSet::new();
            }
        };
        match self.render_bytes(&data) {
            Ok(pages) => pages,
            Err(err) => {
                warn!(error = %err, "Cannot open PDF");
                PageImageSet::new()
            }
        }
    }

    /// Render every page of an in-memory PDF.
    ///
    /// Errors only when the document cannot be opened.
    #[instrument(skip(self, data), fields(bytes_len = data.len(), backend = self.rasterizer.name()))]
    pub fn render_bytes(&self, data: &[u8]) -> Result<PageImageSet> {
        let mut set = PageImageSet::new();

        self.rasterizer.with_document(data, &mut |source| {
            for index in 0..source.page_count() {
                let stored = self
                    .render_page(source, index)
                    .and_then(|page| page.to_png_bytes())
                    .and_then(|png| self.cache.store(CACHE_PREFIX, index, "png", &png));
                match stored {
                    Ok(locator) => set.pages.push(locator),
                    Err(err) => {
                        warn!(index, error = %err, "Page skipped");
                        set.skip(index, err.to_string());
                    }
                }
            }
        })?;

        info!(
            rendered = set.len(),
            skipped = set.skipped.len(),
            "PDF pages rendered"
        );
        Ok(set)
    }

    /// Render one page on white at its capped size.
    ///
    /// Pages over the cap are drawn straight at the reduced size, so no
    /// native-resolution buffer is ever allocated for them.
    fn render_page(&self, source: &dyn PagedSource, index: usize) -> Result<RasterImage> {
        let (width, height) = source.page_size(index)?;
        let scale = downscale_factor(width, height, self.max_dimension);
        let (target_w, target_h) = scaled_size(width, height, scale);
        ensure_canvas_fits(target_w, target_h)?;

        let rendered = source.render_page(index, target_w, target_h)?;
        let mut canvas = RgbaImage::from_pixel(target_w, target_h, WHITE);
        imageops::overlay(&mut canvas, &rendered, 0, 0);
        RasterImage::from_dynamic(DynamicImage::ImageRgb8(
            DynamicImage::ImageRgba8(canvas).to_rgb8(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::codec::probe_dimensions;
    use crate::pdf::raster::tests::pdf_with_pages;

    fn renderer(dir: &std::path::Path) -> PdfPageRenderer {
        PdfPageRenderer::new(PageCache::new(dir.join("cache")))
            .with_rasterizer(Arc::new(ImageLayerRasterizer))
    }

    fn page_dimensions(set: &PageImageSet) -> Vec<(u32, u32)> {
        set.pages
            .iter()
            .map(|page| {
                let data = std::fs::read(page.as_path()).expect("read page");
                probe_dimensions(&data).expect("valid png")
            })
            .collect()
    }

    #[test]
    fn factor_is_one_within_cap() {
        assert_eq!(downscale_factor(800, 600, 2048), 1.0);
        assert_eq!(downscale_factor(2048, 100, 2048), 1.0);
    }

    #[test]
    fn factor_scales_longest_side_to_cap() {
        let scale = downscale_factor(4000, 3000, 2048);
        assert_eq!(scaled_size(4000, 3000, scale), (2048, 1536));
        let scale = downscale_factor(1000, 5000, 2048);
        assert_eq!(scaled_size(1000, 5000, scale), (410, 2048));
    }

    #[test]
    fn pages_are_capped_and_keep_aspect() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pdf = pdf_with_pages(&[(4000, 3000), (800, 600)]);
        let set = renderer(dir.path()).render_bytes(&pdf).expect("render");
        assert!(set.skipped.is_empty());
        assert_eq!(page_dimensions(&set), vec![(2048, 1536), (800, 600)]);
    }

    #[test]
    fn custom_cap_is_honoured() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pdf = pdf_with_pages(&[(300, 600)]);
        let set = renderer(dir.path())
            .with_max_dimension(100)
            .render_bytes(&pdf)
            .expect("render");
        assert_eq!(page_dimensions(&set), vec![(50, 100)]);
    }

    /// Three letter-size pages; the one at `failing` cannot be rendered.
    struct FlakySource {
        failing: usize,
    }

    impl PagedSource for FlakySource {
        fn page_count(&self) -> usize {
            3
        }

        fn page_size(&self, _index: usize) -> Result<(u32, u32)> {
            Ok((612, 792))
        }

        fn render_page(&self, index: usize, width: u32, height: u32) -> Result<RgbaImage> {
            if index == self.failing {
                return Err(scanshelf_core::ScanshelfError::Pdf("broken content".into()));
            }
            Ok(RgbaImage::from_pixel(width, height, WHITE))
        }
    }

    struct FlakyRasterizer;

    impl PageRasterizer for FlakyRasterizer {
        fn name(&self) -> &'static str {
            "flaky"
        }

        fn with_document(
            &self,
            _data: &[u8],
            visit: &mut dyn FnMut(&dyn PagedSource),
        ) -> Result<()> {
            visit(&FlakySource { failing: 1 });
            Ok(())
        }
    }

    #[test]
    fn failed_page_is_skipped_and_rest_continue() {
        let dir = tempfile::tempdir().expect("tempdir");
        let set = renderer(dir.path())
            .with_rasterizer(Arc::new(FlakyRasterizer))
            .render_bytes(b"%PDF")
            .expect("render");
        assert_eq!(set.len(), 2);
        assert_eq!(set.skipped.len(), 1);
        assert_eq!(set.skipped[0].index, 1);
        assert!(set.skipped[0].reason.contains("broken content"));
    }

    #[test]
    fn oversized_page_is_skipped_and_next_page_renders() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pdf = pdf_with_pages(&[(5_000_000_000, 5_000_000_000), (800, 600)]);
        let set = renderer(dir.path()).render_bytes(&pdf).expect("render");
        assert_eq!(page_dimensions(&set), vec![(800, 600)]);
        assert_eq!(set.skipped.len(), 1);
        assert_eq!(set.skipped[0].index, 0);
    }

    #[test]
    fn huge_cap_cannot_force_a_huge_canvas() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pdf = pdf_with_pages(&[(14_400, 14_400), (200, 100)]);
        let set = renderer(dir.path())
            .with_max_dimension(u32::MAX)
            .render_bytes(&pdf)
            .expect("render");
        assert_eq!(page_dimensions(&set), vec![(200, 100)]);
        assert_eq!(set.skipped[0].index, 0);
    }

    #[test]
    fn unreadable_source_yields_empty_set() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = Locator::from_path(dir.path().join("missing.pdf"));
        assert!(renderer(dir.path()).render(&missing).is_empty());

        let garbage = dir.path().join("garbage.pdf");
        std::fs::write(&garbage, b"%PDF-broken").expect("write");
        assert!(renderer(dir.path()).render(&Locator::from_path(garbage)).is_empty());
    }

    #[test]
    fn assembled_pdf_renders_back_to_same_page_count() {
        let dir = tempfile::tempdir().expect("tempdir");
        let images: Vec<_> = [(30, 40), (50, 20), (64, 64), (10, 90)]
            .iter()
            .enumerate()
            .map(|(i, &(w, h))| {
                let path = dir.path().join(format!("img{i}.png"));
                std::fs::write(&path, crate::image::codec::tests::solid_png(w, h))
                    .expect("write");
                path
            })
            .collect();
        let pdf = crate::pdf::writer::build_pdf(&images).expect("assemble");
        let set = renderer(dir.path()).render_bytes(&pdf).expect("render");
        assert_eq!(set.len(), images.len());
        assert!(page_dimensions(&set).iter().all(|&(w, h)| (w, h) == (595, 842)));
    }
}
