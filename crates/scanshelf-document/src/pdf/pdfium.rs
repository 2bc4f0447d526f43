// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDFium rasterizer: full-fidelity page rendering through a PDFium shared
// library. Compiled only with the "pdfium" feature.

use image::RgbaImage;
use pdfium_render::prelude::*;
use scanshelf_core::error::{Result, ScanshelfError};
use tracing::{debug, instrument};

use super::raster::{PageRasterizer, PagedSource, ensure_canvas_fits};

/// Rasterizer backed by PDFium.
///
/// The library is bound per document: bindings, document and pages all live
/// inside one `with_document` call.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfiumRasterizer;

impl PdfiumRasterizer {
    fn bind() -> Result<Pdfium> {
        let bindings =
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library())
                .map_err(|err| ScanshelfError::Pdf(format!("PDFium not loadable: {err}")))?;
        Ok(Pdfium::new(bindings))
    }

    /// Whether a PDFium library can be bound on this machine.
    pub fn is_available() -> bool {
        Self::bind().is_ok()
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn name(&self) -> &'static str {
        "pdfium"
    }

    #[instrument(skip_all, fields(bytes_len = data.len()))]
    fn with_document(&self, data: &[u8], visit: &mut dyn FnMut(&dyn PagedSource)) -> Result<()> {
        let pdfium = Self::bind()?;
        let document = pdfium
            .load_pdf_from_byte_slice(data, None)
            .map_err(|err| ScanshelfError::Pdf(format!("PDFium failed to open PDF: {err}")))?;
        debug!(pages = document.pages().len(), "PDF opened with PDFium");
        visit(&PdfiumSource {
            document: &document,
        });
        Ok(())
    }
}

struct PdfiumSource<'doc, 'lib> {
    document: &'doc PdfDocument<'lib>,
}

impl<'doc, 'lib> PdfiumSource<'doc, 'lib> {
    fn page(&self, index: usize) -> Result<PdfPage<'lib>> {
        let index = PdfPageIndex::try_from(index)
            .map_err(|_| ScanshelfError::Pdf(format!("page index {index} out of range")))?;
        self.document
            .pages()
            .get(index)
            .map_err(|err| ScanshelfError::Pdf(format!("cannot load page {index}: {err}")))
    }
}

impl PagedSource for PdfiumSource<'_, '_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page_size(&self, index: usize) -> Result<(u32, u32)> {
        let page = self.page(index)?;
        let width = page.width().value.round().max(1.0) as u32;
        let height = page.height().value.round().max(1.0) as u32;
        Ok((width, height))
    }

    fn render_page(&self, index: usize, width: u32, height: u32) -> Result<RgbaImage> {
        ensure_canvas_fits(width, height)?;
        let page = self.page(index)?;
        let bitmap = page
            .render_with_config(
                &PdfRenderConfig::new()
                    .set_target_width(width as i32)
                    .set_target_height(height as i32),
            )
            .map_err(|err| ScanshelfError::Pdf(format!("PDFium render failed: {err}")))?;
        Ok(bitmap.as_image().to_rgba8())
    }
}
