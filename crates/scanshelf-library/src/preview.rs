// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preview dispatch: picks the page renderer for a document's format.

use tracing::{instrument, warn};

use scanshelf_core::types::{DocumentFormat, Locator, PageImageSet, ScannedDocument};
use scanshelf_document::{DocxImageExtractor, PageCache, PdfPageRenderer, probe_dimensions};

/// Renders saved documents into page images.
#[derive(Debug, Clone)]
pub struct Previewer {
    pdf: PdfPageRenderer,
    docx: DocxImageExtractor,
}

impl Previewer {
    /// Previewer rendering into `cache`, PDF pages capped at `max_dimension`.
    pub fn new(cache: PageCache, max_dimension: u32) -> Self {
        Self {
            pdf: PdfPageRenderer::new(cache.clone()).with_max_dimension(max_dimension),
            docx: DocxImageExtractor::new(cache),
        }
    }

    /// Swap the PDF renderer (e.g. to force a rasterizer backend).
    pub fn with_pdf_renderer(mut self, pdf: PdfPageRenderer) -> Self {
        self.pdf = pdf;
        self
    }

    /// Page images of `document` in display order. Empty when the document
    /// cannot be opened.
    #[instrument(skip(self), fields(format = %document.format, name = %document.display_name))]
    pub fn render(&self, document: &ScannedDocument) -> PageImageSet {
        match document.format {
            DocumentFormat::Pdf => self.pdf.render(&document.locator),
            DocumentFormat::Docx => self.docx.render(&document.locator),
            DocumentFormat::Jpeg | DocumentFormat::Png => single_image(&document.locator),
        }
    }
}

/// A saved picture is its own single page, once its header checks out.
fn single_image(locator: &Locator) -> PageImageSet {
    let checked = std::fs::read(locator.as_path())
        .map_err(scanshelf_core::ScanshelfError::from)
        .and_then(|data| probe_dimensions(&data));
    match checked {
        Ok(_) => PageImageSet::from_pages(vec![locator.clone()]),
        Err(err) => {
            warn!(locator = %locator, error = %err, "Picture not previewable");
            let mut set = PageImageSet::new();
            set.skip(0, err.to_string());
            set
        }
    }
}
