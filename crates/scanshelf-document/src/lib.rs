// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanshelf-document: Page rendering and document assembly for Scanshelf.
//
// Renders saved PDFs and DOCX files into page images for preview, and
// assembles captured page images into PDF, DOCX, JPEG or PNG output. Output
// files are written atomically into the format folders of a
// `StorageLayout`; rendered pages go to a scratch `PageCache`.

pub mod cache;
pub mod docx;
pub mod export;
pub mod image;
pub mod integrity;
pub mod output;
pub mod pdf;

// Re-export the primary structs so callers can use `scanshelf_document::PdfAssembler` etc.
pub use cache::PageCache;
pub use docx::{DocxAssembler, DocxImageExtractor};
pub use export::ImageExporter;
pub use crate::image::codec::probe_dimensions;
pub use integrity::{Fingerprint, fingerprint};
pub use output::OutputSink;
pub use pdf::{ImageLayerRasterizer, PageRasterizer, PdfAssembler, PdfPageRenderer};

#[cfg(feature = "pdfium")]
pub use pdf::PdfiumRasterizer;
