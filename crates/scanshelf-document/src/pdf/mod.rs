// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: page rendering (pluggable rasterizers) and assembly.

#[cfg(feature = "pdfium")]
pub mod pdfium;
pub mod raster;
pub mod render;
pub mod writer;

#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumRasterizer;
pub use raster::{ImageLayerRasterizer, PageRasterizer, PagedSource};
pub use render::PdfPageRenderer;
pub use writer::PdfAssembler;
