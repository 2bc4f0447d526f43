// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF assembler: compose raster images into a paged PDF, one image per page,
// using `printpdf` 0.8.
//
// Pages are a fixed 595 x 842 pt. Each image is scaled by
// `min(page_w / img_w, page_h / img_h)` (small images are scaled up) and
// centred on its own page.

use std::path::Path;

use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use scanshelf_core::error::{Result, ScanshelfError};
use scanshelf_core::{DocumentFormat, OutputDocument};
use tracing::{debug, info, instrument, warn};

use crate::image::RasterImage;
use crate::output::OutputSink;

/// Page width in points.
pub const PAGE_WIDTH_PT: f32 = 595.0;
/// Page height in points.
pub const PAGE_HEIGHT_PT: f32 = 842.0;

const DOCUMENT_TITLE: &str = "Scanned document";

/// Placement of one image on its page, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// `min(page_w / img_w, page_h / img_h)`; may exceed 1.
    pub scale: f32,
    /// Scaled width, which is also the embedded pixel width.
    pub width: u32,
    /// Scaled height, which is also the embedded pixel height.
    pub height: u32,
    /// Left edge, from the page's left side.
    pub x: f32,
    /// Bottom edge, from the page's bottom (PDF y axis points up).
    pub y: f32,
}

/// Fit `width` x `height` onto the fixed page and centre it.
pub fn place_on_page(width: u32, height: u32) -> Placement {
    let scale = (PAGE_WIDTH_PT / width as f32).min(PAGE_HEIGHT_PT / height as f32);
    let scaled_w = ((width as f32 * scale).round() as u32).max(1);
    let scaled_h = ((height as f32 * scale).round() as u32).max(1);
    Placement {
        scale,
        width: scaled_w,
        height: scaled_h,
        x: (PAGE_WIDTH_PT - scaled_w as f32) / 2.0,
        y: (PAGE_HEIGHT_PT - scaled_h as f32) / 2.0,
    }
}

/// Writes PDFs into `Documents/ScannedDocuments/PDF/`.
#[derive(Debug, Clone)]
pub struct PdfAssembler {
    sink: OutputSink,
}

impl PdfAssembler {
    /// Create an assembler that writes through `sink`.
    pub fn new(sink: OutputSink) -> Self {
        Self { sink }
    }

    /// Build a PDF from `images` (one page each, input order) and write it
    /// as `<name>.pdf`.
    ///
    /// Images that cannot be decoded are logged and left out. Fails with
    /// [`ScanshelfError::EmptyInput`] for an empty list and with
    /// [`ScanshelfError::Decode`] when no image decodes; nothing is written
    /// in either case.
    #[instrument(skip(self, images), fields(count = images.len(), name))]
    pub fn assemble_from_images<P: AsRef<Path>>(
        &self,
        images: &[P],
        name: &str,
    ) -> Result<OutputDocument> {
        let composed = compose(images)?;
        let output = self.sink.write(DocumentFormat::Pdf, name, &composed.bytes)?;
        info!(
            pages = composed.pages,
            skipped = composed.skipped.len(),
            path = %output.path.display(),
            "PDF assembled"
        );
        Ok(output)
    }

    /// Copy an already-paged PDF (e.g. produced by the capture subsystem)
    /// without re-rendering.
    #[instrument(skip(self), fields(source = %source.display()))]
    pub fn copy_existing(&self, source: &Path, name: &str) -> Result<OutputDocument> {
        self.sink.copy_from(DocumentFormat::Pdf, name, source)
    }
}

/// Serialise `images` into PDF bytes, leaving out images that do not
/// decode.
pub fn build_pdf<P: AsRef<Path>>(images: &[P]) -> Result<Vec<u8>> {
    compose(images).map(|composed| composed.bytes)
}

struct Composed {
    bytes: Vec<u8>,
    pages: usize,
    /// Input indices that did not decode.
    skipped: Vec<usize>,
}

fn compose<P: AsRef<Path>>(images: &[P]) -> Result<Composed> {
    if images.is_empty() {
        return Err(ScanshelfError::EmptyInput);
    }

    let page_w = Mm(PAGE_WIDTH_PT * 25.4 / 72.0);
    let page_h = Mm(PAGE_HEIGHT_PT * 25.4 / 72.0);

    let mut doc = PdfDocument::new(DOCUMENT_TITLE);
    let mut pages: Vec<PdfPage> = Vec::with_capacity(images.len());
    let mut skipped = Vec::new();

    for (index, path) in images.iter().enumerate() {
        let source = match RasterImage::open(path) {
            Ok(source) => source,
            Err(err) => {
                warn!(index, error = %err, "Image skipped");
                skipped.push(index);
                continue;
            }
        };
        let placement = place_on_page(source.width(), source.height());
        debug!(index, scale = placement.scale, "Placing image");

        // The pixel buffer is consumed here; only the encoded XObject lives on.
        let rgb = source
            .resize(placement.width, placement.height)
            .flatten_on_white();
        let raw = RawImage {
            width: rgb.width() as usize,
            height: rgb.height() as usize,
            pixels: RawImageData::U8(rgb.into_raw()),
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };
        let xobject_id = doc.add_image(&raw);

        // At 72 dpi one pixel is one point.
        let ops = vec![Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(placement.x)),
                translate_y: Some(Pt(placement.y)),
                scale_x: None,
                scale_y: None,
                dpi: Some(72.0),
                rotate: None,
            },
        }];
        pages.push(PdfPage::new(page_w, page_h, ops));
    }

    if pages.is_empty() {
        return Err(ScanshelfError::Decode(format!(
            "none of the {} images could be decoded",
            images.len()
        )));
    }
    let page_count = pages.len();
    doc.with_pages(pages);

    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
    if !warnings.is_empty() {
        debug!(count = warnings.len(), "printpdf reported warnings");
    }
    Ok(Composed {
        bytes,
        pages: page_count,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::codec::tests::solid_png;
    use scanshelf_core::StorageLayout;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, solid_png(width, height)).expect("write png");
        path
    }

    #[test]
    fn small_images_are_scaled_up_to_fit() {
        let placement = place_on_page(100, 100);
        assert!((placement.scale - 5.95).abs() < 1e-4);
        assert_eq!((placement.width, placement.height), (595, 595));
        assert_eq!(placement.x, 0.0);
        assert_eq!(placement.y, (842.0 - 595.0) / 2.0);
    }

    #[test]
    fn large_images_are_scaled_down_and_centred() {
        let placement = place_on_page(4000, 3000);
        assert!(placement.scale < 1.0);
        assert_eq!(placement.width, 595);
        assert!(placement.x.abs() < 1e-4);
        assert!(placement.y > 0.0);
    }

    #[test]
    fn empty_input_is_rejected() {
        let none: [&Path; 0] = [];
        assert!(matches!(build_pdf(&none), Err(ScanshelfError::EmptyInput)));
    }

    #[test]
    fn one_page_per_image_in_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let images = [
            write_png(dir.path(), "a.png", 30, 40),
            write_png(dir.path(), "b.png", 80, 20),
            write_png(dir.path(), "c.png", 10, 10),
        ];
        let bytes = build_pdf(&images).expect("pdf");
        let doc = lopdf::Document::load_mem(&bytes).expect("parse");
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn undecodable_images_are_left_out() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bad = dir.path().join("bad.png");
        std::fs::write(&bad, b"nope").expect("write");
        let images = [
            write_png(dir.path(), "a.png", 30, 40),
            bad,
            write_png(dir.path(), "c.png", 10, 10),
        ];

        let composed = compose(&images).expect("pdf");
        assert_eq!(composed.pages, 2);
        assert_eq!(composed.skipped, vec![1]);
        let doc = lopdf::Document::load_mem(&composed.bytes).expect("parse");
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn nothing_decodable_writes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bad = dir.path().join("bad.png");
        std::fs::write(&bad, b"nope").expect("write");
        let sink = OutputSink::new(StorageLayout::new(
            dir.path().join("Documents"),
            dir.path().join("Pictures"),
        ));
        let result = PdfAssembler::new(sink.clone()).assemble_from_images(&[bad], "broken");
        assert!(matches!(result, Err(ScanshelfError::Decode(_))));
        assert!(!sink.layout().folder(DocumentFormat::Pdf).exists());
    }

    #[test]
    fn copy_existing_is_byte_exact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("captured.pdf");
        std::fs::write(&source, b"%PDF-1.7 captured bytes").expect("write");
        let sink = OutputSink::new(StorageLayout::new(
            dir.path().join("Documents"),
            dir.path().join("Pictures"),
        ));
        let output = PdfAssembler::new(sink)
            .copy_existing(&source, "copy")
            .expect("copy");
        assert_eq!(output.display_name, "copy.pdf");
        assert_eq!(
            std::fs::read(&output.path).expect("read"),
            b"%PDF-1.7 captured bytes"
        );
    }
}
