// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// DOCX assembler: writes a WordprocessingML package with one centred inline
// picture per paragraph, each followed by an empty paragraph.
//
// The package is built directly with `zip` and `quick-xml`:
//
//   [Content_Types].xml
//   _rels/.rels
//   word/document.xml
//   word/_rels/document.xml.rels
//   word/media/image<N>.jpeg

use std::io::{Cursor, Seek, Write};
use std::path::Path;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use scanshelf_core::error::{Result, ScanshelfError};
use scanshelf_core::{DocumentFormat, OutputDocument};
use tracing::{debug, info, instrument, warn};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::image::{JpegQuality, RasterImage};
use crate::output::OutputSink;

// -- Page geometry ------------------------------------------------------------

/// English Metric Units per point.
pub const EMU_PER_POINT: f64 = 12_700.0;

/// A4 page, 8.27" x 11.69", in EMU.
pub const PAGE_WIDTH_EMU: i64 = 7_562_088;
pub const PAGE_HEIGHT_EMU: i64 = 10_689_336;
/// One-inch margins.
pub const MARGIN_EMU: i64 = 914_400;

pub const MAX_WIDTH_EMU: i64 = PAGE_WIDTH_EMU - 2 * MARGIN_EMU;
pub const MAX_HEIGHT_EMU: i64 = PAGE_HEIGHT_EMU - 2 * MARGIN_EMU;

// Same page in twentieths of a point for <w:sectPr>.
const PAGE_WIDTH_TWIPS: &str = "11909";
const PAGE_HEIGHT_TWIPS: &str = "16834";
const MARGIN_TWIPS: &str = "1440";

// -- Namespaces ---------------------------------------------------------------

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const NS_PACKAGE_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const CT_DOCUMENT_MAIN: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
const CT_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";

/// Displayed size of one picture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    /// Applied scale, never above 1.
    pub scale: f64,
    /// Width in EMU.
    pub cx: i64,
    /// Height in EMU.
    pub cy: i64,
}

/// Fit a `width` x `height` pixel image into the printable area, never
/// scaling up.
pub fn fit_extent(width: u32, height: u32) -> Extent {
    let width_emu = width as f64 * EMU_PER_POINT;
    let height_emu = height as f64 * EMU_PER_POINT;
    let scale = (MAX_WIDTH_EMU as f64 / width_emu)
        .min(MAX_HEIGHT_EMU as f64 / height_emu)
        .min(1.0);
    Extent {
        scale,
        cx: (width_emu * scale) as i64,
        cy: (height_emu * scale) as i64,
    }
}

/// Writes DOCX files into `Documents/ScannedDocuments/DOCX/`.
#[derive(Debug, Clone)]
pub struct DocxAssembler {
    sink: OutputSink,
}

impl DocxAssembler {
    /// Create an assembler that writes through `sink`.
    pub fn new(sink: OutputSink) -> Self {
        Self { sink }
    }

    /// Build a DOCX from `images` (one picture block each, input order) and
    /// write it as `<name>.docx`.
    ///
    /// Images that cannot be decoded are logged and left out; when none
    /// decodes the call fails with [`ScanshelfError::Decode`] and nothing is
    /// written.
    #[instrument(skip(self, images), fields(count = images.len()))]
    pub fn assemble_from_images<P: AsRef<Path>>(
        &self,
        images: &[P],
        name: &str,
    ) -> Result<OutputDocument> {
        let bytes = build_docx(images)?;
        let output = self.sink.write(DocumentFormat::Docx, name, &bytes)?;
        info!(
            pictures = images.len(),
            path = %output.path.display(),
            "DOCX assembled"
        );
        Ok(output)
    }
}

struct Picture {
    jpeg: Vec<u8>,
    extent: Extent,
}

/// Serialise `images` into a DOCX package, leaving out images that do not
/// decode.
pub fn build_docx<P: AsRef<Path>>(images: &[P]) -> Result<Vec<u8>> {
    if images.is_empty() {
        return Err(ScanshelfError::EmptyInput);
    }

    let mut pictures = Vec::with_capacity(images.len());
    for (index, path) in images.iter().enumerate() {
        let image = match RasterImage::open(path) {
            Ok(image) => image,
            Err(err) => {
                warn!(index, error = %err, "Image skipped");
                continue;
            }
        };
        let extent = fit_extent(image.width(), image.height());
        debug!(index, scale = extent.scale, "Picture sized");
        pictures.push(Picture {
            jpeg: image.to_jpeg_bytes(JpegQuality::DOCX_EMBED)?,
            extent,
        });
    }

    if pictures.is_empty() {
        return Err(ScanshelfError::Decode(format!(
            "none of the {} images could be decoded",
            images.len()
        )));
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    write_part(&mut zip, "[Content_Types].xml", &content_types_xml()?)?;
    write_part(&mut zip, "_rels/.rels", &package_rels_xml()?)?;
    write_part(&mut zip, "word/document.xml", &document_xml(&pictures)?)?;
    write_part(
        &mut zip,
        "word/_rels/document.xml.rels",
        &document_rels_xml(pictures.len())?,
    )?;
    for (index, picture) in pictures.iter().enumerate() {
        write_part(&mut zip, &media_name(index), &picture.jpeg)?;
    }

    let cursor = zip
        .finish()
        .map_err(|err| ScanshelfError::Docx(format!("cannot finish package: {err}")))?;
    Ok(cursor.into_inner())
}

fn write_part<W: Write + Seek>(zip: &mut ZipWriter<W>, name: &str, data: &[u8]) -> Result<()> {
    zip.start_file(name, SimpleFileOptions::default())
        .map_err(|err| ScanshelfError::Docx(format!("cannot add {name}: {err}")))?;
    zip.write_all(data)?;
    Ok(())
}

fn media_name(index: usize) -> String {
    format!("word/media/image{}.jpeg", index + 1)
}

fn relationship_id(index: usize) -> String {
    format!("rId{}", index + 1)
}

// -- XML parts ----------------------------------------------------------------

/// Thin event writer over an in-memory buffer.
struct Xml {
    writer: Writer<Vec<u8>>,
}

impl Xml {
    fn new() -> Result<Self> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(xml_error)?;
        Ok(Self { writer })
    }

    fn open(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<&mut Self> {
        let element = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.writer
            .write_event(Event::Start(element))
            .map_err(xml_error)?;
        Ok(self)
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<&mut Self> {
        let element = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.writer
            .write_event(Event::Empty(element))
            .map_err(xml_error)?;
        Ok(self)
    }

    fn close(&mut self, name: &str) -> Result<&mut Self> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_error)?;
        Ok(self)
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

fn xml_error(err: quick_xml::Error) -> ScanshelfError {
    ScanshelfError::Docx(format!("XML write failed: {err}"))
}

fn content_types_xml() -> Result<Vec<u8>> {
    let mut xml = Xml::new()?;
    xml.open("Types", &[("xmlns", NS_CONTENT_TYPES)])?
        .empty(
            "Default",
            &[("Extension", "rels"), ("ContentType", CT_RELATIONSHIPS)],
        )?
        .empty(
            "Default",
            &[("Extension", "xml"), ("ContentType", "application/xml")],
        )?
        .empty(
            "Default",
            &[("Extension", "jpeg"), ("ContentType", "image/jpeg")],
        )?
        .empty(
            "Override",
            &[
                ("PartName", "/word/document.xml"),
                ("ContentType", CT_DOCUMENT_MAIN),
            ],
        )?
        .close("Types")?;
    Ok(xml.finish())
}

fn package_rels_xml() -> Result<Vec<u8>> {
    let mut xml = Xml::new()?;
    xml.open("Relationships", &[("xmlns", NS_PACKAGE_RELS)])?
        .empty(
            "Relationship",
            &[
                ("Id", "rId1"),
                ("Type", REL_OFFICE_DOCUMENT),
                ("Target", "word/document.xml"),
            ],
        )?
        .close("Relationships")?;
    Ok(xml.finish())
}

fn document_rels_xml(count: usize) -> Result<Vec<u8>> {
    let mut xml = Xml::new()?;
    xml.open("Relationships", &[("xmlns", NS_PACKAGE_RELS)])?;
    for index in 0..count {
        let id = relationship_id(index);
        let target = format!("media/image{}.jpeg", index + 1);
        xml.empty(
            "Relationship",
            &[("Id", &id), ("Type", REL_IMAGE), ("Target", &target)],
        )?;
    }
    xml.close("Relationships")?;
    Ok(xml.finish())
}

fn document_xml(pictures: &[Picture]) -> Result<Vec<u8>> {
    let mut xml = Xml::new()?;
    xml.open(
        "w:document",
        &[
            ("xmlns:w", NS_W),
            ("xmlns:r", NS_R),
            ("xmlns:wp", NS_WP),
            ("xmlns:a", NS_A),
            ("xmlns:pic", NS_PIC),
        ],
    )?
    .open("w:body", &[])?;

    for (index, picture) in pictures.iter().enumerate() {
        picture_paragraph(&mut xml, index, &picture.extent)?;
        xml.empty("w:p", &[])?;
    }

    xml.open("w:sectPr", &[])?
        .empty(
            "w:pgSz",
            &[("w:w", PAGE_WIDTH_TWIPS), ("w:h", PAGE_HEIGHT_TWIPS)],
        )?
        .empty(
            "w:pgMar",
            &[
                ("w:top", MARGIN_TWIPS),
                ("w:right", MARGIN_TWIPS),
                ("w:bottom", MARGIN_TWIPS),
                ("w:left", MARGIN_TWIPS),
                ("w:header", "720"),
                ("w:footer", "720"),
                ("w:gutter", "0"),
            ],
        )?
        .close("w:sectPr")?
        .close("w:body")?
        .close("w:document")?;
    Ok(xml.finish())
}

/// `<w:p>` holding one centred inline picture.
fn picture_paragraph(xml: &mut Xml, index: usize, extent: &Extent) -> Result<()> {
    let doc_pr_id = (index + 1).to_string();
    let name = format!("Picture {}", index + 1);
    let file_name = format!("image{}.jpeg", index + 1);
    let rel_id = relationship_id(index);
    let cx = extent.cx.to_string();
    let cy = extent.cy.to_string();

    xml.open("w:p", &[])?
        .open("w:pPr", &[])?
        .empty("w:jc", &[("w:val", "center")])?
        .close("w:pPr")?
        .open("w:r", &[])?
        .open("w:drawing", &[])?
        .open(
            "wp:inline",
            &[("distT", "0"), ("distB", "0"), ("distL", "0"), ("distR", "0")],
        )?
        .empty("wp:extent", &[("cx", &cx), ("cy", &cy)])?
        .empty("wp:docPr", &[("id", &doc_pr_id), ("name", &name)])?
        .open("a:graphic", &[])?
        .open("a:graphicData", &[("uri", NS_PIC)])?
        .open("pic:pic", &[])?
        .open("pic:nvPicPr", &[])?
        .empty("pic:cNvPr", &[("id", &doc_pr_id), ("name", &file_name)])?
        .empty("pic:cNvPicPr", &[])?
        .close("pic:nvPicPr")?
        .open("pic:blipFill", &[])?
        .empty("a:blip", &[("r:embed", &rel_id)])?
        .open("a:stretch", &[])?
        .empty("a:fillRect", &[])?
        .close("a:stretch")?
        .close("pic:blipFill")?
        .open("pic:spPr", &[])?
        .open("a:xfrm", &[])?
        .empty("a:off", &[("x", "0"), ("y", "0")])?
        .empty("a:ext", &[("cx", &cx), ("cy", &cy)])?
        .close("a:xfrm")?
        .open("a:prstGeom", &[("prst", "rect")])?
        .empty("a:avLst", &[])?
        .close("a:prstGeom")?
        .close("pic:spPr")?
        .close("pic:pic")?
        .close("a:graphicData")?
        .close("a:graphic")?
        .close("wp:inline")?
        .close("w:drawing")?
        .close("w:r")?
        .close("w:p")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::PageCache;
    use crate::docx::extract::DocxImageExtractor;
    use crate::image::codec::tests::solid_png;
    use scanshelf_core::StorageLayout;
    use std::io::Read;
    use std::path::PathBuf;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, solid_png(width, height)).expect("write png");
        path
    }

    fn read_entry(docx: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(docx)).expect("zip");
        let mut entry = archive.by_name(name).expect("entry");
        let mut text = String::new();
        entry.read_to_string(&mut text).expect("utf-8");
        text
    }

    #[test]
    fn printable_area_matches_a4_with_inch_margins() {
        assert_eq!(MAX_WIDTH_EMU, 5_733_288);
        assert_eq!(MAX_HEIGHT_EMU, 8_860_536);
    }

    #[test]
    fn small_images_keep_native_size() {
        let extent = fit_extent(200, 100);
        assert_eq!(extent.scale, 1.0);
        assert_eq!((extent.cx, extent.cy), (200 * 12_700, 100 * 12_700));
    }

    #[test]
    fn large_images_are_scaled_down_into_area() {
        let extent = fit_extent(4000, 3000);
        assert!(extent.scale < 1.0);
        assert!(extent.cx <= MAX_WIDTH_EMU);
        assert!(extent.cy <= MAX_HEIGHT_EMU);

        let tall = fit_extent(500, 5000);
        assert!(tall.cy <= MAX_HEIGHT_EMU);
        assert!(tall.cx < 500 * 12_700);
    }

    #[test]
    fn empty_input_is_rejected() {
        let none: [&Path; 0] = [];
        assert!(matches!(build_docx(&none), Err(ScanshelfError::EmptyInput)));
    }

    #[test]
    fn one_block_per_image_in_input_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let images = [
            write_png(dir.path(), "a.png", 20, 10),
            write_png(dir.path(), "b.png", 10, 30),
        ];
        let docx = build_docx(&images).expect("docx");
        let document = read_entry(&docx, "word/document.xml");

        assert_eq!(document.matches("<pic:pic>").count(), 2);
        assert_eq!(document.matches("<w:p/>").count(), 2);
        assert_eq!(document.matches(r#"<w:jc w:val="center"/>"#).count(), 2);
        let first = document.find(r#"r:embed="rId1""#).expect("rId1");
        let second = document.find(r#"r:embed="rId2""#).expect("rId2");
        assert!(first < second);
        assert!(document.contains(r#"cx="254000" cy="127000""#));

        let types = read_entry(&docx, "[Content_Types].xml");
        assert!(types.contains(r#"Extension="jpeg" ContentType="image/jpeg""#));
    }

    #[test]
    fn undecodable_images_are_left_out() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bad = dir.path().join("bad.png");
        std::fs::write(&bad, b"nope").expect("write");
        let images = [
            write_png(dir.path(), "a.png", 20, 10),
            bad.clone(),
            write_png(dir.path(), "c.png", 10, 30),
        ];
        let docx = build_docx(&images).expect("docx");
        let document = read_entry(&docx, "word/document.xml");
        assert_eq!(document.matches("<pic:pic>").count(), 2);
        assert!(document.contains(r#"cx="254000" cy="127000""#));

        assert!(matches!(build_docx(&[bad]), Err(ScanshelfError::Decode(_))));
    }

    #[test]
    fn written_docx_extracts_back_to_same_pictures() {
        let dir = tempfile::tempdir().expect("tempdir");
        let images = [
            write_png(dir.path(), "a.png", 20, 10),
            write_png(dir.path(), "b.png", 10, 30),
            write_png(dir.path(), "c.png", 16, 16),
        ];
        let sink = OutputSink::new(StorageLayout::new(
            dir.path().join("Documents"),
            dir.path().join("Pictures"),
        ));
        let output = DocxAssembler::new(sink)
            .assemble_from_images(&images, "report")
            .expect("assemble");
        assert_eq!(output.display_name, "report.docx");

        let extracted = DocxImageExtractor::new(PageCache::new(dir.path().join("cache")))
            .render(&output.locator());
        assert_eq!(extracted.len(), 3);
        assert!(extracted
            .pages
            .iter()
            .all(|page| page.as_path().extension().is_some_and(|ext| ext == "jpg")));
    }
}
