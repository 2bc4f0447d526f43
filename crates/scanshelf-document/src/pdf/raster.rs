// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF rasterizer backends.
//
// A rasterizer opens a document for the duration of one closure call and
// hands the closure a `PagedSource`; document and page handles are owned by
// that scope and released on every exit path.
//
// `ImageLayerRasterizer` is the built-in backend: it walks each page's
// content stream with `lopdf`, tracks the current transformation matrix, and
// paints image XObjects (the only content scanner-produced PDFs carry) with
// `imageproc`'s affine warp. Text and vector paths are not painted.

use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use scanshelf_core::error::{Result, ScanshelfError};
use tracing::{debug, instrument, warn};

/// US Letter, used when a page tree carries no MediaBox at all.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Guards Parent chains and nested forms against cycles.
const MAX_DEPTH: usize = 32;

/// Largest canvas a single page may allocate (64 Mpx, 256 MiB of RGBA).
pub const MAX_CANVAS_PIXELS: u64 = 64 * 1024 * 1024;

pub(crate) const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// An opened paged document.
pub trait PagedSource {
    fn page_count(&self) -> usize;

    /// Native pixel size of page `index`, at one pixel per point, with the
    /// page's rotation applied.
    fn page_size(&self, index: usize) -> Result<(u32, u32)>;

    /// Render page `index` into a `width` x `height` buffer.
    fn render_page(&self, index: usize, width: u32, height: u32) -> Result<RgbaImage>;
}

/// Opens paged documents for rendering.
pub trait PageRasterizer: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Open `data`, call `visit` with the opened source, then close it.
    ///
    /// Fails only when the document cannot be opened at all.
    fn with_document(&self, data: &[u8], visit: &mut dyn FnMut(&dyn PagedSource)) -> Result<()>;
}

/// Refuse canvases larger than [`MAX_CANVAS_PIXELS`] before allocating.
pub fn ensure_canvas_fits(width: u32, height: u32) -> Result<()> {
    let pixels = width as u64 * height as u64;
    if pixels > MAX_CANVAS_PIXELS {
        return Err(ScanshelfError::Pdf(format!(
            "page canvas {width}x{height} exceeds {MAX_CANVAS_PIXELS} pixels"
        )));
    }
    Ok(())
}

// -- Built-in backend ---------------------------------------------------------

/// Pure-Rust rasterizer for image-based PDFs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageLayerRasterizer;

impl PageRasterizer for ImageLayerRasterizer {
    fn name(&self) -> &'static str {
        "image-layer"
    }

    #[instrument(skip_all, fields(bytes_len = data.len()))]
    fn with_document(&self, data: &[u8], visit: &mut dyn FnMut(&dyn PagedSource)) -> Result<()> {
        let document = Document::load_mem(data)
            .map_err(|err| ScanshelfError::Pdf(format!("failed to open PDF: {err}")))?;
        let source = LopdfSource::new(document);
        debug!(pages = source.pages.len(), "PDF opened");
        visit(&source);
        Ok(())
    }
}

struct LopdfSource {
    document: Document,
    pages: Vec<ObjectId>,
}

/// Page box and rotation, resolved through the page tree.
#[derive(Debug, Clone, Copy)]
struct PageGeometry {
    llx: f32,
    lly: f32,
    urx: f32,
    ury: f32,
    /// Clockwise quarter turns (0..=3).
    quarter_turns: u8,
}

impl PageGeometry {
    fn width(&self) -> f32 {
        self.urx - self.llx
    }

    fn height(&self) -> f32 {
        self.ury - self.lly
    }

    fn is_sideways(&self) -> bool {
        self.quarter_turns % 2 == 1
    }
}

impl LopdfSource {
    fn new(document: Document) -> Self {
        // get_pages is keyed by 1-based page number, already in order.
        let pages = document.get_pages().into_values().collect();
        Self { document, pages }
    }

    fn page_id(&self, index: usize) -> Result<ObjectId> {
        self.pages.get(index).copied().ok_or_else(|| {
            ScanshelfError::Pdf(format!(
                "page {index} out of range (document has {} pages)",
                self.pages.len()
            ))
        })
    }

    fn geometry(&self, page_id: ObjectId) -> PageGeometry {
        let media_box = inherited(&self.document, page_id, b"MediaBox")
            .and_then(|obj| obj.as_array().ok())
            .and_then(|items| {
                let numbers: Vec<f32> = items
                    .iter()
                    .filter_map(|item| resolve(&self.document, item).as_float().ok())
                    .collect();
                <[f32; 4]>::try_from(numbers).ok()
            })
            .unwrap_or(DEFAULT_MEDIA_BOX);

        let rotate = inherited(&self.document, page_id, b"Rotate")
            .and_then(|obj| obj.as_i64().ok())
            .unwrap_or(0);

        PageGeometry {
            llx: media_box[0].min(media_box[2]),
            lly: media_box[1].min(media_box[3]),
            urx: media_box[0].max(media_box[2]),
            ury: media_box[1].max(media_box[3]),
            quarter_turns: (rotate.rem_euclid(360) / 90) as u8,
        }
    }

    /// Run a content stream against `canvas`.
    fn paint_operations(
        &self,
        operations: &[Operation],
        resources: Option<&Dictionary>,
        base: Matrix,
        device: &DeviceSpace,
        canvas: &mut RgbaImage,
        depth: usize,
    ) {
        let mut ctm = base;
        let mut saved: Vec<Matrix> = Vec::new();

        for operation in operations {
            match operation.operator.as_str() {
                "q" => saved.push(ctm),
                "Q" => {
                    if let Some(previous) = saved.pop() {
                        ctm = previous;
                    }
                }
                "cm" => match Matrix::from_operands(&self.document, &operation.operands) {
                    Some(matrix) => ctm = matrix.then(&ctm),
                    None => warn!("Ignoring malformed cm operator"),
                },
                "Do" => {
                    let Some(name) = operation.operands.first().and_then(|o| o.as_name().ok())
                    else {
                        continue;
                    };
                    self.paint_xobject(name, resources, ctm, device, canvas, depth);
                }
                _ => {}
            }
        }
    }

    fn paint_xobject(
        &self,
        name: &[u8],
        resources: Option<&Dictionary>,
        ctm: Matrix,
        device: &DeviceSpace,
        canvas: &mut RgbaImage,
        depth: usize,
    ) {
        let Some(stream) = resources
            .and_then(|res| res.get(b"XObject").ok())
            .and_then(|obj| resolve(&self.document, obj).as_dict().ok())
            .and_then(|xobjects| xobjects.get(name).ok())
            .and_then(|obj| resolve(&self.document, obj).as_stream().ok())
        else {
            warn!(name = %String::from_utf8_lossy(name), "XObject not found in resources");
            return;
        };

        let subtype = stream
            .dict
            .get(b"Subtype")
            .ok()
            .and_then(|obj| obj.as_name().ok())
            .unwrap_or_default();

        match subtype {
            b"Image" => match decode_image_xobject(&self.document, stream) {
                Ok(image) => paint_image(canvas, &image, ctm, device),
                Err(err) => warn!(
                    name = %String::from_utf8_lossy(name),
                    error = %err,
                    "Image XObject not painted"
                ),
            },
            b"Form" if depth < MAX_DEPTH => {
                let bytes = match stream_bytes(stream) {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        warn!(error = %err, "Form XObject unreadable");
                        return;
                    }
                };
                let content = match Content::decode(&bytes) {
                    Ok(content) => content,
                    Err(err) => {
                        warn!(error = %err, "Form XObject content malformed");
                        return;
                    }
                };
                let form_matrix = stream
                    .dict
                    .get(b"Matrix")
                    .ok()
                    .and_then(|obj| resolve(&self.document, obj).as_array().ok())
                    .and_then(|items| Matrix::from_operands(&self.document, items))
                    .unwrap_or(Matrix::IDENTITY);
                let form_resources = stream
                    .dict
                    .get(b"Resources")
                    .ok()
                    .and_then(|obj| resolve(&self.document, obj).as_dict().ok())
                    .or(resources);
                self.paint_operations(
                    &content.operations,
                    form_resources,
                    form_matrix.then(&ctm),
                    device,
                    canvas,
                    depth + 1,
                );
            }
            other => debug!(subtype = %String::from_utf8_lossy(other), "XObject skipped"),
        }
    }
}

impl PagedSource for LopdfSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_size(&self, index: usize) -> Result<(u32, u32)> {
        let geometry = self.geometry(self.page_id(index)?);
        let representable = |extent: f32| extent.is_finite() && extent < u32::MAX as f32;
        if !(representable(geometry.width()) && representable(geometry.height())) {
            return Err(ScanshelfError::Pdf(format!(
                "page {index} MediaBox {}x{} out of range",
                geometry.width(),
                geometry.height()
            )));
        }
        let width = geometry.width().round().max(1.0) as u32;
        let height = geometry.height().round().max(1.0) as u32;
        if geometry.is_sideways() {
            Ok((height, width))
        } else {
            Ok((width, height))
        }
    }

    #[instrument(skip(self))]
    fn render_page(&self, index: usize, width: u32, height: u32) -> Result<RgbaImage> {
        ensure_canvas_fits(width, height)?;
        let page_id = self.page_id(index)?;
        let geometry = self.geometry(page_id);

        // Paint upright, then apply /Rotate.
        let (upright_w, upright_h) = if geometry.is_sideways() {
            (height.max(1), width.max(1))
        } else {
            (width.max(1), height.max(1))
        };

        let raw = self
            .document
            .get_page_content(page_id)
            .map_err(|err| ScanshelfError::Pdf(format!("page {index} content: {err}")))?;
        let content = Content::decode(&raw)
            .map_err(|err| ScanshelfError::Pdf(format!("page {index} content stream: {err}")))?;

        let resources = inherited(&self.document, page_id, b"Resources")
            .and_then(|obj| obj.as_dict().ok());

        let device = DeviceSpace {
            origin_x: geometry.llx,
            top_y: geometry.ury,
            scale_x: upright_w as f32 / geometry.width().max(f32::EPSILON),
            scale_y: upright_h as f32 / geometry.height().max(f32::EPSILON),
        };

        let mut canvas = RgbaImage::from_pixel(upright_w, upright_h, WHITE);
        self.paint_operations(
            &content.operations,
            resources,
            Matrix::IDENTITY,
            &device,
            &mut canvas,
            0,
        );

        let rotated = match geometry.quarter_turns {
            1 => imageops::rotate90(&canvas),
            2 => imageops::rotate180(&canvas),
            3 => imageops::rotate270(&canvas),
            _ => canvas,
        };

        // Rounding in page_size can leave the rotated canvas a pixel off.
        if rotated.dimensions() == (width, height) {
            Ok(rotated)
        } else {
            Ok(imageops::resize(&rotated, width, height, FilterType::Triangle))
        }
    }
}

// -- Geometry -----------------------------------------------------------------

/// A PDF affine matrix `[a b c d e f]`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f32; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn from_operands(document: &Document, operands: &[Object]) -> Option<Self> {
        if operands.len() != 6 {
            return None;
        }
        let mut values = [0.0f32; 6];
        for (slot, operand) in values.iter_mut().zip(operands) {
            *slot = resolve(document, operand).as_float().ok()?;
        }
        Some(Self(values))
    }

    /// `self` applied first, then `outer` (PDF's `self × outer`).
    fn then(&self, outer: &Matrix) -> Matrix {
        let [a, b, c, d, e, f] = self.0;
        let [oa, ob, oc, od, oe, of] = outer.0;
        Matrix([
            a * oa + b * oc,
            a * ob + b * od,
            c * oa + d * oc,
            c * ob + d * od,
            e * oa + f * oc + oe,
            e * ob + f * od + of,
        ])
    }
}

/// Maps PDF user space onto the upright canvas (y axis flipped).
#[derive(Debug, Clone, Copy)]
struct DeviceSpace {
    origin_x: f32,
    top_y: f32,
    scale_x: f32,
    scale_y: f32,
}

/// Draw `image` (occupying the unit square in image space) through `ctm`.
fn paint_image(canvas: &mut RgbaImage, image: &RgbaImage, ctm: Matrix, device: &DeviceSpace) {
    let (w, h) = (image.width() as f32, image.height() as f32);
    let [a, b, c, d, e, f] = ctm.0;
    let DeviceSpace {
        origin_x,
        top_y,
        scale_x: sx,
        scale_y: sy,
    } = *device;

    // Source pixel (u, v) -> canvas pixel, as a row-major 3x3 matrix.
    let mut m = [
        sx * a / w,
        -sx * c / h,
        sx * (c + e - origin_x),
        -sy * b / w,
        sy * d / h,
        sy * (top_y - d - f),
        0.0,
        0.0,
        1.0,
    ];

    let corners = [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)].map(|(u, v)| {
        (m[0] * u + m[1] * v + m[2], m[3] * u + m[4] * v + m[5])
    });
    let min_x = corners.iter().map(|p| p.0).fold(f32::INFINITY, f32::min).floor().max(0.0);
    let min_y = corners.iter().map(|p| p.1).fold(f32::INFINITY, f32::min).floor().max(0.0);
    let max_x = corners
        .iter()
        .map(|p| p.0)
        .fold(f32::NEG_INFINITY, f32::max)
        .ceil()
        .min(canvas.width() as f32);
    let max_y = corners
        .iter()
        .map(|p| p.1)
        .fold(f32::NEG_INFINITY, f32::max)
        .ceil()
        .min(canvas.height() as f32);
    if !(max_x > min_x && max_y > min_y) {
        debug!("Image lies outside the page");
        return;
    }

    // Warp only the covered region.
    m[2] -= min_x;
    m[5] -= min_y;
    let Some(projection) = Projection::from_matrix(m) else {
        warn!("Degenerate image transform, not painted");
        return;
    };

    let mut layer = RgbaImage::new((max_x - min_x) as u32, (max_y - min_y) as u32);
    warp_into(image, &projection, Interpolation::Bilinear, TRANSPARENT, &mut layer);
    imageops::overlay(canvas, &layer, min_x as i64, min_y as i64);
}

// -- Object helpers -----------------------------------------------------------

/// Follow one level of indirection.
fn resolve<'a>(document: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => document.get_object(*id).unwrap_or(object),
        other => other,
    }
}

/// Look `key` up on a page node, walking up the page tree for inheritable
/// attributes.
fn inherited<'a>(document: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = document.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(resolve(document, value));
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = document.get_dictionary(parent).ok()?;
    }
    None
}

fn filter_names(stream: &Stream) -> Vec<Vec<u8>> {
    match stream.dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_name().ok().map(<[u8]>::to_vec))
            .collect(),
        _ => Vec::new(),
    }
}

/// Stream payload with general-purpose compression removed.
fn stream_bytes(stream: &Stream) -> Result<Vec<u8>> {
    if filter_names(stream).is_empty() {
        return Ok(stream.content.clone());
    }
    stream
        .decompressed_content()
        .map_err(|err| ScanshelfError::Pdf(format!("cannot decompress stream: {err}")))
}

/// Number of colour components of an image's colour space.
fn colour_components(document: &Document, colour_space: Option<&Object>) -> Result<usize> {
    let Some(colour_space) = colour_space.map(|obj| resolve(document, obj)) else {
        return Err(ScanshelfError::Pdf("image has no colour space".into()));
    };
    let family = match colour_space {
        Object::Name(name) => name.as_slice(),
        Object::Array(items) => items
            .first()
            .and_then(|obj| obj.as_name().ok())
            .unwrap_or_default(),
        _ => b"",
    };
    match family {
        b"DeviceGray" | b"CalGray" | b"G" => Ok(1),
        b"DeviceRGB" | b"CalRGB" | b"RGB" => Ok(3),
        b"DeviceCMYK" | b"CMYK" => Ok(4),
        b"ICCBased" => {
            let components = colour_space
                .as_array()
                .ok()
                .and_then(|items| items.get(1))
                .and_then(|obj| resolve(document, obj).as_stream().ok())
                .and_then(|profile| profile.dict.get(b"N").ok())
                .and_then(|n| n.as_i64().ok());
            match components {
                Some(n @ (1 | 3 | 4)) => Ok(n as usize),
                _ => Err(ScanshelfError::Pdf("ICC profile without usable /N".into())),
            }
        }
        other => Err(ScanshelfError::UnsupportedFormat(format!(
            "colour space {}",
            String::from_utf8_lossy(other)
        ))),
    }
}

/// Decode an image XObject into RGBA pixels.
fn decode_image_xobject(document: &Document, stream: &Stream) -> Result<RgbaImage> {
    let filters = filter_names(stream);

    match filters.last().map(Vec::as_slice) {
        Some(b"DCTDecode") if filters.len() == 1 => {
            let decoded = ::image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg)
                .map_err(|err| ScanshelfError::Decode(format!("embedded JPEG: {err}")))?;
            return Ok(decoded.to_rgba8());
        }
        Some(b"DCTDecode") | Some(b"JPXDecode") | Some(b"JBIG2Decode") | Some(b"CCITTFaxDecode") => {
            return Err(ScanshelfError::UnsupportedFormat(format!(
                "image filter {}",
                String::from_utf8_lossy(filters.last().map(Vec::as_slice).unwrap_or_default())
            )));
        }
        _ => {}
    }

    let dict = &stream.dict;
    if dict
        .get(b"ImageMask")
        .ok()
        .and_then(|obj| obj.as_bool().ok())
        .unwrap_or(false)
    {
        return Err(ScanshelfError::UnsupportedFormat("stencil image mask".into()));
    }

    let dimension = |key: &[u8]| -> Result<u32> {
        dict.get(key)
            .ok()
            .and_then(|obj| resolve(document, obj).as_i64().ok())
            .and_then(|value| u32::try_from(value).ok())
            .filter(|value| *value > 0)
            .ok_or_else(|| {
                ScanshelfError::Decode(format!(
                    "image /{} missing or invalid",
                    String::from_utf8_lossy(key)
                ))
            })
    };
    let width = dimension(b"Width")?;
    let height = dimension(b"Height")?;

    let bits = dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|obj| obj.as_i64().ok())
        .unwrap_or(8);
    if bits != 8 {
        return Err(ScanshelfError::UnsupportedFormat(format!(
            "{bits} bits per component"
        )));
    }

    let components = colour_components(document, dict.get(b"ColorSpace").ok())?;
    let data = stream_bytes(stream)?;
    let expected = width as usize * height as usize * components;
    if data.len() < expected {
        return Err(ScanshelfError::Decode(format!(
            "image data truncated: {} of {expected} bytes",
            data.len()
        )));
    }

    let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
    for chunk in data[..expected].chunks_exact(components) {
        let rgb = match *chunk {
            [gray] => [gray, gray, gray],
            [r, g, b] => [r, g, b],
            [c, m, y, k] => {
                let channel = |v: u8| ((255 - v as u32) * (255 - k as u32) / 255) as u8;
                [channel(c), channel(m), channel(y)]
            }
            _ => [255, 255, 255],
        };
        pixels.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
    }

    RgbaImage::from_raw(width, height, pixels)
        .ok_or_else(|| ScanshelfError::Decode("image buffer size mismatch".into()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::dictionary;

    /// Build a PDF whose pages have the given MediaBox sizes (in points).
    /// Each page paints one solid-colour image filling the page.
    pub(crate) fn pdf_with_pages(sizes: &[(i64, i64)]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids: Vec<Object> = Vec::new();

        for &(width, height) in sizes {
            let pixels = vec![200u8, 30, 30].repeat(4);
            let image_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => 2,
                    "Height" => 2,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                },
                pixels,
            ));
            let content = format!("q {width} 0 0 {height} 0 0 cm /Im0 Do Q");
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "XObject" => dictionary! { "Im0" => image_id },
                },
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).expect("serialise test PDF");
        out
    }

    fn with_source<T>(data: &[u8], f: impl FnOnce(&dyn PagedSource) -> T) -> T {
        let mut f = Some(f);
        let mut out = None;
        ImageLayerRasterizer
            .with_document(data, &mut |source| {
                if let Some(f) = f.take() {
                    out = Some(f(source));
                }
            })
            .expect("open");
        out.expect("visited")
    }

    #[test]
    fn page_sizes_follow_media_box() {
        let pdf = pdf_with_pages(&[(595, 842), (842, 595)]);
        with_source(&pdf, |source| {
            assert_eq!(source.page_count(), 2);
            assert_eq!(source.page_size(0).expect("size"), (595, 842));
            assert_eq!(source.page_size(1).expect("size"), (842, 595));
        });
    }

    #[test]
    fn full_page_image_covers_canvas() {
        let pdf = pdf_with_pages(&[(40, 30)]);
        let page = with_source(&pdf, |source| source.render_page(0, 40, 30).expect("render"));
        assert_eq!(page.dimensions(), (40, 30));
        let centre = page.get_pixel(20, 15).0;
        assert!(centre[0] > 150 && centre[1] < 80, "centre pixel {centre:?}");
    }

    #[test]
    fn oversized_page_is_refused_before_allocating() {
        let pdf = pdf_with_pages(&[(5_000_000_000, 5_000_000_000), (100, 100)]);
        with_source(&pdf, |source| {
            assert!(matches!(source.page_size(0), Err(ScanshelfError::Pdf(_))));
            assert!(matches!(
                source.render_page(1, 20_000, 20_000),
                Err(ScanshelfError::Pdf(_))
            ));
            assert_eq!(source.page_size(1).expect("size"), (100, 100));
        });
    }

    #[test]
    fn garbage_does_not_open() {
        let result = ImageLayerRasterizer.with_document(b"not a pdf", &mut |_| {});
        assert!(matches!(result, Err(ScanshelfError::Pdf(_))));
    }

    #[test]
    fn matrix_composition_applies_inner_first() {
        let scale = Matrix([2.0, 0.0, 0.0, 2.0, 0.0, 0.0]);
        let shift = Matrix([1.0, 0.0, 0.0, 1.0, 10.0, 5.0]);
        // Scale, then translate.
        assert_eq!(scale.then(&shift).0, [2.0, 0.0, 0.0, 2.0, 10.0, 5.0]);
        // Translate, then scale.
        assert_eq!(shift.then(&scale).0, [2.0, 0.0, 0.0, 2.0, 20.0, 10.0]);
    }
}
