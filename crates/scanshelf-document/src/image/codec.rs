// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster codec adapter: decode compressed JPEG/PNG bytes into an owned pixel
// buffer, resize it, and encode it back. Built on the `image` crate.

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader, Rgb, RgbImage};
use scanshelf_core::error::{Result, ScanshelfError};
use tracing::{debug, instrument};

/// Encodings the adapter can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Jpeg,
    Png,
}

impl RasterFormat {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

/// Fixed JPEG quality presets. Each caller picks its own; there is no
/// universal default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegQuality(pub u8);

impl JpegQuality {
    /// Pictures embedded into DOCX output.
    pub const DOCX_EMBED: Self = Self(85);
    /// Standalone JPEG export.
    pub const IMAGE_EXPORT: Self = Self(95);
    /// Rendered PDF pages (PNG output, where quality is not lossy).
    pub const PDF_PAGE: Self = Self(100);
}

/// A decoded image owned by exactly one pipeline stage.
///
/// Every transformation consumes `self`, so a buffer is released once, after
/// its last use, and can never be reached through a stale handle.
#[derive(Debug, Clone)]
pub struct RasterImage {
    image: DynamicImage,
}

impl RasterImage {
    // -- Construction ---------------------------------------------------------

    /// Decode encoded bytes (JPEG, PNG, GIF, BMP, ...).
    ///
    /// Fails with [`ScanshelfError::Decode`] when the bytes are not a
    /// recognised raster format or decode to a zero-sized image.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn decode(data: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(data)
            .map_err(|err| ScanshelfError::Decode(format!("failed to decode image: {err}")))?;
        Self::from_dynamic(image)
    }

    /// Decode the image stored at `path`, sniffing the format from its bytes.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::decode(&data).map_err(|err| match err {
            ScanshelfError::Decode(detail) => {
                ScanshelfError::Decode(format!("{}: {detail}", path.as_ref().display()))
            }
            other => other,
        })
    }

    /// Wrap an already-decoded image, rejecting empty buffers.
    pub fn from_dynamic(image: DynamicImage) -> Result<Self> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ScanshelfError::Decode(format!(
                "image has zero dimension ({}x{})",
                image.width(),
                image.height()
            )));
        }
        debug!(width = image.width(), height = image.height(), "Image decoded");
        Ok(Self { image })
    }

    // -- Accessors ------------------------------------------------------------

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    /// Borrow the decoded pixels.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Take the decoded pixels.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Resize to exactly `width` x `height` with bilinear filtering.
    ///
    /// The caller owns the scale decision; no aspect correction happens here.
    pub fn resize(self, width: u32, height: u32) -> Self {
        if (width, height) == self.dimensions() {
            return self;
        }
        let resized = self
            .image
            .resize_exact(width.max(1), height.max(1), FilterType::Triangle);
        Self { image: resized }
    }

    /// Composite onto an opaque white background and drop the alpha channel.
    pub fn flatten_on_white(&self) -> RgbImage {
        if !self.image.color().has_alpha() {
            return self.image.to_rgb8();
        }
        let rgba = self.image.to_rgba8();
        RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
            let [r, g, b, a] = rgba.get_pixel(x, y).0;
            let alpha = a as u32;
            let blend = |channel: u8| -> u8 {
                ((channel as u32 * alpha + 255 * (255 - alpha)) / 255) as u8
            };
            Rgb([blend(r), blend(g), blend(b)])
        })
    }

    // -- Output ---------------------------------------------------------------

    /// Encode in `format`. `quality` only affects JPEG.
    pub fn encode(&self, format: RasterFormat, quality: JpegQuality) -> Result<Vec<u8>> {
        match format {
            RasterFormat::Jpeg => self.to_jpeg_bytes(quality),
            RasterFormat::Png => self.to_png_bytes(),
        }
    }

    /// Encode as PNG.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|err| ScanshelfError::Decode(format!("PNG encoding failed: {err}")))?;
        Ok(buffer)
    }

    /// Encode as JPEG at `quality`, flattened onto white.
    pub fn to_jpeg_bytes(&self, quality: JpegQuality) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let rgb = self.flatten_on_white();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.0.clamp(1, 100));
        rgb.write_with_encoder(encoder)
            .map_err(|err| ScanshelfError::Decode(format!("JPEG encoding failed: {err}")))?;
        Ok(buffer)
    }
}

/// Read only the header of `data` and return its pixel dimensions.
///
/// Rejects unknown formats and zero-sized images without decoding pixels.
pub fn probe_dimensions(data: &[u8]) -> Result<(u32, u32)> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|err| ScanshelfError::Decode(format!("cannot sniff image format: {err}")))?;
    if reader.format().is_none() {
        return Err(ScanshelfError::Decode("unrecognised image format".into()));
    }
    let (width, height) = reader
        .into_dimensions()
        .map_err(|err| ScanshelfError::Decode(format!("cannot read image header: {err}")))?;
    if width == 0 || height == 0 {
        return Err(ScanshelfError::Decode(format!(
            "image has zero dimension ({width}x{height})"
        )));
    }
    Ok((width, height))
}
