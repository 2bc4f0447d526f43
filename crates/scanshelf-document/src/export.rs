// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image exporter: saves each captured page as its own JPEG or PNG file.

use std::path::Path;

use scanshelf_core::error::{Result, ScanshelfError};
use scanshelf_core::{DocumentFormat, OutputDocument};
use tracing::{info, instrument, warn};

use crate::image::{JpegQuality, RasterFormat, RasterImage};
use crate::output::OutputSink;

/// Re-encodes images into `Pictures/ScannedDocuments/{JPEG,PNG}/`.
#[derive(Debug, Clone)]
pub struct ImageExporter {
    sink: OutputSink,
}

impl ImageExporter {
    /// Exporter writing through `sink`.
    pub fn new(sink: OutputSink) -> Self {
        Self { sink }
    }

    /// Write `images` as `<name>_1.<ext>`, `<name>_2.<ext>`, ...
    ///
    /// Images that fail to decode or write are logged and skipped; the
    /// result holds whatever was written. Only image formats are accepted.
    #[instrument(skip(self, images), fields(count = images.len(), format = %format))]
    pub fn export<P: AsRef<Path>>(
        &self,
        images: &[P],
        format: DocumentFormat,
        name: &str,
    ) -> Result<Vec<OutputDocument>> {
        let raster_format = match format {
            DocumentFormat::Jpeg => RasterFormat::Jpeg,
            DocumentFormat::Png => RasterFormat::Png,
            DocumentFormat::Pdf | DocumentFormat::Docx => {
                return Err(ScanshelfError::UnsupportedFormat(format!(
                    "{format} is not an image export format"
                )));
            }
        };
        if images.is_empty() {
            return Err(ScanshelfError::EmptyInput);
        }

        let mut written = Vec::with_capacity(images.len());
        for (index, path) in images.iter().enumerate() {
            let file_name = format!("{name}_{}", index + 1);
            let result = RasterImage::open(path)
                .and_then(|image| image.encode(raster_format, JpegQuality::IMAGE_EXPORT))
                .and_then(|bytes| self.sink.write(format, &file_name, &bytes));
            match result {
                Ok(output) => written.push(output),
                Err(err) => warn!(
                    index,
                    path = %path.as_ref().display(),
                    error = %err,
                    "Image not exported"
                ),
            }
        }

        info!(written = written.len(), "Images exported");
        Ok(written)
    }
}
