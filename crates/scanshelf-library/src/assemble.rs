// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Save dispatch: routes captured pages to the assembler for the requested
// format and registers every written file with the media index.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::{info, instrument, warn};

use scanshelf_core::error::{Result, ScanshelfError};
use scanshelf_core::types::{DocumentFormat, OutputDocument};
use scanshelf_document::{DocxAssembler, ImageExporter, OutputSink, PdfAssembler};

use crate::media_index::MediaIndex;

/// Raw material handed over by the capture subsystem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyInput {
    /// Page images in capture order.
    pub images: Vec<PathBuf>,
    /// A combined PDF the capture subsystem already produced.
    pub existing_pdf: Option<PathBuf>,
}

impl AssemblyInput {
    /// Input made of page images only.
    pub fn from_images(images: Vec<PathBuf>) -> Self {
        Self {
            images,
            existing_pdf: None,
        }
    }

    /// No images and no combined PDF.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.existing_pdf.is_none()
    }
}

/// Writes outputs in any of the four formats.
#[derive(Clone)]
pub struct Assembler {
    pdf: PdfAssembler,
    docx: DocxAssembler,
    images: ImageExporter,
    index: Option<Arc<Mutex<MediaIndex>>>,
}

impl Assembler {
    /// Assembler writing through `sink` and registering with `index`, if any.
    pub fn new(sink: OutputSink, index: Option<Arc<Mutex<MediaIndex>>>) -> Self {
        Self {
            pdf: PdfAssembler::new(sink.clone()),
            docx: DocxAssembler::new(sink.clone()),
            images: ImageExporter::new(sink),
            index,
        }
    }

    /// Write `input` as `format` under `name` and register the result.
    ///
    /// PDF prefers copying `existing_pdf` over re-assembling the images.
    /// JPEG and PNG produce one file per image. All outputs are registered
    /// in one transaction; if that fails every written file is removed and
    /// the call fails.
    #[instrument(skip(self, input), fields(format = %format, images = input.images.len()))]
    pub fn assemble(
        &self,
        format: DocumentFormat,
        input: &AssemblyInput,
        name: &str,
    ) -> Result<Vec<OutputDocument>> {
        if input.is_empty() {
            return Err(ScanshelfError::EmptyInput);
        }

        let outputs = match format {
            DocumentFormat::Pdf => match &input.existing_pdf {
                Some(existing) => vec![self.pdf.copy_existing(existing, name)?],
                None => vec![self.pdf.assemble_from_images(&input.images, name)?],
            },
            DocumentFormat::Docx => vec![self.docx.assemble_from_images(&input.images, name)?],
            DocumentFormat::Jpeg | DocumentFormat::Png => {
                self.images.export(&input.images, format, name)?
            }
        };

        if let Err(err) = self.register(&outputs) {
            // Nothing was indexed; remove everything this call wrote.
            for written in &outputs {
                if let Err(remove_err) = std::fs::remove_file(&written.path) {
                    warn!(path = %written.path.display(), error = %remove_err, "Could not remove unregistered output");
                }
            }
            return Err(err);
        }

        info!(count = outputs.len(), "Outputs saved");
        Ok(outputs)
    }

    fn register(&self, outputs: &[OutputDocument]) -> Result<()> {
        let Some(index) = &self.index else {
            return Ok(());
        };
        let mut index = index
            .lock()
            .map_err(|_| ScanshelfError::StorageAccess("media index lock poisoned".into()))?;
        index.register_all(outputs)?;
        Ok(())
    }
}
