// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Directory capture: desktop stand-in for the document scanner.
//
// A "capture" is the content of one directory: its JPEG/PNG files in name
// order become the pages, and the first PDF (by name) the combined document.

use std::path::{Path, PathBuf};

use scanshelf_core::error::{Result, ScanshelfError};
use scanshelf_core::types::DocumentFormat;
use tracing::{info, instrument, warn};

use crate::traits::{CaptureOutput, CaptureService};

/// Reads captured pages from a directory.
#[derive(Debug, Clone)]
pub struct DirectoryCapture {
    dir: PathBuf,
}

impl DirectoryCapture {
    /// Capture reading from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory captures are read from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl CaptureService for DirectoryCapture {
    fn name(&self) -> &str {
        "Directory (stub)"
    }

    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    fn capture(&self) -> Result<CaptureOutput> {
        let entries = std::fs::read_dir(&self.dir).map_err(|err| {
            ScanshelfError::Capture(format!("cannot read {}: {err}", self.dir.display()))
        })?;

        let mut files: Vec<PathBuf> = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) if entry.path().is_file() => files.push(entry.path()),
                Ok(_) => {}
                Err(err) => warn!(error = %err, "Skipping unreadable entry"),
            }
        }
        files.sort();

        let mut output = CaptureOutput::default();
        for path in files {
            let hidden = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with('.'));
            if hidden {
                continue;
            }
            match DocumentFormat::from_path(&path) {
                Some(format) if format.is_image() => output.pages.push(path),
                Some(DocumentFormat::Pdf) if output.combined_pdf.is_none() => {
                    output.combined_pdf = Some(path)
                }
                _ => {}
            }
        }

        info!(
            pages = output.pages.len(),
            combined_pdf = output.combined_pdf.is_some(),
            "Capture read"
        );
        Ok(output)
    }
}
