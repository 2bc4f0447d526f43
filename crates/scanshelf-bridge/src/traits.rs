// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capture subsystem contract.

use std::path::PathBuf;

use scanshelf_core::error::Result;

/// What a capture session hands back: page images, a combined PDF, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureOutput {
    /// Page images in capture order.
    pub pages: Vec<PathBuf>,
    /// Combined PDF, when the scanner produced one.
    pub combined_pdf: Option<PathBuf>,
}

impl CaptureOutput {
    /// True when the session produced nothing usable.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty() && self.combined_pdf.is_none()
    }
}

/// A document scanner.
pub trait CaptureService: Send + Sync {
    /// Human-readable name of the capture source.
    fn name(&self) -> &str;

    /// Run one capture session.
    ///
    /// Returns an empty [`CaptureOutput`] when the user cancelled.
    fn capture(&self) -> Result<CaptureOutput>;
}
