// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanshelf-bridge: Interface to the external capture subsystem (the
// document scanner), plus a desktop stand-in that reads captured pages from a
// directory.

pub mod stub;
pub mod traits;

use std::path::Path;

pub use stub::DirectoryCapture;
pub use traits::{CaptureOutput, CaptureService};

/// Capture implementation for this build, reading from `source`.
pub fn platform_capture(source: &Path) -> Box<dyn CaptureService> {
    // Desktop/CI: pages come from a directory.
    Box::new(DirectoryCapture::new(source))
}
