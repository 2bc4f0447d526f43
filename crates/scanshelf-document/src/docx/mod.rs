// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// DOCX module: picture extraction for preview and picture-per-page assembly.

pub mod extract;
pub mod writer;

pub use extract::DocxImageExtractor;
pub use writer::DocxAssembler;
