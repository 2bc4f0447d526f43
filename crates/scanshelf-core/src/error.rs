// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scanshelf.

use thiserror::Error;

/// Top-level error type for all Scanshelf operations.
#[derive(Debug, Error)]
pub enum ScanshelfError {
    // -- Content errors --
    /// Raster or document bytes are unreadable, corrupt, or decode to a
    /// zero-sized image.
    #[error("decode failed: {0}")]
    Decode(String),

    #[error("PDF operation failed: {0}")]
    Pdf(String),

    #[error("DOCX operation failed: {0}")]
    Docx(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    // -- Assembly --
    /// An assembler was called with no pages and no pre-existing file.
    #[error("nothing to save: no page images and no existing document")]
    EmptyInput,

    // -- Storage / persistence --
    /// Index query, insert, or folder read failed.
    #[error("storage access failed: {0}")]
    StorageAccess(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Capture bridge --
    #[error("capture failed: {0}")]
    Capture(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanshelfError>;
