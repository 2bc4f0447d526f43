// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the UI layer's toasts and dialogs.
//
// Every technical error is mapped to plain English with a clear suggestion.

use crate::error::ScanshelfError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Storage hiccup: trying again may work.
    Transient,
    /// User must do something (scan pages, grant access, free space).
    ActionRequired,
    /// Retrying will not help: damaged file, unsupported type.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether offering a "Try again" button makes sense.
    pub retriable: bool,
    /// How the UI should present the error.
    pub severity: Severity,
}

/// Convert a `ScanshelfError` into a `HumanError`.
pub fn humanize_error(err: &ScanshelfError) -> HumanError {
    match err {
        ScanshelfError::Decode(_) => HumanError {
            message: "This page couldn't be read.".into(),
            suggestion: "The image may be damaged. Try scanning the page again.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanshelfError::Pdf(_) => HumanError {
            message: "There's a problem with this PDF file.".into(),
            suggestion: "The file may be damaged. Try opening it in another app, or scan the document again.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanshelfError::Docx(_) => HumanError {
            message: "There's a problem with this Word document.".into(),
            suggestion: "The file may be damaged. Try saving the scan as PDF instead.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanshelfError::UnsupportedFormat(detail) => HumanError {
            message: "This type of file isn't supported.".into(),
            suggestion: format!("Choose PDF, DOCX, JPEG or PNG. (File type: {detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanshelfError::EmptyInput => HumanError {
            message: "There's nothing to save yet.".into(),
            suggestion: "Scan at least one page, then save again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanshelfError::StorageAccess(_) => HumanError {
            message: "Your saved documents couldn't be reached.".into(),
            suggestion: "Check that the app may access your files, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanshelfError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "The file couldn't be found.".into(),
                suggestion: "It may have been moved or deleted. Refresh the list and try again.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "The app doesn't have permission to use that file.".into(),
                suggestion: "Allow access to your documents and pictures in the system settings.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "There was a problem reading or writing a file.".into(),
                suggestion: "Try again. If this keeps happening, your device's storage may be full.".into(),
                retriable: true,
                severity: Severity::Transient,
            },
        },

        ScanshelfError::Serialization(_) => HumanError {
            message: "The app's settings couldn't be read.".into(),
            suggestion: "Default settings are being used. Change them again in Settings.".into(),
            retriable: false,
            severity: Severity::Transient,
        },

        ScanshelfError::Capture(_) => HumanError {
            message: "Scanning didn't finish.".into(),
            suggestion: "Try scanning again, keeping the document flat and well lit.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanshelfError::PlatformUnavailable => HumanError {
            message: "This feature isn't available on your device.".into(),
            suggestion: "The document scanner needs a camera-equipped phone or tablet.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}
