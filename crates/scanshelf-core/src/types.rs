// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Scanshelf document library.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

/// MIME type of paged documents.
pub const MIME_PDF: &str = "application/pdf";
/// MIME type of word-processing documents.
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_PNG: &str = "image/png";

/// Name of the per-app folder created under both storage roots.
pub const BASE_FOLDER: &str = "ScannedDocuments";

/// The four output formats the library indexes and produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Jpeg,
    Png,
}

impl DocumentFormat {
    /// Every format, in catalog scan order.
    pub const ALL: [DocumentFormat; 4] = [Self::Pdf, Self::Docx, Self::Jpeg, Self::Png];

    /// MIME type used for index predicates and write metadata.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => MIME_PDF,
            Self::Docx => MIME_DOCX,
            Self::Jpeg => MIME_JPEG,
            Self::Png => MIME_PNG,
        }
    }

    /// File extension (without the dot) given to written files.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    /// Format-specific subfolder below [`BASE_FOLDER`].
    pub fn folder_name(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
        }
    }

    /// Storage root the format lives under.
    pub fn root(&self) -> StorageRoot {
        match self {
            Self::Pdf | Self::Docx => StorageRoot::Documents,
            Self::Jpeg | Self::Png => StorageRoot::Pictures,
        }
    }

    /// Whether the format is a single raster image rather than a container.
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Jpeg | Self::Png)
    }

    /// Infer the format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    /// Infer the format from an exact MIME type.
    pub fn from_mime(mime: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|format| format.mime_type() == mime)
    }

    /// Infer the format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.folder_name())
    }
}

/// Platform-provided shared storage roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageRoot {
    Documents,
    Pictures,
}

impl StorageRoot {
    /// Directory name used in relative paths (`Documents/...`).
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Documents => "Documents",
            Self::Pictures => "Pictures",
        }
    }
}

/// Physical placement of the four format folders.
///
/// ```text
/// <documents_root>/ScannedDocuments/PDF/*.pdf
/// <documents_root>/ScannedDocuments/DOCX/*.docx
/// <pictures_root>/ScannedDocuments/JPEG/*.jpg
/// <pictures_root>/ScannedDocuments/PNG/*.png
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageLayout {
    pub documents_root: PathBuf,
    pub pictures_root: PathBuf,
}

impl StorageLayout {
    /// Layout under the given Documents and Pictures roots.
    pub fn new(documents_root: impl Into<PathBuf>, pictures_root: impl Into<PathBuf>) -> Self {
        Self {
            documents_root: documents_root.into(),
            pictures_root: pictures_root.into(),
        }
    }

    /// Absolute folder holding documents of `format`.
    pub fn folder(&self, format: DocumentFormat) -> PathBuf {
        let root = match format.root() {
            StorageRoot::Documents => &self.documents_root,
            StorageRoot::Pictures => &self.pictures_root,
        };
        root.join(BASE_FOLDER).join(format.folder_name())
    }

    /// Root-relative folder as recorded in the media index, e.g.
    /// `Documents/ScannedDocuments/PDF/`.
    pub fn relative_path(format: DocumentFormat) -> String {
        format!(
            "{}/{}/{}/",
            format.root().dir_name(),
            BASE_FOLDER,
            format.folder_name()
        )
    }
}

/// Opaque reference to a byte-addressable resource.
///
/// Every locator this library hands out resolves to a local file; the
/// `file://` form is what UI collaborators display or share.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Locator(PathBuf);

impl Locator {
    /// Locator for a local file.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Parse either a `file://` URI or a plain filesystem path.
    ///
    /// URIs are percent-decoded (`file:///tmp/my%20scan.pdf` is
    /// `/tmp/my scan.pdf`). A `file://` value that is not a valid local file
    /// URI keeps its remainder verbatim.
    pub fn parse(value: &str) -> Self {
        let Some(rest) = value.strip_prefix("file://") else {
            return Self(PathBuf::from(value));
        };
        match Url::parse(value).ok().and_then(|url| url.to_file_path().ok()) {
            Some(path) => Self(path),
            None => Self(PathBuf::from(rest)),
        }
    }

    /// The local file this locator resolves to.
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Take the underlying path.
    pub fn into_path(self) -> PathBuf {
        self.0
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Url::from_file_path(&self.0) {
            Ok(url) => f.write_str(url.as_str()),
            // Relative paths have no URI form.
            Err(()) => write!(f, "file://{}", self.0.display()),
        }
    }
}

/// A previously saved document as listed by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScannedDocument {
    pub format: DocumentFormat,
    pub display_name: String,
    pub locator: Locator,
    /// Milliseconds since the Unix epoch; `0` when unknown.
    pub last_modified: i64,
}

impl ScannedDocument {
    pub fn new(
        format: DocumentFormat,
        display_name: impl Into<String>,
        locator: Locator,
        last_modified: i64,
    ) -> Self {
        Self {
            format,
            display_name: display_name.into(),
            locator,
            last_modified,
        }
    }
}

/// A page or embedded picture that was skipped while building a
/// [`PageImageSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialRenderWarning {
    /// Zero-based page (or picture part) index in the source.
    pub index: usize,
    pub reason: String,
}

/// Ordered page images of one document, in display order.
///
/// Entries reference files in the cache directory; they live as long as the
/// cache does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageImageSet {
    pub pages: Vec<Locator>,
    pub skipped: Vec<PartialRenderWarning>,
}

impl PageImageSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set built directly from already-materialised images.
    pub fn from_pages(pages: Vec<Locator>) -> Self {
        Self {
            pages,
            skipped: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Record a skipped item.
    pub fn skip(&mut self, index: usize, reason: impl Into<String>) {
        self.skipped.push(PartialRenderWarning {
            index,
            reason: reason.into(),
        });
    }
}

/// A file written by one of the assemblers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDocument {
    pub format: DocumentFormat,
    /// File name including extension.
    pub display_name: String,
    /// Absolute location of the written file.
    pub path: PathBuf,
    /// Root-relative folder (see [`StorageLayout::relative_path`]).
    pub relative_path: String,
}

impl OutputDocument {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn locator(&self) -> Locator {
        Locator::from_path(self.path.clone())
    }
}
