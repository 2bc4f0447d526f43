// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Catalog: the unified, time-ordered list of saved documents.
//
// With a media index the four collections are queried from it; without one
// the four format folders are listed directly (non-recursive, files only).
// A failure for one format is logged and the others are still listed.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::UNIX_EPOCH;

use tracing::{debug, info, instrument, warn};

use scanshelf_core::error::{Result, ScanshelfError};
use scanshelf_core::time::normalize_timestamp_millis;
use scanshelf_core::types::{DocumentFormat, Locator, ScannedDocument, StorageLayout};

use crate::media_index::MediaIndex;

/// Where the catalog reads its entries from.
#[derive(Clone)]
pub enum CatalogSource {
    /// Query a media index.
    Index(Arc<Mutex<MediaIndex>>),
    /// List the format folders of the storage layout.
    Directories,
}

/// Lists saved documents across the four format collections.
#[derive(Clone)]
pub struct Catalog {
    layout: StorageLayout,
    source: CatalogSource,
}

impl Catalog {
    /// Catalog over `layout`, listing through `source`.
    pub fn new(layout: StorageLayout, source: CatalogSource) -> Self {
        Self { layout, source }
    }

    /// Catalog over the plain format folders.
    pub fn from_directories(layout: StorageLayout) -> Self {
        Self::new(layout, CatalogSource::Directories)
    }

    /// Storage roots this catalog lists.
    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Every saved document, newest first.
    ///
    /// Never fails: formats that cannot be listed are logged and left out.
    #[instrument(skip(self))]
    pub fn list_all(&self) -> Vec<ScannedDocument> {
        let mut seen: HashSet<(DocumentFormat, String, Locator)> = HashSet::new();
        let mut documents = Vec::new();

        for format in DocumentFormat::ALL {
            match self.list_format(format) {
                Ok(entries) => {
                    debug!(format = %format, count = entries.len(), "Format listed");
                    for doc in entries {
                        let key = (doc.format, doc.display_name.clone(), doc.locator.clone());
                        if seen.insert(key) {
                            documents.push(doc);
                        }
                    }
                }
                Err(err) => warn!(format = %format, error = %err, "Format listing failed"),
            }
        }

        // Stable sort keeps per-source order among equal timestamps.
        documents.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        info!(count = documents.len(), "Catalog listed");
        documents
    }

    /// Documents of one format, unsorted.
    pub fn list_format(&self, format: DocumentFormat) -> Result<Vec<ScannedDocument>> {
        match &self.source {
            CatalogSource::Index(index) => list_from_index(index, format),
            CatalogSource::Directories => list_from_directory(&self.layout.folder(format), format),
        }
    }
}

fn list_from_index(
    index: &Arc<Mutex<MediaIndex>>,
    format: DocumentFormat,
) -> Result<Vec<ScannedDocument>> {
    let index = index
        .lock()
        .map_err(|_| ScanshelfError::StorageAccess("media index lock poisoned".into()))?;
    let rows = index.query(format)?;
    Ok(rows
        .into_iter()
        .map(|row| {
            ScannedDocument::new(
                format,
                row.display_name,
                Locator::from_path(row.data),
                normalize_timestamp_millis(row.date_modified),
            )
        })
        .collect())
}

fn list_from_directory(folder: &Path, format: DocumentFormat) -> Result<Vec<ScannedDocument>> {
    let entries = match std::fs::read_dir(folder) {
        Ok(entries) => entries,
        // Nothing saved in this format yet.
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => {
            return Err(ScanshelfError::StorageAccess(format!(
                "cannot list {}: {err}",
                folder.display()
            )));
        }
    };

    let mut documents = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(folder = %folder.display(), error = %err, "Unreadable directory entry");
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let Ok(metadata) = std::fs::metadata(entry.path()) else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata
            .modified()
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map(|elapsed| elapsed.as_millis() as i64)
            .unwrap_or(0);
        documents.push(ScannedDocument::new(
            format,
            name,
            Locator::from_path(entry.path()),
            normalize_timestamp_millis(modified),
        ));
    }
    Ok(documents)
}

/// Case-insensitive substring filter on display names; a blank query keeps
/// everything. Order is preserved.
pub fn search(documents: &[ScannedDocument], query: &str) -> Vec<ScannedDocument> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return documents.to_vec();
    }
    documents
        .iter()
        .filter(|doc| doc.display_name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
