// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output sink: writes assembled documents into their format folder.
//
// Every file is first written to a hidden temporary file inside the target
// folder and then atomically persisted under its final name, so a failed
// write never leaves a half-written document where the catalog can see it.
// When the name is taken, ` (1)`, ` (2)`, ... is appended.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use scanshelf_core::error::{Result, ScanshelfError};
use scanshelf_core::{DocumentFormat, OutputDocument, StorageLayout};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

/// Upper bound on ` (n)` disambiguation attempts.
const MAX_NAME_ATTEMPTS: u32 = 10_000;

/// Writes finished documents into the storage layout.
#[derive(Debug, Clone)]
pub struct OutputSink {
    layout: StorageLayout,
}

impl OutputSink {
    /// Sink writing into the format folders of `layout`.
    pub fn new(layout: StorageLayout) -> Self {
        Self { layout }
    }

    /// Storage roots outputs are written under.
    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Write `data` as `<base_name>.<ext>` in the folder for `format`.
    pub fn write(
        &self,
        format: DocumentFormat,
        base_name: &str,
        data: &[u8],
    ) -> Result<OutputDocument> {
        self.write_with(format, base_name, |file| {
            file.write_all(data)?;
            Ok(())
        })
    }

    /// Byte-for-byte copy of `source` into the folder for `format`.
    pub fn copy_from(
        &self,
        format: DocumentFormat,
        base_name: &str,
        source: &Path,
    ) -> Result<OutputDocument> {
        let mut input = File::open(source)?;
        self.write_with(format, base_name, |file| {
            std::io::copy(&mut input, file)?;
            Ok(())
        })
    }

    /// Stream content into a temporary file via `fill`, then persist it.
    #[instrument(skip(self, fill), fields(format = %format, base_name))]
    pub fn write_with<F>(
        &self,
        format: DocumentFormat,
        base_name: &str,
        fill: F,
    ) -> Result<OutputDocument>
    where
        F: FnOnce(&mut File) -> Result<()>,
    {
        let folder = self.layout.folder(format);
        std::fs::create_dir_all(&folder).map_err(|err| {
            ScanshelfError::StorageAccess(format!("cannot create {}: {err}", folder.display()))
        })?;

        let mut temp = NamedTempFile::new_in(&folder)?;
        fill(temp.as_file_mut())?;
        temp.as_file().sync_all()?;

        let stem = sanitize_name(base_name);
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let display_name = candidate_name(&stem, format.extension(), attempt);
            let target = folder.join(&display_name);
            match temp.persist_noclobber(&target) {
                Ok(_) => {
                    info!(path = %target.display(), "Document written");
                    return Ok(OutputDocument {
                        format,
                        display_name,
                        path: target,
                        relative_path: StorageLayout::relative_path(format),
                    });
                }
                Err(err) if err.error.kind() == std::io::ErrorKind::AlreadyExists => {
                    debug!(display_name, "Name taken, trying next");
                    temp = err.file;
                }
                Err(err) => return Err(err.error.into()),
            }
        }

        Err(ScanshelfError::StorageAccess(format!(
            "no free file name for {stem}.{} in {}",
            format.extension(),
            folder.display()
        )))
    }
}

/// `stem.ext`, `stem (1).ext`, `stem (2).ext`, ...
fn candidate_name(stem: &str, extension: &str, attempt: u32) -> String {
    if attempt == 0 {
        format!("{stem}.{extension}")
    } else {
        format!("{stem} ({attempt}).{extension}")
    }
}

/// Strip path separators and leading dots so a display name stays inside
/// its folder and visible to the catalog.
fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            other => other,
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "scanned".to_string()
    } else {
        cleaned.to_string()
    }
}
