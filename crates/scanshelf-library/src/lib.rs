// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanshelf-library: Catalog, media index, and the async facade that UI
// collaborators call.
//
// `Library` runs every I/O-bound operation on tokio's blocking pool and
// resolves whole-operation failures to empty results, logging the cause.
// The media index (`rusqlite::Connection` is `Send` but not `Sync`) is shared
// as `Arc<Mutex<MediaIndex>>`.

pub mod assemble;
pub mod catalog;
pub mod media_index;
pub mod preview;

use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::{error, info, warn};

use scanshelf_core::AppConfig;
use scanshelf_core::error::Result;
use scanshelf_core::time::resolve_output_name;
use scanshelf_core::types::{DocumentFormat, OutputDocument, PageImageSet, ScannedDocument};
use scanshelf_document::{OutputSink, PageCache};

pub use assemble::{Assembler, AssemblyInput};
pub use catalog::{Catalog, CatalogSource, search};
pub use media_index::{MediaEntry, MediaIndex};
pub use preview::Previewer;

/// Default media index file name inside the data directory.
pub const MEDIA_INDEX_FILE: &str = "media.db";

/// Async entry point for listing, previewing and saving documents.
///
/// Cheap to clone; clones share the media index.
#[derive(Clone)]
pub struct Library {
    catalog: Catalog,
    previewer: Previewer,
    assembler: Assembler,
}

impl Library {
    /// Build a library from `config`, with an already-opened index (or none
    /// to list the format folders directly).
    pub fn new(config: &AppConfig, index: Option<MediaIndex>) -> Self {
        let layout = config.layout();
        let index = index.map(|index| Arc::new(Mutex::new(index)));
        let source = match &index {
            Some(index) => CatalogSource::Index(index.clone()),
            None => CatalogSource::Directories,
        };
        Self {
            catalog: Catalog::new(layout.clone(), source),
            previewer: Previewer::new(
                PageCache::new(config.cache_dir.clone()),
                config.render_max_dimension,
            ),
            assembler: Assembler::new(OutputSink::new(layout), index),
        }
    }

    /// Build a library, opening the media index when `config` asks for one.
    ///
    /// An index that fails to open is logged and the library falls back to
    /// folder listing.
    pub fn open(config: &AppConfig, data_dir: &Path) -> Self {
        let index = if config.use_media_index {
            let path = config
                .media_index_path
                .clone()
                .unwrap_or_else(|| data_dir.join(MEDIA_INDEX_FILE));
            match MediaIndex::open(&path) {
                Ok(index) => Some(index),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Media index unavailable, listing folders instead");
                    None
                }
            }
        } else {
            None
        };
        info!(media_index = index.is_some(), "Library ready");
        Self::new(config, index)
    }

    /// Synchronous catalog, for callers already on a blocking thread.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// All saved documents, newest first.
    pub async fn list_all(&self) -> Vec<ScannedDocument> {
        let catalog = self.catalog.clone();
        run_blocking("list_all", move || Ok(catalog.list_all()))
            .await
            .unwrap_or_default()
    }

    /// Page images of `document`.
    pub async fn render(&self, document: ScannedDocument) -> PageImageSet {
        let previewer = self.previewer.clone();
        run_blocking("render", move || Ok(previewer.render(&document)))
            .await
            .unwrap_or_default()
    }

    /// Save `input` as `format`. A missing or blank `name` becomes
    /// `scanned_<yyyyMMdd_HHmmss>`.
    ///
    /// Returns the written files; empty when nothing could be saved.
    pub async fn assemble(
        &self,
        format: DocumentFormat,
        input: AssemblyInput,
        name: Option<String>,
    ) -> Vec<OutputDocument> {
        let assembler = self.assembler.clone();
        let name = resolve_output_name(name.as_deref());
        run_blocking("assemble", move || assembler.assemble(format, &input, &name))
            .await
            .unwrap_or_default()
    }
}

/// Run `task` on the blocking pool; failures (including a panicked worker)
/// are logged and become `None`.
async fn run_blocking<T, F>(operation: &'static str, task: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(err)) => {
            warn!(operation, error = %err, "Operation failed");
            None
        }
        Err(join_err) => {
            error!(operation, error = %join_err, "Worker task failed");
            None
        }
    }
}
