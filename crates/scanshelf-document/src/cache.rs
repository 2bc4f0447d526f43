// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page cache: scratch directory holding rendered page images for preview.

use std::path::{Path, PathBuf};

use scanshelf_core::Locator;
use scanshelf_core::error::Result;
use uuid::Uuid;

/// Directory where page renderers materialise their output.
///
/// File names are unique per write, so concurrent renders of different
/// documents never collide.
#[derive(Debug, Clone)]
pub struct PageCache {
    dir: PathBuf,
}

impl PageCache {
    /// Cache rooted at `dir`; created on first store.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding cached pages.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for the `index`-th item of a render, e.g.
    /// `pdf_page_<uuid>_3.png`.
    pub fn entry_path(&self, prefix: &str, index: usize, extension: &str) -> PathBuf {
        self.dir.join(format!(
            "{prefix}_{}_{index}.{extension}",
            Uuid::new_v4().simple()
        ))
    }

    /// Write `data` as a new cache entry and return its locator.
    pub fn store(
        &self,
        prefix: &str,
        index: usize,
        extension: &str,
        data: &[u8],
    ) -> Result<Locator> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.entry_path(prefix, index, extension);
        std::fs::write(&path, data)?;
        Ok(Locator::from_path(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_unique() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = PageCache::new(dir.path().join("pages"));
        let a = cache.store("pdf_page", 0, "png", b"a").expect("store");
        let b = cache.store("pdf_page", 0, "png", b"b").expect("store");
        assert_ne!(a, b);
        assert_eq!(std::fs::read(a.as_path()).expect("read"), b"a");
        assert!(a.as_path().starts_with(cache.dir()));
    }
}
