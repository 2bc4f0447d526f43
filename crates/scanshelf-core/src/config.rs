// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::StorageLayout;

/// Longest page edge, in pixels, produced by the PDF page renderer.
pub const DEFAULT_RENDER_MAX_DIMENSION: u32 = 2048;

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Shared "Documents" root (PDF and DOCX outputs).
    pub documents_root: PathBuf,
    /// Shared "Pictures" root (JPEG and PNG outputs).
    pub pictures_root: PathBuf,
    /// Scratch directory for rendered page images.
    pub cache_dir: PathBuf,
    /// List documents through the media index instead of scanning folders.
    pub use_media_index: bool,
    /// Media index database; defaults to `media.db` in the data directory.
    pub media_index_path: Option<PathBuf>,
    /// Longest page edge for preview rendering.
    pub render_max_dimension: u32,
}

impl AppConfig {
    /// Storage layout derived from the configured roots.
    pub fn layout(&self) -> StorageLayout {
        StorageLayout::new(self.documents_root.clone(), self.pictures_root.clone())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let home = std::env::var("HOME").map(PathBuf::from).ok();
        Self {
            documents_root: env_dir("XDG_DOCUMENTS_DIR", home.as_ref(), "Documents"),
            pictures_root: env_dir("XDG_PICTURES_DIR", home.as_ref(), "Pictures"),
            cache_dir: env_dir("XDG_CACHE_HOME", home.as_ref(), ".cache").join("scanshelf"),
            use_media_index: true,
            media_index_path: None,
            render_max_dimension: DEFAULT_RENDER_MAX_DIMENSION,
        }
    }
}

fn env_dir(var: &str, home: Option<&PathBuf>, fallback: &str) -> PathBuf {
    if let Ok(dir) = std::env::var(var)
        && !dir.is_empty()
    {
        return PathBuf::from(dir);
    }
    match home {
        Some(home) => home.join(fallback),
        None => std::env::temp_dir().join(fallback),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "use_media_index": false }"#).expect("parse");
        assert!(!config.use_media_index);
        assert_eq!(config.render_max_dimension, DEFAULT_RENDER_MAX_DIMENSION);
    }

    #[test]
    fn layout_uses_configured_roots() {
        let config = AppConfig {
            documents_root: "/d".into(),
            pictures_root: "/p".into(),
            ..AppConfig::default()
        };
        let layout = config.layout();
        assert_eq!(layout.documents_root, PathBuf::from("/d"));
        assert_eq!(layout.pictures_root, PathBuf::from("/p"));
    }
}
