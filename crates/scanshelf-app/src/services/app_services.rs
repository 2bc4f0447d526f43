// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer: loads configuration, opens the library, and runs
// capture sessions for the command handlers.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use scanshelf_bridge::{CaptureOutput, platform_capture};
use scanshelf_core::AppConfig;
use scanshelf_core::error::{Result, ScanshelfError};
use scanshelf_library::Library;
use tracing::{info, warn};

use super::data_dir;

/// Shared application services.
///
/// Cheap to clone; the library and config are shared between clones.
#[derive(Clone)]
pub struct AppServices {
    library: Library,
    data_dir: PathBuf,
    config: Arc<Mutex<AppConfig>>,
}

impl AppServices {
    /// Initialise services from the default data directory. Call once at
    /// startup.
    pub fn init() -> Self {
        Self::with_data_dir(data_dir::data_dir())
    }

    /// Initialise services rooted at `dir`.
    pub fn with_data_dir(dir: PathBuf) -> Self {
        info!(path = %dir.display(), "initialising app services");
        if let Err(err) = std::fs::create_dir_all(&dir) {
            warn!(path = %dir.display(), error = %err, "cannot create data directory");
        }

        let config = load_config(&dir).unwrap_or_default();
        let library = Library::open(&config, &dir);

        Self {
            library,
            data_dir: dir,
            config: Arc::new(Mutex::new(config)),
        }
    }

    /// Library facade for listing, preview and save.
    pub fn library(&self) -> &Library {
        &self.library
    }

    /// Directory holding `config.json` and the media index.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    // -- Capture -------------------------------------------------------------

    /// Run one capture session reading from `source`.
    pub async fn capture(&self, source: PathBuf) -> Result<CaptureOutput> {
        tokio::task::spawn_blocking(move || platform_capture(&source).capture())
            .await
            .map_err(|err| ScanshelfError::Capture(format!("capture task failed: {err}")))?
    }

    // -- Config Persistence --------------------------------------------------

    /// Get a clone of the current config.
    pub fn config(&self) -> AppConfig {
        match self.config.lock() {
            Ok(config) => config.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Update and persist the config.
    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        match self.config.lock() {
            Ok(mut current) => *current = config.clone(),
            Err(_) => warn!("config lock poisoned; persisting anyway"),
        }
        persist_config(&self.data_dir, config)
    }
}

// -- Config file persistence -------------------------------------------------

const CONFIG_FILE: &str = "config.json";

fn load_config(data_dir: &Path) -> Option<AppConfig> {
    let path = data_dir.join(CONFIG_FILE);
    let data = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&data) {
        Ok(config) => Some(config),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring unreadable config");
            None
        }
    }
}

fn persist_config(data_dir: &Path, config: &AppConfig) -> Result<()> {
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}
