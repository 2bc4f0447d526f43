// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Data directory resolution (config file and media index live here).

use std::path::PathBuf;

/// Return the application data directory.
///
/// `SCANSHELF_DATA_DIR` overrides the conventional location.
pub fn data_dir() -> PathBuf {
    match std::env::var("SCANSHELF_DATA_DIR") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs_fallback().join("scanshelf"),
    }
}

fn dirs_fallback() -> PathBuf {
    // XDG data dir, then ~/.local/share
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME")
        && !xdg.is_empty()
    {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    std::env::temp_dir()
}
