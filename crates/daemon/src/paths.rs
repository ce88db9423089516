// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! State directory layout.

use std::path::{Path, PathBuf};

use edgesync::config::CONFIG_FILE_NAME;
use edgesync::env;

/// SQLite database filename within the state directory.
pub const DB_NAME: &str = "edgesync.db";
/// Lock filename for single instance guarantee.
pub const LOCK_NAME: &str = "edgesyncd.lock";
/// Log filename for `run`.
pub const LOG_NAME: &str = "edgesyncd.log";

/// Resolve the state directory: flag, `EDGESYNC_STATE_DIR`,
/// `$XDG_STATE_HOME/edgesync`, then `~/.local/state/edgesync`.
pub fn state_dir(flag: Option<&Path>) -> PathBuf {
    if let Some(dir) = flag {
        return dir.to_path_buf();
    }
    if let Some(dir) = env::state_dir() {
        return dir;
    }
    if let Some(dir) = env::xdg_state_home() {
        return dir.join("edgesync");
    }
    dirs::home_dir()
        .map(|h| h.join(".local/state/edgesync"))
        .unwrap_or_else(|| PathBuf::from(".local/state/edgesync"))
}

pub fn config_path(flag: Option<&Path>, state_dir: &Path) -> PathBuf {
    flag.map(Path::to_path_buf)
        .unwrap_or_else(|| state_dir.join(CONFIG_FILE_NAME))
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
