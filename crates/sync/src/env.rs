// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! The variable name constants are generated by `build.rs` and live in the
//! [`vars`] submodule.

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_vars.rs"));
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Returns the value of `EDGESYNC_STATE_DIR` if set.
pub fn state_dir() -> Option<PathBuf> {
    non_empty(vars::EDGESYNC_STATE_DIR).map(PathBuf::from)
}

/// Returns the value of `XDG_STATE_HOME` if set.
pub fn xdg_state_home() -> Option<PathBuf> {
    non_empty(vars::XDG_STATE_HOME).map(PathBuf::from)
}

pub fn endpoint() -> Option<String> {
    non_empty(vars::EDGESYNC_ENDPOINT)
}

pub fn client_id() -> Option<String> {
    non_empty(vars::EDGESYNC_CLIENT_ID)
}

/// Returns `EDGESYNC_SYNC_INTERVAL_SECS` if it is a valid integer.
pub fn sync_interval_secs() -> Option<u64> {
    let raw = non_empty(vars::EDGESYNC_SYNC_INTERVAL_SECS)?;
    match raw.trim().parse() {
        Ok(secs) => Some(secs),
        Err(_) => {
            tracing::warn!(value = %raw, "ignoring invalid {}", vars::EDGESYNC_SYNC_INTERVAL_SECS);
            None
        }
    }
}

/// Returns `EDGESYNC_ENABLED` parsed as a boolean (`1/0`, `true/false`, `yes/no`).
pub fn enabled() -> Option<bool> {
    let raw = non_empty(vars::EDGESYNC_ENABLED)?;
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            tracing::warn!(value = %raw, "ignoring invalid {}", vars::EDGESYNC_ENABLED);
            None
        }
    }
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
