// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use edgesync::env::vars;
use std::sync::{Mutex, MutexGuard, PoisonError};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// RAII guard that sets/removes env vars and restores them on drop.
struct EnvGuard {
    saved: Vec<(&'static str, Option<String>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvGuard {
    fn new() -> Self {
        EnvGuard {
            saved: Vec::new(),
            _lock: ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    fn set(mut self, key: &'static str, value: &str) -> Self {
        self.saved.push((key, std::env::var(key).ok()));
        std::env::set_var(key, value);
        self
    }

    fn remove(mut self, key: &'static str) -> Self {
        self.saved.push((key, std::env::var(key).ok()));
        std::env::remove_var(key);
        self
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, original) in self.saved.drain(..).rev() {
            match original {
                Some(val) => std::env::set_var(key, val),
                None => std::env::remove_var(key),
            }
        }
    }
}

#[test]
fn flag_wins_over_environment() {
    let _guard = EnvGuard::new().set(vars::EDGESYNC_STATE_DIR, "/from/env");
    assert_eq!(
        state_dir(Some(Path::new("/from/flag"))),
        PathBuf::from("/from/flag")
    );
}

#[test]
fn state_dir_env_wins_over_xdg() {
    let _guard = EnvGuard::new()
        .set(vars::EDGESYNC_STATE_DIR, "/custom/state")
        .set(vars::XDG_STATE_HOME, "/xdg");
    assert_eq!(state_dir(None), PathBuf::from("/custom/state"));
}

#[test]
fn xdg_state_home_gets_subdirectory() {
    let _guard = EnvGuard::new()
        .remove(vars::EDGESYNC_STATE_DIR)
        .set(vars::XDG_STATE_HOME, "/xdg");
    assert_eq!(state_dir(None), PathBuf::from("/xdg/edgesync"));
}

#[test]
fn home_fallback_ends_with_local_state() {
    let _guard = EnvGuard::new()
        .remove(vars::EDGESYNC_STATE_DIR)
        .remove(vars::XDG_STATE_HOME);
    assert!(state_dir(None).ends_with(".local/state/edgesync"));
}

#[test]
fn config_defaults_into_state_dir() {
    assert_eq!(
        config_path(None, Path::new("/state")),
        PathBuf::from("/state/edgesync.toml")
    );
    assert_eq!(
        config_path(Some(Path::new("/etc/edge.toml")), Path::new("/state")),
        PathBuf::from("/etc/edge.toml")
    );
}
