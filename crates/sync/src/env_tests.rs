// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::test_helpers::EnvGuard;
use yare::parameterized;

#[test]
fn constants_match_env_var_names() {
    assert_eq!(vars::EDGESYNC_STATE_DIR, "EDGESYNC_STATE_DIR");
    assert_eq!(vars::EDGESYNC_ENDPOINT, "EDGESYNC_ENDPOINT");
    assert_eq!(vars::EDGESYNC_TOKEN, "EDGESYNC_TOKEN");
    assert_eq!(vars::XDG_STATE_HOME, "XDG_STATE_HOME");
    assert_eq!(vars::RUST_LOG, "RUST_LOG");
}

#[test]
fn state_dir_returns_path_when_set() {
    let _guard = EnvGuard::set(vars::EDGESYNC_STATE_DIR, "/custom/state");
    assert_eq!(state_dir(), Some(PathBuf::from("/custom/state")));
}

#[test]
fn state_dir_ignores_empty_value() {
    let _guard = EnvGuard::set(vars::EDGESYNC_STATE_DIR, "");
    assert_eq!(state_dir(), None);
}

#[test]
fn xdg_state_home_returns_none_when_unset() {
    let _guard = EnvGuard::remove(vars::XDG_STATE_HOME);
    assert_eq!(xdg_state_home(), None);
}

#[test]
fn sync_interval_parses_integer() {
    let _guard = EnvGuard::set(vars::EDGESYNC_SYNC_INTERVAL_SECS, " 60 ");
    assert_eq!(sync_interval_secs(), Some(60));
}

#[test]
fn sync_interval_ignores_garbage() {
    let _guard = EnvGuard::set(vars::EDGESYNC_SYNC_INTERVAL_SECS, "soon");
    assert_eq!(sync_interval_secs(), None);
}

#[parameterized(
    one = { "1", Some(true) },
    yes = { "YES", Some(true) },
    zero = { "0", Some(false) },
    off = { "off", Some(false) },
    garbage = { "maybe", None },
)]
fn enabled_parses_booleans(value: &str, expected: Option<bool>) {
    let _guard = EnvGuard::set(vars::EDGESYNC_ENABLED, value);
    assert_eq!(enabled(), expected);
}
