// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// `edgesyncd` with its state confined to `temp`.
pub fn edgesyncd(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("edgesyncd");
    cmd.env("EDGESYNC_STATE_DIR", temp.path())
        .env_remove("EDGESYNC_ENDPOINT")
        .env_remove("EDGESYNC_ENABLED")
        .env_remove("RUST_LOG");
    cmd
}

/// Queue a mutation and return its entry id.
pub fn enqueue(temp: &TempDir, op: &str, resource: &str) -> String {
    let output = edgesyncd(temp)
        .args(["enqueue", "--op", op, "--resource", resource])
        .output()
        .unwrap();
    assert!(output.status.success());

    String::from_utf8_lossy(&output.stdout)
        .split_whitespace()
        .nth(2)
        .unwrap()
        .to_string()
}
