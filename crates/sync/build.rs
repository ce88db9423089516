// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::env;
use std::fs;
use std::io::Write;
use std::path::Path;

const VARS: &[(&str, &str)] = &[
    ("EDGESYNC_STATE_DIR", "override the edgesync state directory"),
    ("EDGESYNC_ENDPOINT", "override the remote sync endpoint base URL"),
    ("EDGESYNC_CLIENT_ID", "override the client identifier sent with every sync request"),
    ("EDGESYNC_SYNC_INTERVAL_SECS", "override the periodic drain interval"),
    ("EDGESYNC_ENABLED", "enable or disable remote sync (1/0, true/false)"),
    ("EDGESYNC_TOKEN", "default variable holding the bearer token"),
    ("XDG_STATE_HOME", "XDG base directory for state data"),
    ("RUST_LOG", "controls log level filtering (used by tracing-subscriber)"),
];

fn main() {
    let out_dir = match env::var("OUT_DIR") {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("cargo:warning=OUT_DIR not set: {e}");
            std::process::exit(1);
        }
    };
    let dest_path = Path::new(&out_dir).join("env_vars.rs");

    let mut contents = String::new();
    for (name, doc) in VARS {
        contents.push_str(&format!(
            "/// Environment variable: {doc}.\npub const {name}: &str = \"{name}\";\n\n"
        ));
    }

    let written = fs::File::create(&dest_path).and_then(|mut f| f.write_all(contents.as_bytes()));
    if let Err(e) = written {
        eprintln!("cargo:warning=failed to write env_vars.rs: {e}");
        std::process::exit(1);
    }
    println!("cargo:rerun-if-changed=build.rs");
}
