// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! edgesyncd - The edgesync daemon.
//!
//! Keeps a durable queue of local mutations in `<state-dir>/edgesync.db`
//! and forwards them to the remote endpoint whenever it is reachable.
//!
//! Usage:
//!   edgesyncd run
//!   edgesyncd enqueue --op update --resource toolstring/42 --payload '{...}'
//!   edgesyncd status

use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use edgesync::{Config, SqliteStore, SyncQueue};

mod cli;
mod commands;
mod paths;
mod run;

use cli::{Cli, Command};
use commands::{CommandError, Result};
use paths::{DB_NAME, LOG_NAME};

fn main() {
    let cli = Cli::parse();
    let state_dir = paths::state_dir(cli.state_dir.as_deref());

    if let Err(e) = fs::create_dir_all(&state_dir) {
        eprintln!("error: cannot create {}: {e}", state_dir.display());
        std::process::exit(1);
    }

    let log_path = matches!(cli.command, Command::Run).then(|| state_dir.join(LOG_NAME));
    setup_logging(log_path.as_deref(), cli.verbose);

    if let Err(e) = dispatch(cli, &state_dir) {
        tracing::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli, state_dir: &Path) -> Result<()> {
    let config = Config::load(&paths::config_path(cli.config.as_deref(), state_dir))?;
    let store = Arc::new(SqliteStore::open(&state_dir.join(DB_NAME))?);
    let queue = SyncQueue::new(Arc::clone(&store));

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Run => run::run(state_dir, store, &config),
        Command::Enqueue {
            op,
            resource,
            payload,
        } => commands::enqueue(&queue, op, &resource, payload, &mut out),
        Command::Status { output } => commands::status(&queue, output, &mut out),
        Command::Pending { output } => commands::pending(&queue, output, &mut out),
        Command::Resolve {
            id,
            requeue,
            discard: _,
            payload,
        } => commands::resolve(&queue, id, requeue, payload, &mut out),
        Command::Retry { id } => commands::retry(&queue, id, &mut out),
        Command::Purge { older_than_days } => commands::purge(&queue, older_than_days, &mut out),
    }?;

    out.flush().map_err(CommandError::from)
}

/// Log to `log_path` when given (falling back to stderr if it cannot be
/// opened), otherwise to stderr. One-shot commands only log warnings
/// unless `verbose` is set.
fn setup_logging(log_path: Option<&Path>, verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = match (verbose, log_path.is_some()) {
        (true, _) => "debug",
        (false, true) => "info",
        (false, false) => "warn",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let file = log_path.and_then(|path| {
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });

    if let Some(file) = file {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
