// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use es_core::{EntryId, OperationType};

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "edgesyncd")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline-first store-and-forward sync daemon")]
pub struct Cli {
    /// State directory holding the database, lock and log files
    #[arg(long, global = true, value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    /// Config file (default: <state-dir>/edgesync.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the sync services until interrupted
    Run,

    /// Queue a mutation for delivery
    Enqueue {
        /// Kind of mutation: create, update or delete
        #[arg(long, value_parser = parse_operation)]
        op: OperationType,

        /// Logical resource key, e.g. toolstring/42
        #[arg(long)]
        resource: String,

        /// JSON body delivered to the remote endpoint
        #[arg(long, default_value = "{}", value_parser = parse_json)]
        payload: serde_json::Value,
    },

    /// Show sync status and queue depth
    Status {
        #[arg(long, short = 'o', value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// List entries not yet synced, oldest first
    Pending {
        #[arg(long, short = 'o', value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Resolve a conflicted entry
    #[command(group(ArgGroup::new("resolution").required(true).args(["requeue", "discard"])))]
    Resolve {
        /// Entry ID
        id: EntryId,

        /// Deliver the entry again
        #[arg(long)]
        requeue: bool,

        /// Give up on the local mutation
        #[arg(long)]
        discard: bool,

        /// Replacement (merged) payload for --requeue
        #[arg(long, requires = "requeue", value_parser = parse_json)]
        payload: Option<serde_json::Value>,
    },

    /// Return an abandoned entry to the queue
    Retry {
        /// Entry ID
        id: EntryId,
    },

    /// Delete synced entries older than the given age
    Purge {
        #[arg(long, default_value_t = 30)]
        older_than_days: u32,
    },
}

fn parse_operation(s: &str) -> Result<OperationType, String> {
    s.parse().map_err(|e: es_core::Error| e.to_string())
}

fn parse_json(s: &str) -> Result<serde_json::Value, String> {
    serde_json::from_str(s).map_err(|e| format!("invalid JSON: {e}"))
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
