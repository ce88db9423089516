// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot subcommands operating directly on the queue database.

use std::io::Write;

use chrono::{DateTime, Utc};
use edgesync::{IndicatorState, QueueError, QueueStore, Resolution, SyncQueue};
use es_core::{EntryId, OperationType, QueueCounts, SyncEntry, SyncRecord};
use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Core(#[from] es_core::Error),

    #[error(transparent)]
    Config(#[from] edgesync::ConfigError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Setup(String),
}

pub type Result<T> = std::result::Result<T, CommandError>;

/// JSON output for `status`.
#[derive(Serialize)]
struct StatusJson<'a> {
    online: bool,
    indicator: String,
    counts: &'a QueueCounts,
    record: &'a SyncRecord,
}

/// JSON output for `pending`.
#[derive(Serialize)]
struct PendingJson<'a> {
    entries: &'a [SyncEntry],
}

pub fn enqueue<S: QueueStore>(
    queue: &SyncQueue<S>,
    operation: OperationType,
    resource: &str,
    payload: Value,
    out: &mut impl Write,
) -> Result<()> {
    let entry = queue.enqueue(operation, resource, payload)?;
    writeln!(out, "queued entry {} ({} {})", entry.id, entry.operation, entry.resource)?;
    Ok(())
}

/// Print the indicator line plus queue counts.
///
/// The daemon may not be running, so reachability comes from the record
/// persisted by the last drain cycle.
pub fn status<S: QueueStore>(
    queue: &SyncQueue<S>,
    output: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let counts = queue.counts()?;
    let record = queue.sync_record()?;
    let indicator = IndicatorState::new(record.remote_reachable, counts.outstanding());

    match output {
        OutputFormat::Json => {
            let json = StatusJson {
                online: indicator.is_online(),
                indicator: indicator.to_string(),
                counts: &counts,
                record: &record,
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&json)?)?;
        }
        OutputFormat::Text => {
            writeln!(out, "{indicator}")?;
            writeln!(
                out,
                "pending: {}  in_flight: {}  synced: {}  abandoned: {}  conflicted: {}",
                counts.pending, counts.in_flight, counts.synced, counts.abandoned, counts.conflicted
            )?;
            writeln!(out, "last attempt: {}", format_time(record.last_attempt_at))?;
            writeln!(out, "last success: {}", format_time(record.last_success_at))?;
        }
    }
    Ok(())
}

pub fn pending<S: QueueStore>(
    queue: &SyncQueue<S>,
    output: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let entries = queue.list_pending()?;

    match output {
        OutputFormat::Json => {
            let json = PendingJson { entries: &entries };
            writeln!(out, "{}", serde_json::to_string_pretty(&json)?)?;
        }
        OutputFormat::Text => {
            if entries.is_empty() {
                writeln!(out, "nothing to sync")?;
            }
            for entry in &entries {
                writeln!(out, "{}", format_entry_line(entry))?;
            }
        }
    }
    Ok(())
}

pub fn resolve<S: QueueStore>(
    queue: &SyncQueue<S>,
    id: EntryId,
    requeue: bool,
    payload: Option<Value>,
    out: &mut impl Write,
) -> Result<()> {
    let resolution = if requeue {
        Resolution::Requeue { payload }
    } else {
        Resolution::Discard
    };
    let entry = queue.resolve_conflict(id, resolution)?;
    writeln!(out, "entry {} is now {}", entry.id, entry.state)?;
    Ok(())
}

pub fn retry<S: QueueStore>(queue: &SyncQueue<S>, id: EntryId, out: &mut impl Write) -> Result<()> {
    let entry = queue.retry_abandoned(id)?;
    writeln!(out, "entry {} is now {}", entry.id, entry.state)?;
    Ok(())
}

pub fn purge<S: QueueStore>(
    queue: &SyncQueue<S>,
    older_than_days: u32,
    out: &mut impl Write,
) -> Result<()> {
    let removed = queue.purge_synced(chrono::Duration::days(i64::from(older_than_days)))?;
    writeln!(out, "purged {removed} synced entries")?;
    Ok(())
}

/// `[id] state op resource (retries: n, last error: ...)`
pub(crate) fn format_entry_line(entry: &SyncEntry) -> String {
    let mut line = format!(
        "[{}] {} {} {}",
        entry.id, entry.state, entry.operation, entry.resource
    );
    if entry.retry_count > 0 {
        line.push_str(&format!(" (retries: {}", entry.retry_count));
        if let Some(err) = &entry.last_error {
            line.push_str(&format!(", last error: {err}"));
        }
        line.push(')');
    } else if let Some(err) = &entry.last_error {
        line.push_str(&format!(" ({err})"));
    }
    line
}

fn format_time(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "never".to_string())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
