// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed durable storage.
//!
//! The [`Database`] struct owns one connection and provides the data access
//! operations for the sync queue ([`queue`]), the versioned cache stores
//! ([`cache`]) and the sync health record ([`status`]).

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;
use std::path::Path;

use crate::error::{Error, Result};

mod cache;
mod queue;
mod status;

/// SQL schema for the durable store.
pub const SCHEMA: &str = r#"
-- Pending mutations, one row per queued entry
CREATE TABLE IF NOT EXISTS sync_queue (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    operation TEXT NOT NULL,
    resource TEXT NOT NULL,
    payload TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    synced INTEGER NOT NULL DEFAULT 0,
    synced_at TEXT,
    state TEXT NOT NULL DEFAULT 'pending',
    retry_count INTEGER NOT NULL DEFAULT 0,
    last_error TEXT
);

-- Named cache stores; the name carries the release version
CREATE TABLE IF NOT EXISTS cache_stores (
    name TEXT PRIMARY KEY,
    created_at TEXT NOT NULL
);

-- Cached responses keyed by full request URL
CREATE TABLE IF NOT EXISTS cache_entries (
    store TEXT NOT NULL,
    url TEXT NOT NULL,
    status INTEGER NOT NULL,
    headers TEXT NOT NULL,
    body BLOB NOT NULL,
    stored_at TEXT NOT NULL,
    PRIMARY KEY (store, url),
    FOREIGN KEY (store) REFERENCES cache_stores(name) ON DELETE CASCADE
);

-- Single-row health record of the last drain cycle
CREATE TABLE IF NOT EXISTS sync_status (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    last_attempt_at TEXT,
    last_success_at TEXT,
    remote_reachable INTEGER NOT NULL DEFAULT 0,
    pending_count INTEGER NOT NULL DEFAULT 0,
    failed_count INTEGER NOT NULL DEFAULT 0
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_sync_queue_synced ON sync_queue(synced);
CREATE INDEX IF NOT EXISTS idx_sync_queue_resource ON sync_queue(resource, id);
"#;

/// Format a timestamp for storage.
///
/// Fixed precision keeps stored values lexicographically ordered.
fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a string value from the database, returning a rusqlite error on parse failure.
fn parse_db<T: std::str::FromStr>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    value.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(Error::CorruptedData(format!(
                "invalid value '{value}' in column '{column}'"
            ))),
        )
    })
}

/// Parse an RFC3339 timestamp from the database.
fn parse_timestamp(
    value: &str,
    column: &str,
) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(Error::CorruptedData(format!(
                    "invalid timestamp '{value}' in column '{column}'"
                ))),
            )
        })
}

/// Parse an optional RFC3339 timestamp from the database.
fn parse_timestamp_opt(
    value: Option<String>,
    column: &str,
) -> std::result::Result<Option<DateTime<Utc>>, rusqlite::Error> {
    value.map(|s| parse_timestamp(&s, column)).transpose()
}

/// Parse a JSON column from the database.
fn parse_json<T: serde::de::DeserializeOwned>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    serde_json::from_str(value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(Error::CorruptedData(format!(
                "invalid JSON in column '{column}': {e}"
            ))),
        )
    })
}

/// Run schema creation and all migrations on a database connection.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    migrate_add_state_column(conn)?;
    conn.execute_batch(SCHEMA)?;
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_sync_queue_state ON sync_queue(state);",
    )?;
    Ok(())
}

/// Migration: Add the delivery state column to queues created before it existed.
///
/// Early queues only tracked the `synced` flag. Rows already synced are
/// backfilled as `synced`; everything else becomes `pending`.
fn migrate_add_state_column(conn: &Connection) -> Result<()> {
    let has_table: bool = conn
        .query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = 'sync_queue'",
            [],
            |row| row.get(0),
        )
        .unwrap_or(false);
    if !has_table {
        return Ok(());
    }

    let has_state: bool = conn
        .query_row(
            "SELECT COUNT(*) > 0 FROM pragma_table_info('sync_queue') WHERE name = 'state'",
            [],
            |row| row.get(0),
        )
        .unwrap_or(false);

    if !has_state {
        conn.execute(
            "ALTER TABLE sync_queue ADD COLUMN state TEXT NOT NULL DEFAULT 'pending'",
            [],
        )?;
        conn.execute("UPDATE sync_queue SET state = 'synced' WHERE synced = 1", [])?;
    }
    Ok(())
}

/// SQLite database connection with sync and cache operations.
pub struct Database {
    /// The underlying SQLite connection.
    pub conn: Connection,
}

impl Database {
    /// Open a database connection at the given path, creating and migrating if needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // Enable foreign keys and WAL mode for concurrency
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        let db = Database { conn };
        run_migrations(&db.conn)?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let db = Database { conn };
        run_migrations(&db.conn)?;
        Ok(db)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;



#[cfg(test)]
#[path = "status_tests.rs"]
mod status_tests;
