// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for es-core operations.

use thiserror::Error;

/// All possible errors that can occur in es-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("sync entry not found: {0}")]
    EntryNotFound(i64),

    #[error("invalid operation type: '{0}'\n  hint: valid operations are: create, update, delete")]
    InvalidOperation(String),

    #[error("invalid entry state: '{0}'\n  hint: valid states are: pending, in_flight, synced, abandoned, conflicted")]
    InvalidState(String),

    #[error("invalid state transition for entry {id}: cannot go from {from} to {to}")]
    InvalidTransition { id: i64, from: String, to: String },

    #[error("{0}")]
    InvalidInput(String),

    #[error("storage full: {0}\n  hint: free disk space or purge synced entries")]
    StorageFull(String),

    #[error("database error: {0}")]
    Database(rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref code, ref msg)
                if code.code == rusqlite::ErrorCode::DiskFull =>
            {
                Error::StorageFull(msg.clone().unwrap_or_else(|| code.to_string()))
            }
            other => Error::Database(other),
        }
    }
}

/// A specialized Result type for es-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
