// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync health record operations.

use rusqlite::{params, OptionalExtension};

use super::{format_timestamp, parse_timestamp_opt, Database};
use crate::error::Result;
use crate::status::SyncRecord;

impl Database {
    /// Load the health record of the last drain cycle.
    pub fn load_sync_record(&self) -> Result<SyncRecord> {
        let record = self
            .conn
            .query_row(
                "SELECT last_attempt_at, last_success_at, remote_reachable,
                        pending_count, failed_count
                 FROM sync_status WHERE id = 1",
                [],
                |row| {
                    let pending: i64 = row.get(3)?;
                    let failed: i64 = row.get(4)?;
                    Ok(SyncRecord {
                        last_attempt_at: parse_timestamp_opt(row.get(0)?, "last_attempt_at")?,
                        last_success_at: parse_timestamp_opt(row.get(1)?, "last_success_at")?,
                        remote_reachable: row.get(2)?,
                        pending_count: usize::try_from(pending).unwrap_or(0),
                        failed_count: usize::try_from(failed).unwrap_or(0),
                    })
                },
            )
            .optional()?;
        Ok(record.unwrap_or_default())
    }

    /// Replace the health record.
    pub fn save_sync_record(&self, record: &SyncRecord) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO sync_status
             (id, last_attempt_at, last_success_at, remote_reachable, pending_count, failed_count)
             VALUES (1, ?1, ?2, ?3, ?4, ?5)",
            params![
                record.last_attempt_at.map(format_timestamp),
                record.last_success_at.map(format_timestamp),
                record.remote_reachable,
                i64::try_from(record.pending_count).unwrap_or(i64::MAX),
                i64::try_from(record.failed_count).unwrap_or(i64::MAX),
            ],
        )?;
        Ok(())
    }
}
