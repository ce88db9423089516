// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync queue operations.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{
    format_timestamp, parse_db, parse_json, parse_timestamp, parse_timestamp_opt, Database,
};
use crate::entry::{EntryId, EntryState, NewEntry, SyncEntry};
use crate::error::{Error, Result};
use crate::status::QueueCounts;

const ENTRY_COLUMNS: &str = "id, operation, resource, payload, created_at, updated_at,
     synced, synced_at, state, retry_count, last_error";

fn row_to_entry(row: &Row<'_>) -> std::result::Result<SyncEntry, rusqlite::Error> {
    let operation: String = row.get(1)?;
    let payload: String = row.get(3)?;
    let created_str: String = row.get(4)?;
    let updated_str: String = row.get(5)?;
    let synced_at: Option<String> = row.get(7)?;
    let state: String = row.get(8)?;

    Ok(SyncEntry {
        id: row.get(0)?,
        operation: parse_db(&operation, "operation")?,
        resource: row.get(2)?,
        payload: parse_json(&payload, "payload")?,
        created_at: parse_timestamp(&created_str, "created_at")?,
        updated_at: parse_timestamp(&updated_str, "updated_at")?,
        synced: row.get(6)?,
        synced_at: parse_timestamp_opt(synced_at, "synced_at")?,
        state: parse_db(&state, "state")?,
        retry_count: row.get(9)?,
        last_error: row.get(10)?,
    })
}

impl Database {
    /// Append a new pending entry. The id is assigned here and never reused.
    pub fn insert_entry(&self, entry: &NewEntry) -> Result<SyncEntry> {
        entry.validate()?;
        let now = format_timestamp(Utc::now());
        let payload = serde_json::to_string(&entry.payload)?;

        self.conn.execute(
            "INSERT INTO sync_queue (operation, resource, payload, created_at, updated_at,
             synced, state, retry_count)
             VALUES (?1, ?2, ?3, ?4, ?4, 0, 'pending', 0)",
            params![entry.operation.as_str(), entry.resource, payload, now],
        )?;

        self.get_entry(self.conn.last_insert_rowid())
    }

    /// Get an entry by id.
    pub fn get_entry(&self, id: EntryId) -> Result<SyncEntry> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM sync_queue WHERE id = ?1");
        self.conn
            .query_row(&sql, params![id], row_to_entry)
            .optional()?
            .ok_or(Error::EntryNotFound(id))
    }

    /// List entries in a state, oldest first.
    pub fn list_entries(&self, state: EntryState, limit: Option<usize>) -> Result<Vec<SyncEntry>> {
        let limit = limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM sync_queue WHERE state = ?1 ORDER BY id ASC LIMIT ?2"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let entries = stmt
            .query_map(params![state.as_str(), limit], row_to_entry)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// List all unsynced entries (`synced = 0`), oldest first.
    pub fn list_unsynced(&self) -> Result<Vec<SyncEntry>> {
        let sql =
            format!("SELECT {ENTRY_COLUMNS} FROM sync_queue WHERE synced = 0 ORDER BY id ASC");
        let mut stmt = self.conn.prepare(&sql)?;
        let entries = stmt
            .query_map([], row_to_entry)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Move an entry to a new state, validating the transition.
    ///
    /// `last_error` replaces the stored error when given.
    pub fn transition_entry(
        &self,
        id: EntryId,
        to: EntryState,
        last_error: Option<&str>,
    ) -> Result<SyncEntry> {
        let tx = self.conn.unchecked_transaction()?;
        let current = self.get_entry(id)?;
        check_transition(&current, to)?;

        let now = format_timestamp(Utc::now());
        tx.execute(
            "UPDATE sync_queue SET state = ?1, updated_at = ?2,
             last_error = COALESCE(?3, last_error)
             WHERE id = ?4",
            params![to.as_str(), now, last_error, id],
        )?;
        tx.commit()?;
        self.get_entry(id)
    }

    /// Mark an entry as acknowledged. Calling it on a synced entry changes nothing.
    pub fn mark_entry_synced(&self, id: EntryId) -> Result<SyncEntry> {
        let tx = self.conn.unchecked_transaction()?;
        let current = self.get_entry(id)?;
        if current.state == EntryState::Synced {
            return Ok(current);
        }
        check_transition(&current, EntryState::Synced)?;

        let now = format_timestamp(Utc::now());
        tx.execute(
            "UPDATE sync_queue SET state = 'synced', synced = 1, synced_at = ?1,
             updated_at = ?1, last_error = NULL
             WHERE id = ?2",
            params![now, id],
        )?;
        tx.commit()?;
        self.get_entry(id)
    }

    /// Record a failed delivery cycle and return the entry to pending.
    ///
    /// Only entries awaiting delivery can fail; conflicted and abandoned
    /// entries leave their state through `requeue_entry`.
    pub fn record_entry_failure(&self, id: EntryId, error: &str) -> Result<SyncEntry> {
        let tx = self.conn.unchecked_transaction()?;
        let current = self.get_entry(id)?;
        check_deliverable(&current, EntryState::Pending)?;

        let now = format_timestamp(Utc::now());
        tx.execute(
            "UPDATE sync_queue SET state = 'pending', retry_count = retry_count + 1,
             last_error = ?1, updated_at = ?2
             WHERE id = ?3",
            params![error, now, id],
        )?;
        tx.commit()?;
        self.get_entry(id)
    }

    /// Count a rejected delivery and abandon the entry in one write.
    pub fn reject_entry(&self, id: EntryId, error: &str) -> Result<SyncEntry> {
        let tx = self.conn.unchecked_transaction()?;
        let current = self.get_entry(id)?;
        check_deliverable(&current, EntryState::Abandoned)?;

        let now = format_timestamp(Utc::now());
        tx.execute(
            "UPDATE sync_queue SET state = 'abandoned', retry_count = retry_count + 1,
             last_error = ?1, updated_at = ?2
             WHERE id = ?3",
            params![error, now, id],
        )?;
        tx.commit()?;
        self.get_entry(id)
    }

    /// Return an abandoned or conflicted entry to pending with a fresh retry budget.
    ///
    /// A replacement payload, if given, is stored in place of the original.
    pub fn requeue_entry(
        &self,
        id: EntryId,
        payload: Option<&serde_json::Value>,
    ) -> Result<SyncEntry> {
        let tx = self.conn.unchecked_transaction()?;
        let current = self.get_entry(id)?;
        if !matches!(
            current.state,
            EntryState::Abandoned | EntryState::Conflicted
        ) {
            return Err(Error::InvalidTransition {
                id,
                from: current.state.to_string(),
                to: EntryState::Pending.to_string(),
            });
        }

        let payload = match payload {
            Some(p) => serde_json::to_string(p)?,
            None => serde_json::to_string(&current.payload)?,
        };
        let now = format_timestamp(Utc::now());
        tx.execute(
            "UPDATE sync_queue SET state = 'pending', retry_count = 0, last_error = NULL,
             payload = ?1, updated_at = ?2
             WHERE id = ?3",
            params![payload, now, id],
        )?;
        tx.commit()?;
        self.get_entry(id)
    }

    /// Revert entries left in flight by an interrupted process.
    pub fn reset_in_flight(&self) -> Result<usize> {
        let now = format_timestamp(Utc::now());
        let count = self.conn.execute(
            "UPDATE sync_queue SET state = 'pending', updated_at = ?1 WHERE state = 'in_flight'",
            params![now],
        )?;
        Ok(count)
    }

    /// Count entries per state.
    pub fn count_entries(&self) -> Result<QueueCounts> {
        let mut stmt = self
            .conn
            .prepare("SELECT state, COUNT(*) FROM sync_queue GROUP BY state")?;
        let rows = stmt
            .query_map([], |row| {
                let state: String = row.get(0)?;
                let count: i64 = row.get(1)?;
                Ok((parse_db::<EntryState>(&state, "state")?, count))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut counts = QueueCounts::default();
        for (state, count) in rows {
            counts.add(state, usize::try_from(count).unwrap_or(0));
        }
        Ok(counts)
    }

    /// Delete an entry outright.
    pub fn delete_entry(&self, id: EntryId) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM sync_queue WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(Error::EntryNotFound(id));
        }
        Ok(())
    }

    /// Delete synced audit rows acknowledged before the cutoff.
    pub fn delete_synced_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let count = self.conn.execute(
            "DELETE FROM sync_queue WHERE synced = 1 AND synced_at < ?1",
            params![format_timestamp(cutoff)],
        )?;
        Ok(count)
    }
}

fn check_transition(entry: &SyncEntry, to: EntryState) -> Result<()> {
    if entry.state.can_transition_to(to) {
        Ok(())
    } else {
        Err(Error::InvalidTransition {
            id: entry.id,
            from: entry.state.to_string(),
            to: to.to_string(),
        })
    }
}

/// Failure outcomes apply only to entries awaiting delivery.
fn check_deliverable(entry: &SyncEntry, to: EntryState) -> Result<()> {
    if matches!(entry.state, EntryState::Pending | EntryState::InFlight) {
        Ok(())
    } else {
        Err(Error::InvalidTransition {
            id: entry.id,
            from: entry.state.to_string(),
            to: to.to_string(),
        })
    }
}
