// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed storage shared by the sync queue and the cache router.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use es_core::{
    Database, EntryId, EntryState, NewEntry, QueueCounts, Response, SyncEntry, SyncRecord,
};
use serde_json::Value;

use crate::cache::CacheStore;
use crate::queue::QueueStore;

/// One SQLite connection behind a mutex.
///
/// Every operation is a short local transaction, so callers on the async
/// runtime hold the lock only briefly.
pub struct SqliteStore {
    db: Mutex<Database>,
}

impl SqliteStore {
    /// Open or create the database file, applying migrations.
    pub fn open(path: &Path) -> es_core::Result<Self> {
        Ok(SqliteStore {
            db: Mutex::new(Database::open(path)?),
        })
    }

    pub fn open_in_memory() -> es_core::Result<Self> {
        Ok(SqliteStore {
            db: Mutex::new(Database::open_in_memory()?),
        })
    }

    fn db(&self) -> MutexGuard<'_, Database> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl QueueStore for SqliteStore {
    fn insert(&self, entry: &NewEntry) -> es_core::Result<SyncEntry> {
        self.db().insert_entry(entry)
    }

    fn get(&self, id: EntryId) -> es_core::Result<SyncEntry> {
        self.db().get_entry(id)
    }

    fn list(&self, state: EntryState, limit: Option<usize>) -> es_core::Result<Vec<SyncEntry>> {
        self.db().list_entries(state, limit)
    }

    fn list_unsynced(&self) -> es_core::Result<Vec<SyncEntry>> {
        self.db().list_unsynced()
    }

    fn transition(
        &self,
        id: EntryId,
        to: EntryState,
        last_error: Option<&str>,
    ) -> es_core::Result<SyncEntry> {
        self.db().transition_entry(id, to, last_error)
    }

    fn mark_synced(&self, id: EntryId) -> es_core::Result<SyncEntry> {
        self.db().mark_entry_synced(id)
    }

    fn record_failure(&self, id: EntryId, error: &str) -> es_core::Result<SyncEntry> {
        self.db().record_entry_failure(id, error)
    }

    fn reject(&self, id: EntryId, error: &str) -> es_core::Result<SyncEntry> {
        self.db().reject_entry(id, error)
    }

    fn requeue(&self, id: EntryId, payload: Option<&Value>) -> es_core::Result<SyncEntry> {
        self.db().requeue_entry(id, payload)
    }

    fn reset_in_flight(&self) -> es_core::Result<usize> {
        self.db().reset_in_flight()
    }

    fn counts(&self) -> es_core::Result<QueueCounts> {
        self.db().count_entries()
    }

    fn delete_synced_before(&self, cutoff: DateTime<Utc>) -> es_core::Result<usize> {
        self.db().delete_synced_before(cutoff)
    }

    fn load_record(&self) -> es_core::Result<SyncRecord> {
        self.db().load_sync_record()
    }

    fn save_record(&self, record: &SyncRecord) -> es_core::Result<()> {
        self.db().save_sync_record(record)
    }
}

impl CacheStore for SqliteStore {
    fn open_cache(&self, name: &str) -> es_core::Result<()> {
        self.db().open_cache_store(name)
    }

    fn cache_names(&self) -> es_core::Result<Vec<String>> {
        self.db().cache_store_names()
    }

    fn delete_cache(&self, name: &str) -> es_core::Result<bool> {
        self.db().delete_cache_store(name)
    }

    fn put_cached(&self, store: &str, url: &str, response: &Response) -> es_core::Result<()> {
        self.db().put_cached(store, url, response)
    }

    fn put_cached_all(&self, store: &str, responses: &[(String, Response)]) -> es_core::Result<()> {
        self.db().put_cached_all(store, responses)
    }

    fn get_cached(&self, store: &str, url: &str) -> es_core::Result<Option<Response>> {
        self.db().get_cached(store, url)
    }

    fn cached_urls(&self, store: &str) -> es_core::Result<Vec<String>> {
        self.db().cached_urls(store)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
