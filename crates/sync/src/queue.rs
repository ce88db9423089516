// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable sync queue service.
//!
//! [`SyncQueue`] owns the lifecycle of every [`SyncEntry`]. Storage is
//! injected through [`QueueStore`] so tests can run against an in-memory
//! database and the daemon against a file.

use std::sync::Arc;

use chrono::Utc;
use es_core::{
    EntryId, EntryState, NewEntry, OperationType, QueueCounts, SyncEntry, SyncRecord,
};
use serde_json::Value;

use crate::event::SyncEvent;
use crate::observer::{Observers, Subscription};

/// Reason stored on entries discarded after a conflict.
pub const DISCARDED_REASON: &str = "discarded after conflict";

/// Error type for queue operations.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("sync entry not found: {0}")]
    NotFound(EntryId),

    #[error("{0}")]
    InvalidTransition(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The durable store failed. The triggering mutation was not queued.
    #[error("storage failure: {0}")]
    Storage(es_core::Error),
}

impl QueueError {
    /// Returns true if the durable store itself failed.
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, QueueError::Storage(_))
    }
}

impl From<es_core::Error> for QueueError {
    fn from(err: es_core::Error) -> Self {
        match err {
            es_core::Error::EntryNotFound(id) => QueueError::NotFound(id),
            e @ es_core::Error::InvalidTransition { .. } => {
                QueueError::InvalidTransition(e.to_string())
            }
            es_core::Error::InvalidInput(msg) => QueueError::InvalidInput(msg),
            other => QueueError::Storage(other),
        }
    }
}

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;

/// Durable storage behind the sync queue.
pub trait QueueStore: Send + Sync {
    fn insert(&self, entry: &NewEntry) -> es_core::Result<SyncEntry>;
    fn get(&self, id: EntryId) -> es_core::Result<SyncEntry>;
    /// Entries in `state`, oldest first.
    fn list(&self, state: EntryState, limit: Option<usize>) -> es_core::Result<Vec<SyncEntry>>;
    /// Every entry not yet synced, oldest first.
    fn list_unsynced(&self) -> es_core::Result<Vec<SyncEntry>>;
    fn transition(
        &self,
        id: EntryId,
        to: EntryState,
        last_error: Option<&str>,
    ) -> es_core::Result<SyncEntry>;
    fn mark_synced(&self, id: EntryId) -> es_core::Result<SyncEntry>;
    fn record_failure(&self, id: EntryId, error: &str) -> es_core::Result<SyncEntry>;
    /// Count the failed attempt and abandon the entry atomically.
    fn reject(&self, id: EntryId, error: &str) -> es_core::Result<SyncEntry>;
    fn requeue(&self, id: EntryId, payload: Option<&Value>) -> es_core::Result<SyncEntry>;
    fn reset_in_flight(&self) -> es_core::Result<usize>;
    fn counts(&self) -> es_core::Result<QueueCounts>;
    fn delete_synced_before(&self, cutoff: chrono::DateTime<Utc>) -> es_core::Result<usize>;
    fn load_record(&self) -> es_core::Result<SyncRecord>;
    fn save_record(&self, record: &SyncRecord) -> es_core::Result<()>;
}

/// How the user resolved a conflicted entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Deliver again, optionally with a merged payload.
    Requeue { payload: Option<Value> },
    /// Give up on the local mutation.
    Discard,
}

/// Queue of mutations awaiting remote acknowledgment.
pub struct SyncQueue<S> {
    store: Arc<S>,
    events: Observers<SyncEvent>,
}

impl<S> Clone for SyncQueue<S> {
    fn clone(&self) -> Self {
        SyncQueue {
            store: Arc::clone(&self.store),
            events: self.events.clone(),
        }
    }
}

impl<S: QueueStore> SyncQueue<S> {
    pub fn new(store: Arc<S>) -> Self {
        SyncQueue {
            store,
            events: Observers::new(),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Persist a new mutation. Returns once it is durable; delivery happens later.
    pub fn enqueue(
        &self,
        operation: OperationType,
        resource: impl Into<String>,
        payload: Value,
    ) -> QueueResult<SyncEntry> {
        let new = NewEntry::new(operation, resource, payload);
        new.validate()?;
        let entry = self.store.insert(&new).map_err(|e| {
            tracing::error!(resource = %new.resource, error = %e, "failed to queue mutation");
            QueueError::from(e)
        })?;
        tracing::info!(id = entry.id, op = %entry.operation, resource = %entry.resource, "entry queued");
        self.events.publish(&SyncEvent::Enqueued {
            id: entry.id,
            resource: entry.resource.clone(),
        });
        Ok(entry)
    }

    pub fn get(&self, id: EntryId) -> QueueResult<SyncEntry> {
        Ok(self.store.get(id)?)
    }

    /// Every entry not yet synced, in creation order.
    pub fn list_pending(&self) -> QueueResult<Vec<SyncEntry>> {
        Ok(self.store.list_unsynced()?)
    }

    /// Up to `limit` entries a drain cycle may deliver, in creation order.
    pub fn list_deliverable(&self, limit: usize) -> QueueResult<Vec<SyncEntry>> {
        Ok(self.store.list(EntryState::Pending, Some(limit))?)
    }

    pub fn list_by_state(&self, state: EntryState) -> QueueResult<Vec<SyncEntry>> {
        Ok(self.store.list(state, None)?)
    }

    pub fn mark_in_flight(&self, id: EntryId) -> QueueResult<SyncEntry> {
        Ok(self.store.transition(id, EntryState::InFlight, None)?)
    }

    /// Record remote acknowledgment. Idempotent.
    pub fn mark_synced(&self, id: EntryId) -> QueueResult<SyncEntry> {
        let before = self.store.get(id)?;
        let entry = self.store.mark_synced(id)?;
        if before.state != EntryState::Synced {
            tracing::info!(id, resource = %entry.resource, "entry synced");
            self.events.publish(&SyncEvent::Synced { id });
        }
        Ok(entry)
    }

    /// Count a failed delivery cycle and leave the entry pending.
    pub fn record_failure(&self, id: EntryId, error: &str) -> QueueResult<SyncEntry> {
        let entry = self.store.record_failure(id, error)?;
        tracing::warn!(id, retry_count = entry.retry_count, error, "delivery failed");
        self.events.publish(&SyncEvent::Failed {
            id,
            retry_count: entry.retry_count,
            error: error.to_string(),
        });
        Ok(entry)
    }

    /// Abandon an entry whose delivery failed permanently, counting the attempt.
    pub fn reject(&self, id: EntryId, error: &str) -> QueueResult<SyncEntry> {
        let entry = self.store.reject(id, error)?;
        tracing::warn!(id, resource = %entry.resource, error, "entry rejected by remote");
        self.events.publish(&SyncEvent::Abandoned {
            id,
            reason: error.to_string(),
        });
        Ok(entry)
    }

    /// Return an entry this process left in flight to pending.
    ///
    /// Returns false when the entry was not in flight.
    pub fn release_in_flight(&self, id: EntryId) -> QueueResult<bool> {
        if self.store.get(id)?.state != EntryState::InFlight {
            return Ok(false);
        }
        self.store.transition(id, EntryState::Pending, None)?;
        tracing::info!(id, "in-flight entry returned to pending");
        Ok(true)
    }

    /// Exclude an entry from future drains.
    pub fn mark_abandoned(&self, id: EntryId, reason: &str) -> QueueResult<SyncEntry> {
        let entry = self
            .store
            .transition(id, EntryState::Abandoned, Some(reason))?;
        tracing::warn!(id, resource = %entry.resource, reason, "entry abandoned");
        self.events.publish(&SyncEvent::Abandoned {
            id,
            reason: reason.to_string(),
        });
        Ok(entry)
    }

    /// Hold an entry until the user resolves the conflict.
    pub fn mark_conflicted(&self, id: EntryId, remote: Option<Value>) -> QueueResult<SyncEntry> {
        let detail = match &remote {
            Some(state) => format!("conflict: remote state {state}"),
            None => "conflict: remote state diverged".to_string(),
        };
        let entry = self
            .store
            .transition(id, EntryState::Conflicted, Some(&detail))?;
        tracing::warn!(id, resource = %entry.resource, "conflict held for resolution");
        self.events.publish(&SyncEvent::Conflict { id, remote });
        Ok(entry)
    }

    /// Apply the user's decision for a conflicted entry.
    pub fn resolve_conflict(&self, id: EntryId, resolution: Resolution) -> QueueResult<SyncEntry> {
        let current = self.store.get(id)?;
        if current.state != EntryState::Conflicted {
            return Err(QueueError::InvalidTransition(format!(
                "entry {id} is {}, not conflicted",
                current.state
            )));
        }
        let entry = match resolution {
            Resolution::Requeue { payload } => self.store.requeue(id, payload.as_ref())?,
            Resolution::Discard => {
                self.store
                    .transition(id, EntryState::Abandoned, Some(DISCARDED_REASON))?
            }
        };
        tracing::info!(id, state = %entry.state, "conflict resolved");
        self.events.publish(&SyncEvent::Resolved { id });
        Ok(entry)
    }

    /// Return an abandoned entry to pending with a fresh retry budget.
    pub fn retry_abandoned(&self, id: EntryId) -> QueueResult<SyncEntry> {
        let current = self.store.get(id)?;
        if current.state != EntryState::Abandoned {
            return Err(QueueError::InvalidTransition(format!(
                "entry {id} is {}, not abandoned",
                current.state
            )));
        }
        let entry = self.store.requeue(id, None)?;
        tracing::info!(id, "abandoned entry requeued");
        self.events.publish(&SyncEvent::Resolved { id });
        Ok(entry)
    }

    pub fn counts(&self) -> QueueResult<QueueCounts> {
        Ok(self.store.counts()?)
    }

    /// Entries still waiting for delivery (pending or in flight).
    pub fn pending_count(&self) -> QueueResult<usize> {
        Ok(self.store.counts()?.outstanding())
    }

    /// Delete synced audit rows older than `older_than`.
    pub fn purge_synced(&self, older_than: chrono::Duration) -> QueueResult<usize> {
        let cutoff = Utc::now() - older_than;
        let purged = self.store.delete_synced_before(cutoff)?;
        tracing::info!(purged, "purged synced entries");
        Ok(purged)
    }

    /// Revert entries a previous process left in flight.
    pub fn recover_in_flight(&self) -> QueueResult<usize> {
        let recovered = self.store.reset_in_flight()?;
        if recovered > 0 {
            tracing::info!(recovered, "recovered in-flight entries");
        }
        Ok(recovered)
    }

    pub fn sync_record(&self) -> QueueResult<SyncRecord> {
        Ok(self.store.load_record()?)
    }

    pub fn save_sync_record(&self, record: &SyncRecord) -> QueueResult<()> {
        Ok(self.store.save_record(record)?)
    }

    /// Observe queue and drain events until the subscription is dropped.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&SyncEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(callback)
    }

    pub(crate) fn publish(&self, event: &SyncEvent) {
        self.events.publish(event);
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
