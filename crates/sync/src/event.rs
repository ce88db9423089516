// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Notifications published by the sync queue and orchestrator.

use es_core::EntryId;
use serde::Serialize;
use serde_json::Value;

/// Summary of one drain cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    /// Entries handed to the transport.
    pub attempted: usize,
    pub synced: usize,
    /// Entries returned to pending after a retryable failure.
    pub failed: usize,
    pub abandoned: usize,
    pub conflicted: usize,
    /// Entries left untouched because connectivity dropped or another cycle owns them.
    pub skipped: usize,
    /// True when the cycle did not run because another one was in progress.
    pub skipped_cycle: bool,
}

impl DrainReport {
    /// True when the cycle finished with nothing left to retry.
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.abandoned == 0 && self.conflicted == 0 && self.skipped == 0
    }
}

/// A state change observable by the status surface and the embedding application.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    Enqueued { id: EntryId, resource: String },
    Synced { id: EntryId },
    /// A retryable failure; the entry is pending again.
    Failed {
        id: EntryId,
        retry_count: u32,
        error: String,
    },
    /// Permanent failure, surfaced to the user.
    Abandoned { id: EntryId, reason: String },
    /// Remote state diverged; the entry waits for an explicit resolution.
    Conflict { id: EntryId, remote: Option<Value> },
    /// A conflicted or abandoned entry was requeued or discarded by the user.
    Resolved { id: EntryId },
    DrainCompleted(DrainReport),
}
