// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted sync health record and queue depth counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::EntryState;

/// Number of entries in each state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueCounts {
    pub pending: usize,
    pub in_flight: usize,
    pub synced: usize,
    pub abandoned: usize,
    pub conflicted: usize,
}

impl QueueCounts {
    /// Entries not yet acknowledged by the remote endpoint.
    pub fn unsynced(&self) -> usize {
        self.pending + self.in_flight + self.abandoned + self.conflicted
    }

    /// Entries that a drain cycle will (re)attempt.
    pub fn outstanding(&self) -> usize {
        self.pending + self.in_flight
    }

    pub(crate) fn add(&mut self, state: EntryState, count: usize) {
        match state {
            EntryState::Pending => self.pending += count,
            EntryState::InFlight => self.in_flight += count,
            EntryState::Synced => self.synced += count,
            EntryState::Abandoned => self.abandoned += count,
            EntryState::Conflicted => self.conflicted += count,
        }
    }
}

/// Outcome of the most recent drain cycle, persisted across restarts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRecord {
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub last_success_at: Option<DateTime<Utc>>,
    pub remote_reachable: bool,
    pub pending_count: usize,
    pub failed_count: usize,
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
