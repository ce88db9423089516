// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queued mutation types.
//!
//! A [`SyncEntry`] is one pending mutation of a remote resource. Entries move
//! through [`EntryState`]s as the orchestrator delivers them:
//!
//! ```text
//! pending ──► in_flight ──► synced
//!    ▲            │
//!    ├────────────┤ (retryable failure)
//!    │            ├──► abandoned (non-retryable failure)
//!    │            └──► conflicted (remote state diverged)
//!    └── requeue/retry ◄── abandoned | conflicted
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Identifier of a queued entry. Assigned by storage and never reused.
pub type EntryId = i64;

/// Kind of mutation carried by an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    Create,
    Update,
    Delete,
}

impl OperationType {
    /// Returns the string representation used in storage and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Create => "create",
            OperationType::Update => "update",
            OperationType::Delete => "delete",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OperationType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "create" => Ok(OperationType::Create),
            "update" => Ok(OperationType::Update),
            "delete" => Ok(OperationType::Delete),
            _ => Err(Error::InvalidOperation(s.to_string())),
        }
    }
}

/// Delivery state of a queued entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryState {
    /// Waiting for the next drain cycle.
    Pending,
    /// Currently being delivered by a drain cycle.
    InFlight,
    /// Acknowledged by the remote endpoint. Never re-sent.
    Synced,
    /// Rejected permanently; excluded from drains until retried by the user.
    Abandoned,
    /// Remote state diverged; held until explicitly resolved.
    Conflicted,
}

impl EntryState {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryState::Pending => "pending",
            EntryState::InFlight => "in_flight",
            EntryState::Synced => "synced",
            EntryState::Abandoned => "abandoned",
            EntryState::Conflicted => "conflicted",
        }
    }

    /// Check if a transition from this state to target is valid.
    pub fn can_transition_to(&self, target: EntryState) -> bool {
        use EntryState::*;
        matches!(
            (self, target),
            (Pending, InFlight)
                | (Pending, Synced)
                | (Pending, Abandoned)
                | (InFlight, Pending)
                | (InFlight, Synced)
                | (InFlight, Abandoned)
                | (InFlight, Conflicted)
                | (Conflicted, Pending)
                | (Conflicted, Abandoned)
                | (Abandoned, Pending)
        )
    }

    /// Returns true if the entry will never be delivered again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EntryState::Synced)
    }

    /// Returns true if the entry still needs user attention or delivery.
    pub fn is_unsynced(&self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for EntryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntryState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(EntryState::Pending),
            "in_flight" | "in-flight" => Ok(EntryState::InFlight),
            "synced" => Ok(EntryState::Synced),
            "abandoned" => Ok(EntryState::Abandoned),
            "conflicted" => Ok(EntryState::Conflicted),
            _ => Err(Error::InvalidState(s.to_string())),
        }
    }
}

/// One queued mutation awaiting remote acknowledgment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncEntry {
    pub id: EntryId,
    pub operation: OperationType,
    /// Logical resource key, e.g. `toolstring/42`. Ordering is per resource.
    pub resource: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub synced: bool,
    pub synced_at: Option<DateTime<Utc>>,
    pub state: EntryState,
    /// Failed delivery cycles so far.
    pub retry_count: u32,
    pub last_error: Option<String>,
}

impl SyncEntry {
    /// Returns true if a drain cycle may pick this entry up.
    pub fn is_deliverable(&self) -> bool {
        self.state == EntryState::Pending
    }
}

/// An entry that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub operation: OperationType,
    pub resource: String,
    pub payload: serde_json::Value,
}

impl NewEntry {
    pub fn new(
        operation: OperationType,
        resource: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        NewEntry {
            operation,
            resource: resource.into(),
            payload,
        }
    }

    /// Validate that the entry can be queued.
    pub fn validate(&self) -> Result<()> {
        if self.resource.trim().is_empty() {
            return Err(Error::InvalidInput(
                "resource key must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
