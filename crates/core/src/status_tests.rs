// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn counts() -> QueueCounts {
    QueueCounts {
        pending: 3,
        in_flight: 1,
        synced: 7,
        abandoned: 2,
        conflicted: 1,
    }
}

#[test]
fn outstanding_excludes_held_entries() {
    assert_eq!(counts().outstanding(), 4);
}

#[test]
fn unsynced_includes_held_entries() {
    assert_eq!(counts().unsynced(), 7);
}

#[yare::parameterized(
    pending = { EntryState::Pending },
    in_flight = { EntryState::InFlight },
    synced = { EntryState::Synced },
    abandoned = { EntryState::Abandoned },
    conflicted = { EntryState::Conflicted },
)]
fn add_increments_only_matching_state(state: EntryState) {
    let mut counts = QueueCounts::default();
    counts.add(state, 2);
    let total = counts.pending + counts.in_flight + counts.synced + counts.abandoned + counts.conflicted;
    assert_eq!(total, 2);
}
