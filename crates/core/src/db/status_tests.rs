// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::status::SyncRecord;
use chrono::TimeZone;

#[test]
fn missing_record_loads_default() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(db.load_sync_record().unwrap(), SyncRecord::default());
}

#[test]
fn save_then_load_record() {
    let db = Database::open_in_memory().unwrap();
    let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    let record = SyncRecord {
        last_attempt_at: Some(at),
        last_success_at: Some(at),
        remote_reachable: true,
        pending_count: 3,
        failed_count: 1,
    };

    db.save_sync_record(&record).unwrap();
    assert_eq!(db.load_sync_record().unwrap(), record);
}

#[test]
fn save_overwrites_single_row() {
    let db = Database::open_in_memory().unwrap();
    db.save_sync_record(&SyncRecord {
        pending_count: 5,
        ..Default::default()
    })
    .unwrap();
    db.save_sync_record(&SyncRecord {
        pending_count: 2,
        ..Default::default()
    })
    .unwrap();

    let rows: i64 = db
        .conn
        .query_row("SELECT COUNT(*) FROM sync_status", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
    assert_eq!(db.load_sync_record().unwrap().pending_count, 2);
}
