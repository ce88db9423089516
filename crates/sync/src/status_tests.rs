// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::store::SqliteStore;
use es_core::{NewEntry, OperationType};
use serde_json::json;
use yare::parameterized;

fn indicator(online: bool) -> (StatusIndicator<SqliteStore>, SyncQueue<SqliteStore>, ConnectivityMonitor) {
    let queue = SyncQueue::new(Arc::new(SqliteStore::open_in_memory().unwrap()));
    let monitor = ConnectivityMonitor::new(online);
    let status = StatusIndicator::new(queue.clone(), monitor.clone(), Duration::from_secs(5));
    (status, queue, monitor)
}

fn record(status: &StatusIndicator<SqliteStore>) -> (Arc<Mutex<Vec<IndicatorState>>>, Subscription) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let sub = status.subscribe(move |s| sink.lock().unwrap().push(*s));
    (seen, sub)
}

#[parameterized(
    online_synced = { true, 0, "Online" },
    online_pending = { true, 3, "Online - 3 item(s) pending" },
    offline_pending = { false, 2, "Offline - 2 to sync" },
    offline_empty = { false, 0, "Offline" },
)]
fn display_text(online: bool, pending: usize, expected: &str) {
    assert_eq!(IndicatorState::new(online, pending).to_string(), expected);
}

#[test]
fn refresh_publishes_only_on_change() {
    let (status, queue, monitor) = indicator(true);
    let (seen, _sub) = record(&status);

    status.refresh().unwrap();
    status.refresh().unwrap();
    queue
        .enqueue(OperationType::Create, "toolstring/1", json!({}))
        .unwrap();
    status.refresh().unwrap();
    monitor.set_online(false);
    status.refresh().unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            IndicatorState::OnlineSynced,
            IndicatorState::OnlinePending(1),
            IndicatorState::OfflinePending(1),
        ]
    );
    assert_eq!(status.current(), Some(IndicatorState::OfflinePending(1)));
}

#[test]
fn abandoned_entries_are_not_counted_as_pending() {
    let (status, queue, _monitor) = indicator(true);
    let entry = queue
        .enqueue(OperationType::Create, "toolstring/1", json!({}))
        .unwrap();
    queue.mark_abandoned(entry.id, "rejected").unwrap();

    assert_eq!(status.refresh().unwrap(), IndicatorState::OnlineSynced);
}

#[tokio::test(start_paused = true)]
async fn run_follows_connectivity_and_polls_storage() {
    let (status, queue, monitor) = indicator(false);
    let status = Arc::new(status);
    let (seen, _sub) = record(&status);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let runner = Arc::clone(&status);
    let handle = tokio::spawn(async move { runner.run(shutdown_rx).await });

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(status.current(), Some(IndicatorState::OfflinePending(0)));

    monitor.set_online(true);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(status.current(), Some(IndicatorState::OnlineSynced));

    // Written behind the queue's back, so only the poll can notice.
    queue
        .store()
        .insert(&NewEntry::new(OperationType::Update, "job/7", json!({})))
        .unwrap();
    tokio::time::sleep(Duration::from_secs(6)).await;
    assert_eq!(status.current(), Some(IndicatorState::OnlinePending(1)));

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();
    assert_eq!(seen.lock().unwrap().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn run_reacts_to_queue_events() {
    let (status, queue, _monitor) = indicator(true);
    let status = Arc::new(status);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let runner = Arc::clone(&status);
    let handle = tokio::spawn(async move { runner.run(shutdown_rx).await });
    tokio::time::sleep(Duration::from_millis(10)).await;

    queue
        .enqueue(OperationType::Create, "toolstring/1", json!({}))
        .unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(status.current(), Some(IndicatorState::OnlinePending(1)));
    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();
}
