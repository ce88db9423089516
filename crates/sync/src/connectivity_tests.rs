// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::test_helpers::MockTransport;

#[test]
fn set_online_reports_transitions_only() {
    let monitor = ConnectivityMonitor::new(false);
    assert!(!monitor.is_online());
    assert!(monitor.set_online(true));
    assert!(!monitor.set_online(true));
    assert!(monitor.is_online());
    assert!(monitor.set_online(false));
}

#[test]
fn clones_share_state() {
    let monitor = ConnectivityMonitor::new(false);
    let other = monitor.clone();
    other.set_online(true);
    assert!(monitor.is_online());
}

#[tokio::test]
async fn subscribers_see_transitions() {
    let monitor = ConnectivityMonitor::new(false);
    let mut rx = monitor.subscribe();

    monitor.set_online(true);
    rx.changed().await.unwrap();
    assert!(*rx.borrow_and_update());
}

#[tokio::test]
async fn probe_once_feeds_monitor() {
    let transport = Arc::new(MockTransport::new());
    let monitor = ConnectivityMonitor::new(false);
    let probe = HealthProbe::new(Arc::clone(&transport), monitor.clone(), Duration::from_secs(1));

    assert!(probe.probe_once().await);
    assert!(monitor.is_online());

    transport.set_healthy(false);
    assert!(!probe.probe_once().await);
    assert!(!monitor.is_online());
}

#[tokio::test(start_paused = true)]
async fn probe_run_stops_on_shutdown() {
    let transport = Arc::new(MockTransport::new());
    let monitor = ConnectivityMonitor::new(false);
    let probe = HealthProbe::new(transport, monitor.clone(), Duration::from_secs(15));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let handle = tokio::spawn(async move { probe.run(shutdown_rx).await });
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(monitor.is_online());

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();
}
