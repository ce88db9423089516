// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Online/offline signal.
//!
//! "Online" is a heuristic gate, not a reachability guarantee: it reflects the
//! last transition reported to [`ConnectivityMonitor::set_online`], typically
//! by a [`HealthProbe`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::transport::Transport;

/// Shared online/offline flag with transition notifications.
#[derive(Clone)]
pub struct ConnectivityMonitor {
    tx: Arc<watch::Sender<bool>>,
}

impl ConnectivityMonitor {
    pub fn new(online: bool) -> Self {
        let (tx, _rx) = watch::channel(online);
        ConnectivityMonitor { tx: Arc::new(tx) }
    }

    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    /// Report the current link state. Returns true on a transition.
    pub fn set_online(&self, online: bool) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == online {
                return false;
            }
            *current = online;
            true
        });
        if changed {
            if online {
                tracing::info!("connectivity restored");
            } else {
                tracing::warn!("connectivity lost");
            }
        }
        changed
    }

    /// Receiver notified on every transition.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Polls the remote health endpoint and feeds the connectivity monitor.
pub struct HealthProbe<T> {
    transport: Arc<T>,
    monitor: ConnectivityMonitor,
    interval: Duration,
}

impl<T: Transport> HealthProbe<T> {
    pub fn new(transport: Arc<T>, monitor: ConnectivityMonitor, interval: Duration) -> Self {
        HealthProbe {
            transport,
            monitor,
            interval,
        }
    }

    /// Check once and publish the result. Returns the observed state.
    pub async fn probe_once(&self) -> bool {
        let healthy = self.transport.health().await;
        self.monitor.set_online(healthy);
        healthy
    }

    /// Probe on every interval until `shutdown` flips to true.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.probe_once().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::debug!("health probe stopped");
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
