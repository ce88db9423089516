// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! User-visible sync status derived from connectivity and queue depth.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::{watch, Notify};
use tokio::time::MissedTickBehavior;

use crate::connectivity::ConnectivityMonitor;
use crate::observer::{Observers, Subscription};
use crate::queue::{QueueResult, QueueStore, SyncQueue};

/// What the status surface shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorState {
    OnlineSynced,
    OnlinePending(usize),
    OfflinePending(usize),
}

impl IndicatorState {
    pub fn new(online: bool, pending: usize) -> Self {
        match (online, pending) {
            (true, 0) => IndicatorState::OnlineSynced,
            (true, n) => IndicatorState::OnlinePending(n),
            (false, n) => IndicatorState::OfflinePending(n),
        }
    }

    pub fn is_online(&self) -> bool {
        !matches!(self, IndicatorState::OfflinePending(_))
    }

    pub fn pending(&self) -> usize {
        match self {
            IndicatorState::OnlineSynced => 0,
            IndicatorState::OnlinePending(n) | IndicatorState::OfflinePending(n) => *n,
        }
    }
}

impl fmt::Display for IndicatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorState::OnlineSynced => write!(f, "Online"),
            IndicatorState::OnlinePending(n) => write!(f, "Online - {n} item(s) pending"),
            IndicatorState::OfflinePending(0) => write!(f, "Offline"),
            IndicatorState::OfflinePending(n) => write!(f, "Offline - {n} to sync"),
        }
    }
}

/// Recomputes [`IndicatorState`] and notifies observers when it changes.
pub struct StatusIndicator<S> {
    queue: SyncQueue<S>,
    monitor: ConnectivityMonitor,
    poll_interval: Duration,
    current: Mutex<Option<IndicatorState>>,
    observers: Observers<IndicatorState>,
}

impl<S: QueueStore> StatusIndicator<S> {
    pub fn new(queue: SyncQueue<S>, monitor: ConnectivityMonitor, poll_interval: Duration) -> Self {
        StatusIndicator {
            queue,
            monitor,
            poll_interval,
            current: Mutex::new(None),
            observers: Observers::new(),
        }
    }

    /// Last computed state, if any.
    pub fn current(&self) -> Option<IndicatorState> {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Recompute now. Observers hear about it only if the state changed.
    pub fn refresh(&self) -> QueueResult<IndicatorState> {
        let state = IndicatorState::new(self.monitor.is_online(), self.queue.pending_count()?);
        let changed = {
            let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
            let changed = *current != Some(state);
            *current = Some(state);
            changed
        };
        if changed {
            tracing::debug!(status = %state, "sync status changed");
            self.observers.publish(&state);
        }
        Ok(state)
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&IndicatorState) + Send + Sync + 'static,
    {
        self.observers.subscribe(callback)
    }

    fn refresh_logged(&self) {
        if let Err(e) = self.refresh() {
            tracing::warn!(error = %e, "failed to refresh sync status");
        }
    }

    /// Refresh on connectivity transitions, queue events and every poll
    /// interval until `shutdown` flips to true.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let wake = Arc::new(Notify::new());
        let waker = Arc::clone(&wake);
        let _events = self.queue.subscribe(move |_| waker.notify_one());
        let mut online = self.monitor.subscribe();
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.refresh_logged(),
                _ = wake.notified() => self.refresh_logged(),
                changed = online.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    online.borrow_and_update();
                    self.refresh_logged();
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
