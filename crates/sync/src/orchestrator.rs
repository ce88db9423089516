// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Drains the sync queue against the remote endpoint.
//!
//! Each drain cycle takes a FIFO batch of pending entries and, while the
//! connectivity monitor reports online, delivers them one at a time:
//!
//! ```text
//! pending ──► in_flight ──► synced                  (accepted)
//!                  ├──────► conflicted              (remote diverged)
//!                  ├──────► pending, retry_count+1  (retryable failure)
//!                  └──────► abandoned               (non-retryable, or budget spent)
//! ```
//!
//! Only one cycle runs at a time; an overlapping call is skipped.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use es_core::{EntryId, SyncEntry};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::auth::CredentialProvider;
use crate::backoff::{self, BackoffPolicy, Retryable};
use crate::connectivity::ConnectivityMonitor;
use crate::event::{DrainReport, SyncEvent};
use crate::queue::{QueueResult, QueueStore, SyncQueue};
use crate::transport::{Delivery, DeliveryError, Transport};

/// Reason stored on entries that failed too many cycles.
pub const BUDGET_EXHAUSTED_REASON: &str = "retry budget exhausted";

/// Tuning for drain cycles.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Retry schedule within one delivery.
    pub backoff: BackoffPolicy,
    /// Maximum entries attempted per cycle.
    pub batch_size: usize,
    /// Failed cycles after which an entry is abandoned. Zero disables the limit.
    pub max_delivery_cycles: u32,
    /// Period of the drain timer while online.
    pub interval: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        OrchestratorConfig {
            backoff: BackoffPolicy::default(),
            batch_size: 50,
            max_delivery_cycles: 5,
            interval: Duration::from_secs(300),
        }
    }
}

/// Delivers queued entries when connectivity allows.
pub struct SyncOrchestrator<S, T, A> {
    queue: SyncQueue<S>,
    transport: Arc<T>,
    credentials: Arc<A>,
    monitor: ConnectivityMonitor,
    config: OrchestratorConfig,
    draining: tokio::sync::Mutex<()>,
    in_flight: Mutex<HashSet<EntryId>>,
}

impl<S, T, A> SyncOrchestrator<S, T, A>
where
    S: QueueStore,
    T: Transport,
    A: CredentialProvider,
{
    pub fn new(
        queue: SyncQueue<S>,
        transport: Arc<T>,
        credentials: Arc<A>,
        monitor: ConnectivityMonitor,
        config: OrchestratorConfig,
    ) -> Self {
        SyncOrchestrator {
            queue,
            transport,
            credentials,
            monitor,
            config,
            draining: tokio::sync::Mutex::new(()),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn queue(&self) -> &SyncQueue<S> {
        &self.queue
    }

    pub fn monitor(&self) -> &ConnectivityMonitor {
        &self.monitor
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run one drain cycle.
    ///
    /// Storage failures abort the cycle and are returned, leaving the
    /// interrupted entry pending; delivery failures are recorded on the
    /// entry and counted in the report.
    pub async fn drain(&self) -> QueueResult<DrainReport> {
        let Ok(_cycle) = self.draining.try_lock() else {
            tracing::debug!("drain already in progress, skipping");
            return Ok(DrainReport {
                skipped_cycle: true,
                ..DrainReport::default()
            });
        };
        if !self.monitor.is_online() {
            tracing::debug!("offline, drain skipped");
            return Ok(DrainReport::default());
        }

        let batch = self.queue.list_deliverable(self.config.batch_size)?;
        let mut report = DrainReport::default();
        let mut reached_remote = false;

        for entry in batch {
            if !self.monitor.is_online() || !self.claim(entry.id) {
                report.skipped += 1;
                continue;
            }
            let result = self
                .deliver_entry(&entry, &mut report, &mut reached_remote)
                .await;
            self.release(entry.id);
            if let Err(e) = result {
                self.abort_cycle(entry.id, &report, reached_remote);
                return Err(e);
            }
        }

        self.finish_cycle(&report, reached_remote)?;
        Ok(report)
    }

    async fn deliver_entry(
        &self,
        entry: &SyncEntry,
        report: &mut DrainReport,
        reached_remote: &mut bool,
    ) -> QueueResult<()> {
        let entry = self.queue.mark_in_flight(entry.id)?;
        report.attempted += 1;
        tracing::debug!(id = entry.id, resource = %entry.resource, "delivering entry");

        let transport = &self.transport;
        let credentials = &self.credentials;
        let target = &entry;
        let result = backoff::retry(&self.config.backoff, move |_attempt| async move {
            let credential = credentials
                .credential()
                .map_err(|e| DeliveryError::NoCredential(e.to_string()))?;
            transport.deliver(target, &credential).await
        })
        .await;

        let id = entry.id;
        match result {
            Ok(Delivery::Accepted) => {
                *reached_remote = true;
                self.queue.mark_synced(id)?;
                report.synced += 1;
            }
            Ok(Delivery::Conflict { remote }) => {
                *reached_remote = true;
                self.queue.mark_conflicted(id, remote)?;
                report.conflicted += 1;
            }
            Err(e) => {
                *reached_remote |= e.reached_remote();
                let message = e.to_string();
                if !e.is_retryable() {
                    self.queue.reject(id, &message)?;
                    report.abandoned += 1;
                    return Ok(());
                }
                let failed = self.queue.record_failure(id, &message)?;
                if self.config.max_delivery_cycles > 0
                    && failed.retry_count >= self.config.max_delivery_cycles
                {
                    self.queue.mark_abandoned(id, BUDGET_EXHAUSTED_REASON)?;
                    report.abandoned += 1;
                } else {
                    report.failed += 1;
                }
            }
        }
        Ok(())
    }

    fn finish_cycle(&self, report: &DrainReport, reached_remote: bool) -> QueueResult<()> {
        let counts = self.queue.counts()?;
        let mut record = self.queue.sync_record()?;
        let now = Utc::now();
        if report.attempted > 0 {
            record.last_attempt_at = Some(now);
            record.remote_reachable = reached_remote;
        }
        if report.synced > 0 {
            record.last_success_at = Some(now);
        }
        record.pending_count = counts.outstanding();
        record.failed_count = counts.abandoned + counts.conflicted;
        self.queue.save_sync_record(&record)?;

        if report.attempted > 0 && report.is_clean() {
            tracing::info!(attempted = report.attempted, synced = report.synced, "drain cycle complete");
        } else if report.attempted > 0 {
            tracing::warn!(
                attempted = report.attempted,
                synced = report.synced,
                failed = report.failed,
                abandoned = report.abandoned,
                conflicted = report.conflicted,
                skipped = report.skipped,
                "drain cycle left entries behind"
            );
        }
        self.queue.publish(&SyncEvent::DrainCompleted(*report));
        Ok(())
    }

    /// Leave the queue drainable after a storage failure on `id`: put the
    /// entry back to pending and record what the cycle got done.
    fn abort_cycle(&self, id: EntryId, report: &DrainReport, reached_remote: bool) {
        if let Err(e) = self.queue.release_in_flight(id) {
            tracing::error!(id, error = %e, "entry left in flight until restart");
        }
        if let Err(e) = self.finish_cycle(report, reached_remote) {
            tracing::warn!(error = %e, "failed to save sync record");
        }
    }

    fn claim(&self, id: EntryId) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id)
    }

    fn release(&self, id: EntryId) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }

    async fn drain_logged(&self) {
        if let Err(e) = self.drain().await {
            tracing::error!(error = %e, "drain cycle failed");
        }
    }

    /// Drain on every offline-to-online transition and on the timer while
    /// online, until `shutdown` flips to true.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut online = self.monitor.subscribe();
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if self.monitor.is_online() {
                        self.drain_logged().await;
                    }
                }
                changed = online.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    if *online.borrow_and_update() {
                        self.drain_logged().await;
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("sync orchestrator stopped");
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
