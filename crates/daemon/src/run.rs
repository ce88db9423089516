// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Long-running sync services for `edgesyncd run`.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use edgesync::{
    CacheRouter, Config, ConnectivityMonitor, EnvCredential, HealthProbe, HttpFetcher,
    HttpTransport, SqliteStore, StatusIndicator, SyncOrchestrator, SyncQueue,
};
use tokio::sync::watch;

use crate::commands::{CommandError, Result};
use crate::paths::LOCK_NAME;

/// Hold the single-instance lock, then serve until interrupted.
pub fn run(state_dir: &Path, store: Arc<SqliteStore>, config: &Config) -> Result<()> {
    let lock_file = acquire_lock(&state_dir.join(LOCK_NAME))?;
    tracing::info!(state_dir = %state_dir.display(), "edgesyncd starting");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(serve(store, config));

    drop(lock_file);
    tracing::info!("edgesyncd stopped");
    result
}

async fn serve(store: Arc<SqliteStore>, config: &Config) -> Result<()> {
    let queue = SyncQueue::new(Arc::clone(&store));
    queue.recover_in_flight()?;

    prepare_cache(Arc::clone(&store), config).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, shutting down");
        }
        let _ = shutdown_tx.send(true);
    });

    let monitor = ConnectivityMonitor::new(false);
    let indicator = StatusIndicator::new(queue.clone(), monitor.clone(), config.poll_interval());
    let _status_log = indicator.subscribe(|state| {
        tracing::info!(online = state.is_online(), pending = state.pending(), "{state}");
    });

    if !config.remote.enabled {
        tracing::info!("remote sync disabled, mutations stay queued");
        indicator.run(shutdown_rx).await;
        return Ok(());
    }

    let transport = Arc::new(
        HttpTransport::new(&config.remote.url, &config.remote.client_id, config.timeout())
            .map_err(|e| CommandError::Setup(format!("http client: {e}")))?,
    );
    let probe = HealthProbe::new(Arc::clone(&transport), monitor.clone(), config.probe_interval());
    let credentials = Arc::new(EnvCredential::new(&config.remote.token_env));
    let orchestrator = SyncOrchestrator::new(
        queue,
        transport,
        credentials,
        monitor,
        config.orchestrator(),
    );
    tracing::info!(remote = %config.remote.url, client_id = %config.remote.client_id, "remote sync enabled");

    tokio::join!(
        probe.run(shutdown_rx.clone()),
        orchestrator.run(shutdown_rx.clone()),
        indicator.run(shutdown_rx),
    );
    Ok(())
}

/// Install the configured precache and drop stores from older versions.
///
/// A failed install leaves the previous version active; the daemon keeps
/// running so queued mutations still drain.
async fn prepare_cache(store: Arc<SqliteStore>, config: &Config) -> Result<()> {
    let fetcher = Arc::new(
        HttpFetcher::new(config.timeout())
            .map_err(|e| CommandError::Setup(format!("http client: {e}")))?,
    );
    let router = CacheRouter::new(store, fetcher, config.router()?);

    if !config.cache.precache.is_empty() {
        if let Err(e) = router.install(&config.cache.precache).await {
            tracing::warn!(version = %router.version(), error = %e, "precache install failed");
            return Ok(());
        }
    }
    match router.activate_version(&router.version()) {
        Ok(deleted) if !deleted.is_empty() => {
            tracing::info!(?deleted, "removed stale cache stores");
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "cache activation failed"),
    }
    Ok(())
}

fn acquire_lock(lock_path: &Path) -> std::io::Result<fs::File> {
    use fs2::FileExt;

    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(lock_path)?;
    file.try_lock_exclusive()
        .map_err(|_| std::io::Error::other("another edgesyncd instance is already running"))?;
    Ok(file)
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
