// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The cache router: `install`, `activate_version` and `route`.

use std::sync::{Arc, PoisonError, RwLock};

use es_core::{Request, Response};

use super::fetch::{FetchError, Fetcher};
use super::rules::{RouteRules, Strategy};
use super::store::CacheStore;
use crate::backoff::{self, BackoffPolicy};

/// Error type for cache router operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("cache storage error: {0}")]
    Storage(#[from] es_core::Error),

    /// A precache URL answered with a response that cannot be stored.
    #[error("precache of {url} failed with status {status}")]
    Precache { url: String, status: u16 },
}

/// Where a routed response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Cache,
    Network,
}

/// A response together with how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedResponse {
    pub response: Response,
    pub source: ResponseSource,
    pub strategy: Strategy,
}

/// Router settings.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Leading component of every store name this router owns.
    pub prefix: String,
    /// Initially active version.
    pub version: String,
    pub rules: RouteRules,
    /// Retry schedule for network fetches.
    pub backoff: BackoffPolicy,
    /// Store successful network-first responses for offline fallback.
    pub refresh_on_network_first: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        RouterConfig {
            prefix: "edge".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            rules: RouteRules::default(),
            backoff: BackoffPolicy::default(),
            refresh_on_network_first: true,
        }
    }
}

/// Decides per request between the cache store and the network.
pub struct CacheRouter<C, F> {
    store: Arc<C>,
    fetcher: Arc<F>,
    config: RouterConfig,
    version: RwLock<String>,
}

impl<C: CacheStore, F: Fetcher> CacheRouter<C, F> {
    pub fn new(store: Arc<C>, fetcher: Arc<F>, config: RouterConfig) -> Self {
        let version = RwLock::new(config.version.clone());
        CacheRouter {
            store,
            fetcher,
            config,
            version,
        }
    }

    /// Currently active version.
    pub fn version(&self) -> String {
        self.version
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn precache_name(&self, version: &str) -> String {
        format!("{}-precache-{}", self.config.prefix, version)
    }

    pub fn runtime_name(&self, version: &str) -> String {
        format!("{}-runtime-{}", self.config.prefix, version)
    }

    /// Fetch every URL and store them all in the current precache store.
    ///
    /// Nothing is stored unless every fetch succeeds with a cacheable response.
    pub async fn install(&self, precache: &[String]) -> Result<usize, CacheError> {
        let version = self.version();
        tracing::info!(%version, count = precache.len(), "installing precache");

        let mut fetched = Vec::with_capacity(precache.len());
        for url in precache {
            let response = self.fetch(&Request::get(url.as_str())).await?;
            if !response.is_cacheable() {
                return Err(CacheError::Precache {
                    url: url.clone(),
                    status: response.status,
                });
            }
            fetched.push((url.clone(), response));
        }

        self.store
            .put_cached_all(&self.precache_name(&version), &fetched)?;
        tracing::info!(%version, "precache installed");
        Ok(fetched.len())
    }

    /// Make `version` current and delete every other store with our prefix.
    ///
    /// Returns the names of the deleted stores.
    pub fn activate_version(&self, version: &str) -> Result<Vec<String>, CacheError> {
        *self.version.write().unwrap_or_else(PoisonError::into_inner) = version.to_string();
        let keep = [self.precache_name(version), self.runtime_name(version)];
        let owned = format!("{}-", self.config.prefix);

        let mut deleted = Vec::new();
        for name in self.store.cache_names()? {
            if name.starts_with(&owned) && !keep.contains(&name) {
                self.store.delete_cache(&name)?;
                tracing::info!(store = %name, "deleted old cache store");
                deleted.push(name);
            }
        }
        self.store.open_cache(&keep[1])?;
        tracing::info!(%version, "cache version activated");
        Ok(deleted)
    }

    /// Delete every cache store. Returns how many were removed.
    pub fn clear_all(&self) -> Result<usize, CacheError> {
        let mut removed = 0;
        for name in self.store.cache_names()? {
            if self.store.delete_cache(&name)? {
                removed += 1;
            }
        }
        tracing::info!(removed, "cleared all cache stores");
        Ok(removed)
    }

    /// Resolve a request according to its strategy.
    pub async fn route(&self, request: &Request) -> Result<RoutedResponse, CacheError> {
        let strategy = self.config.rules.strategy_for(request);
        let routed = |response, source| RoutedResponse {
            response,
            source,
            strategy,
        };

        match strategy {
            Strategy::Passthrough | Strategy::NetworkOnly => {
                Ok(routed(self.fetch(request).await?, ResponseSource::Network))
            }
            Strategy::CacheFirst => {
                if let Some(hit) = self.lookup(&request.url) {
                    tracing::debug!(url = %request.url, "cache hit");
                    return Ok(routed(hit, ResponseSource::Cache));
                }
                tracing::debug!(url = %request.url, "cache miss, fetching");
                let response = self.fetch(request).await?;
                self.store_runtime(&request.url, &response);
                Ok(routed(response, ResponseSource::Network))
            }
            Strategy::NetworkFirst => match self.fetch(request).await {
                Ok(response) => {
                    if self.config.refresh_on_network_first {
                        self.store_runtime(&request.url, &response);
                    }
                    Ok(routed(response, ResponseSource::Network))
                }
                Err(e) => match self.lookup(&request.url) {
                    Some(cached) => {
                        tracing::debug!(url = %request.url, error = %e, "network failed, serving cached");
                        Ok(routed(cached, ResponseSource::Cache))
                    }
                    None => Err(e.into()),
                },
            },
        }
    }

    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        let fetcher = &self.fetcher;
        backoff::retry(&self.config.backoff, move |_| fetcher.fetch(request)).await
    }

    /// Look in the precache store, then the runtime store. Read errors count as a miss.
    fn lookup(&self, url: &str) -> Option<Response> {
        let version = self.version();
        for store in [self.precache_name(&version), self.runtime_name(&version)] {
            match self.store.get_cached(&store, url) {
                Ok(Some(response)) => return Some(response),
                Ok(None) => {}
                Err(e) => tracing::warn!(%store, error = %e, "cache read failed"),
            }
        }
        None
    }

    fn store_runtime(&self, url: &str, response: &Response) {
        if !response.is_cacheable() {
            return;
        }
        let store = self.runtime_name(&self.version());
        if let Err(e) = self.store.put_cached(&store, url, response) {
            tracing::warn!(%store, error = %e, "cache write failed");
        }
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
